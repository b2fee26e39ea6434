//! JSX -> widget IR.
//!
//! Tags resolve through the mapping table first, then as pass-through
//! custom components, then through the generic `Container` fallback.
//! Every attribute produces either a property or a comment; expression
//! children become placeholders rather than being evaluated.

use std::collections::BTreeSet;

use swc_core::ecma::ast::*;
use tracing::{debug, trace};

use super::{
    mapping::{ChildSlot, ElementMapping, MappingTable, FALLBACK_MAPPING},
    LoweredTree, PropertyValue, WidgetChildren, WidgetNode, WidgetProperty,
};
use crate::{
    component::{find_component, first_jsx_anywhere},
    config::TransformConfig,
    diagnostics::{Diagnostic, DiagnosticKind},
    emit::dart_string,
    expr::{class_tokens, expr_source, member_path, unwrap_expr},
    naming::is_event_handler_name,
    structure::{is_custom_component_name, jsx_attr_name, jsx_name, normalize_text, ComponentStructure},
};

const TEXT_INPUTS: &[&str] = &["input", "textarea"];

enum AttrValue<'a> {
    /// Bare attribute (`disabled`).
    Flag,
    Str(String),
    Expr(&'a Expr),
    Element(&'a JSXElement),
    Fragment(&'a JSXFragment),
}

impl<'a> AttrValue<'a> {
    fn of(value: Option<&'a JSXAttrValue>) -> Self {
        match value {
            None => AttrValue::Flag,
            Some(JSXAttrValue::Lit(Lit::Str(s))) => AttrValue::Str(s.value.to_string()),
            Some(JSXAttrValue::Lit(other)) => AttrValue::Str(expr_source(&Expr::Lit(other.clone()))),
            Some(JSXAttrValue::JSXExprContainer(c)) => match &c.expr {
                JSXExpr::JSXEmptyExpr(_) => AttrValue::Flag,
                JSXExpr::Expr(e) => match unwrap_expr(e) {
                    Expr::Lit(Lit::Str(s)) => AttrValue::Str(s.value.to_string()),
                    Expr::Tpl(t) if t.exprs.is_empty() => AttrValue::Str(
                        t.quasis
                            .iter()
                            .map(|q| q.cooked.as_ref().map(|c| c.to_string()).unwrap_or_else(|| q.raw.to_string()))
                            .collect(),
                    ),
                    Expr::JSXElement(el) => AttrValue::Element(el),
                    Expr::JSXFragment(f) => AttrValue::Fragment(f),
                    other => AttrValue::Expr(other),
                },
            },
            Some(JSXAttrValue::JSXElement(el)) => AttrValue::Element(el),
            Some(JSXAttrValue::JSXFragment(f)) => AttrValue::Fragment(f),
        }
    }

    /// Human-readable value for comments.
    fn describe(&self) -> String {
        match self {
            AttrValue::Flag => "true".to_string(),
            AttrValue::Str(s) => s.clone(),
            AttrValue::Expr(e) => expr_source(e),
            AttrValue::Element(el) => format!("<{} />", jsx_name(&el.opening.name)),
            AttrValue::Fragment(_) => "<>…</>".to_string(),
        }
    }

    /// Dart source for the value (strings quoted).
    fn dart_source(&self) -> String {
        match self {
            AttrValue::Str(s) => dart_string(s),
            other => match other.literal() {
                Some(v) => v,
                None => other.describe(),
            },
        }
    }

    /// Raw text of number/boolean/null expressions.
    fn literal(&self) -> Option<String> {
        match self {
            AttrValue::Flag => Some("true".to_string()),
            AttrValue::Expr(e) => match unwrap_expr(e) {
                Expr::Lit(Lit::Num(_)) | Expr::Lit(Lit::Bool(_)) | Expr::Lit(Lit::Null(_)) => Some(expr_source(e)),
                Expr::Unary(u) if u.op == UnaryOp::Minus && matches!(&*u.arg, Expr::Lit(Lit::Num(_))) => {
                    Some(expr_source(e))
                }
                _ => None,
            },
            _ => None,
        }
    }
}

fn pat_name(pat: &Pat) -> String {
    match pat {
        Pat::Ident(b) => b.id.sym.to_string(),
        _ => "_".to_string(),
    }
}

/// Event-handler value as a Dart closure or reference.
fn handler_value(value: &AttrValue<'_>) -> PropertyValue {
    let AttrValue::Expr(e) = value else {
        return PropertyValue::Raw("() {}".to_string());
    };
    match unwrap_expr(e) {
        Expr::Arrow(a) => {
            let params = a.params.iter().map(pat_name).collect::<Vec<_>>().join(", ");
            match &*a.body {
                BlockStmtOrExpr::Expr(body) => PropertyValue::Raw(format!("({params}) => {}", expr_source(body))),
                BlockStmtOrExpr::BlockStmt(_) => PropertyValue::Raw(format!("({params}) {{}}")),
            }
        }
        Expr::Fn(f) => {
            let params = f.function.params.iter().map(|p| pat_name(&p.pat)).collect::<Vec<_>>().join(", ");
            PropertyValue::Raw(format!("({params}) {{}}"))
        }
        other => PropertyValue::Raw(expr_source(other)),
    }
}

/// What an expression child would have rendered.
fn expression_kind(expr: &Expr) -> &'static str {
    match unwrap_expr(expr) {
        Expr::Cond(_) => "conditional render",
        Expr::Bin(b) if matches!(b.op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing) => {
            "conditional render"
        }
        e if is_map_call(e) => "list render",
        _ => "expression",
    }
}

/// `items.map(...)`, including `items?.map(...)` and `a.b.map(...)`.
fn is_map_call(expr: &Expr) -> bool {
    let callee = match unwrap_expr(expr) {
        Expr::Call(c) => match &c.callee {
            Callee::Expr(callee) => &**callee,
            _ => return false,
        },
        Expr::OptChain(o) => match &*o.base {
            OptChainBase::Call(c) => &*c.callee,
            OptChainBase::Member(_) => return false,
        },
        _ => return false,
    };
    match unwrap_expr(callee) {
        Expr::Member(m) => matches!(&m.prop, MemberProp::Ident(p) if p.sym.as_ref() == "map"),
        Expr::OptChain(o) => match &*o.base {
            OptChainBase::Member(m) => matches!(&m.prop, MemberProp::Ident(p) if p.sym.as_ref() == "map"),
            OptChainBase::Call(_) => false,
        },
        _ => false,
    }
}

/// One piece of a text widget's payload.
enum TextPiece {
    Literal(String),
    Interpolated(String),
}

fn text_payload(pieces: &[TextPiece]) -> PropertyValue {
    if pieces.iter().all(|p| matches!(p, TextPiece::Literal(_))) {
        let text = pieces
            .iter()
            .filter_map(|p| match p {
                TextPiece::Literal(s) => Some(s.as_str()),
                TextPiece::Interpolated(_) => None,
            })
            .collect::<Vec<_>>()
            .join(" ");
        return PropertyValue::Str(text);
    }
    let body = pieces
        .iter()
        .map(|p| match p {
            TextPiece::Literal(s) => {
                let quoted = dart_string(s);
                quoted[1..quoted.len() - 1].to_string()
            }
            TextPiece::Interpolated(src) => format!("${{{src}}}"),
        })
        .collect::<Vec<_>>()
        .join(" ");
    PropertyValue::Raw(format!("'{body}'"))
}

/// Always vertical; no layout direction is inferred.
fn vertical_wrapper(children: Vec<WidgetNode>) -> WidgetNode {
    WidgetNode::new("Column").with_children(WidgetChildren::many("children", children))
}

pub struct WidgetTreeBuilder<'t> {
    table: MappingTable<'t>,
    class_names: BTreeSet<String>,
    custom_components: BTreeSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl<'t> WidgetTreeBuilder<'t> {
    pub fn new(table: MappingTable<'t>) -> Self {
        Self {
            table,
            class_names: BTreeSet::new(),
            custom_components: BTreeSet::new(),
            diagnostics: vec![],
        }
    }

    pub fn finish(self, component_name: Option<String>, root: WidgetNode) -> LoweredTree {
        LoweredTree {
            component_name,
            root,
            class_names: self.class_names,
            custom_components: self.custom_components,
            diagnostics: self.diagnostics,
        }
    }

    fn diagnostic(&mut self, kind: DiagnosticKind, message: String) {
        trace!(?kind, %message, "lowering diagnostic");
        self.diagnostics.push(Diagnostic::new(kind, message));
    }

    pub fn lower(&mut self, element: &JSXElement) -> WidgetNode {
        let source_tag = jsx_name(&element.opening.name);
        match self.table.lookup(&source_tag) {
            Some(resolved) => self.lower_mapped(element, &source_tag, resolved.row, resolved.target_tag),
            None if is_custom_component_name(&element.opening.name) => self.lower_custom(element, source_tag),
            None => {
                self.diagnostic(
                    DiagnosticKind::UnmappedConstruct,
                    format!("<{source_tag}> has no mapping; lowered as {}", FALLBACK_MAPPING.target_tag),
                );
                self.lower_mapped(element, &source_tag, &FALLBACK_MAPPING, FALLBACK_MAPPING.target_tag)
            }
        }
    }

    /// Lower sibling roots (a fragment): one node, wrapped when there are several.
    pub fn lower_siblings(&mut self, children: &[JSXElementChild]) -> WidgetNode {
        let mut nodes = self.lower_children(children);
        match nodes.len() {
            0 => WidgetNode::default(),
            1 => nodes.remove(0),
            _ => vertical_wrapper(nodes),
        }
    }

    fn lower_mapped(
        &mut self,
        element: &JSXElement,
        source_tag: &str,
        row: &ElementMapping,
        target_tag: &str,
    ) -> WidgetNode {
        trace!(source = source_tag, target = target_tag, "mapped element");
        let mut node = WidgetNode::new(target_tag).from_source(source_tag);

        for attr in &element.opening.attrs {
            self.lower_attr(attr, row, &mut node);
        }
        for (key, value) in row.extras {
            if !node.has_property(key) {
                node.properties.push(WidgetProperty::named(*key, PropertyValue::Raw(value.to_string())));
            }
        }

        if row.roles.text_like {
            let mut pieces = vec![];
            self.collect_text(&element.children, &mut pieces, &mut node);
            node.properties.insert(0, WidgetProperty::positional(text_payload(&pieces)));
        } else {
            let children = self.lower_children(&element.children);
            self.place_children(&mut node, row.slot, children);
        }

        if row.roles.navigational && !node.has_property("onTap") {
            node.properties.push(WidgetProperty::named("onTap", PropertyValue::Raw("() {}".to_string())));
        }
        node
    }

    fn lower_custom(&mut self, element: &JSXElement, name: String) -> WidgetNode {
        trace!(component = %name, "custom component pass-through");
        self.custom_components.insert(name.clone());
        let mut node = WidgetNode::new(name.clone()).from_source(name);

        for attr in &element.opening.attrs {
            let JSXAttrOrSpread::JSXAttr(attr) = attr else {
                self.lower_spread(attr, &mut node);
                continue;
            };
            let key = jsx_attr_name(&attr.name);
            let value = AttrValue::of(attr.value.as_ref());
            if self.lower_common_attr(&key, &value, &mut node) {
                continue;
            }
            let value = match &value {
                AttrValue::Flag => PropertyValue::Bool(true),
                AttrValue::Str(s) => PropertyValue::Str(s.clone()),
                AttrValue::Element(el) => PropertyValue::Widget(Box::new(self.lower(el))),
                AttrValue::Fragment(f) => PropertyValue::Widget(Box::new(self.lower_siblings(&f.children))),
                AttrValue::Expr(_) if is_event_handler_name(&key) => handler_value(&value),
                AttrValue::Expr(e) => PropertyValue::Raw(expr_source(e)),
            };
            node.properties.push(WidgetProperty::named(key, value));
        }

        let children = self.lower_children(&element.children);
        self.place_children(&mut node, ChildSlot::Single("child"), children);
        node
    }

    fn lower_spread(&mut self, attr: &JSXAttrOrSpread, node: &mut WidgetNode) {
        if let JSXAttrOrSpread::SpreadElement(s) = attr {
            let src = expr_source(&s.expr);
            node.properties
                .push(WidgetProperty::comment("", format!("{{...{src}}} spread attributes not lowered")));
            self.diagnostic(
                DiagnosticKind::UnmappedConstruct,
                format!("spread attributes {{...{src}}} on <{}>", node.target_tag),
            );
        }
    }

    fn record_class_names(&mut self, value: &AttrValue<'_>) {
        match value {
            AttrValue::Str(s) => self.class_names.extend(s.split_whitespace().map(str::to_string)),
            AttrValue::Expr(e) => self.class_names.extend(class_tokens(e)),
            _ => {}
        }
    }

    /// Attributes of a text element nested in another one. Its text merges
    /// into the outer payload, so its attributes land on the outer node.
    fn lower_nested_text_attrs(&mut self, element: &JSXElement, tag: &str, node: &mut WidgetNode) {
        for attr in &element.opening.attrs {
            let JSXAttrOrSpread::JSXAttr(attr) = attr else {
                self.lower_spread(attr, node);
                continue;
            };
            let name = jsx_attr_name(&attr.name);
            let value = AttrValue::of(attr.value.as_ref());
            if matches!(name.as_str(), "className" | "class") {
                self.record_class_names(&value);
                node.comments.push(format!("<{tag}> className: {}", value.describe()));
                continue;
            }
            node.properties.push(WidgetProperty::comment(
                format!("<{tag}> {name}"),
                format!("unhandled attribute ({})", value.describe()),
            ));
            self.diagnostic(
                DiagnosticKind::UnmappedConstruct,
                format!("attribute {name} on <{tag}> nested in {} is not lowered", node.target_tag),
            );
        }
    }

    /// `className` and `key`, shared by mapped and custom elements.
    fn lower_common_attr(&mut self, name: &str, value: &AttrValue<'_>, node: &mut WidgetNode) -> bool {
        match name {
            "className" | "class" => {
                self.record_class_names(value);
                node.comments.push(format!("className: {}", value.describe()));
                true
            }
            "key" => {
                node.properties.push(WidgetProperty::named(
                    "key",
                    PropertyValue::Raw(format!("ValueKey({})", value.dart_source())),
                ));
                true
            }
            _ => false,
        }
    }

    fn unhandled_attr(&mut self, name: &str, value: &AttrValue<'_>, node: &mut WidgetNode) {
        let described = value.describe();
        node.properties
            .push(WidgetProperty::comment(name, format!("unhandled attribute ({described})")));
        self.diagnostic(
            DiagnosticKind::UnmappedConstruct,
            format!("attribute {name} on <{}> has no lowering rule", node.source_tag.as_deref().unwrap_or("?")),
        );
    }

    fn lower_attr(&mut self, attr: &JSXAttrOrSpread, row: &ElementMapping, node: &mut WidgetNode) {
        let JSXAttrOrSpread::JSXAttr(attr) = attr else {
            self.lower_spread(attr, node);
            return;
        };
        let name = jsx_attr_name(&attr.name);
        let value = AttrValue::of(attr.value.as_ref());
        if self.lower_common_attr(&name, &value, node) {
            return;
        }

        let source_tag = node.source_tag.clone().unwrap_or_default();
        let text_input = TEXT_INPUTS.contains(&source_tag.as_str());
        let property = match name.as_str() {
            "onClick" | "onPress" => {
                let key = if row.roles.button_like { "onPressed" } else { "onTap" };
                WidgetProperty::named(key, handler_value(&value))
            }
            "onChange" | "onChangeText" => WidgetProperty::named("onChanged", handler_value(&value)),
            "onLongPress" => WidgetProperty::named("onLongPress", handler_value(&value)),
            "value" => match (&value, value.literal()) {
                (AttrValue::Str(_), _) | (AttrValue::Expr(_), Some(_)) if text_input => {
                    let text = match &value {
                        AttrValue::Str(s) => dart_string(s),
                        _ => format!("'{}'", value.describe()),
                    };
                    WidgetProperty::named(
                        "controller",
                        PropertyValue::Raw(format!("TextEditingController(text: {text})")),
                    )
                }
                (AttrValue::Expr(e), None) => WidgetProperty::comment(
                    "value",
                    format!("{} (external controller needed)", expr_source(e)),
                ),
                _ => WidgetProperty::named("value", PropertyValue::Raw(value.dart_source())),
            },
            "disabled" => {
                let enabled = match &value {
                    AttrValue::Flag | AttrValue::Str(_) => PropertyValue::Bool(false),
                    AttrValue::Expr(e) => match unwrap_expr(e) {
                        Expr::Lit(Lit::Bool(b)) => PropertyValue::Bool(!b.value),
                        other => PropertyValue::Raw(format!("!({})", expr_source(other))),
                    },
                    _ => PropertyValue::Bool(false),
                };
                WidgetProperty::named("enabled", enabled)
            }
            "id" if text_input => WidgetProperty::named("restorationId", PropertyValue::Raw(value.dart_source())),
            "id" if !node.has_property("key") => {
                WidgetProperty::named("key", PropertyValue::Raw(format!("Key({})", value.dart_source())))
            }
            "type" if source_tag == "input" => match value.describe().as_str() {
                "password" => WidgetProperty::named("obscureText", PropertyValue::Bool(true)),
                "email" => WidgetProperty::named("keyboardType", PropertyValue::Raw("TextInputType.emailAddress".into())),
                "number" => WidgetProperty::named("keyboardType", PropertyValue::Raw("TextInputType.number".into())),
                "tel" => WidgetProperty::named("keyboardType", PropertyValue::Raw("TextInputType.phone".into())),
                "url" => WidgetProperty::named("keyboardType", PropertyValue::Raw("TextInputType.url".into())),
                "text" => WidgetProperty::comment("type", "text"),
                _ => return self.unhandled_attr(&name, &value, node),
            },
            "type" if row.roles.button_like => WidgetProperty::comment("type", value.describe()),
            "src" if source_tag == "img" => WidgetProperty::positional(match &value {
                AttrValue::Str(s) => PropertyValue::Str(s.clone()),
                other => PropertyValue::Raw(other.describe()),
            }),
            "alt" if source_tag == "img" => WidgetProperty::named("semanticLabel", PropertyValue::Raw(value.dart_source())),
            "href" if row.roles.navigational => WidgetProperty::comment("href", value.describe()),
            "placeholder" if text_input => {
                let hint = WidgetNode::new("InputDecoration")
                    .with_property(WidgetProperty::named("hintText", PropertyValue::Raw(value.dart_source())));
                WidgetProperty::named("decoration", PropertyValue::Widget(Box::new(hint)))
            }
            _ => return self.unhandled_attr(&name, &value, node),
        };
        node.properties.push(property);
    }

    /// Flatten text children of a text-like element into payload pieces.
    fn collect_text(&mut self, children: &[JSXElementChild], pieces: &mut Vec<TextPiece>, node: &mut WidgetNode) {
        for child in children {
            match child {
                JSXElementChild::JSXText(t) => {
                    let text = normalize_text(&t.value);
                    if !text.is_empty() {
                        pieces.push(TextPiece::Literal(text));
                    }
                }
                JSXElementChild::JSXExprContainer(JSXExprContainer {
                    expr: JSXExpr::Expr(e),
                    ..
                }) => match unwrap_expr(e) {
                    Expr::Lit(Lit::Str(s)) if s.value.trim().is_empty() => {}
                    Expr::Lit(Lit::Str(s)) => pieces.push(TextPiece::Literal(s.value.to_string())),
                    Expr::Lit(Lit::Num(_)) => pieces.push(TextPiece::Literal(expr_source(e))),
                    simple if member_path(simple).is_some() => {
                        pieces.push(TextPiece::Interpolated(expr_source(simple)));
                    }
                    other => {
                        let message = format!("{}: {}", expression_kind(other), expr_source(other));
                        node.comments.push(message.clone());
                        self.diagnostic(DiagnosticKind::UnmappedConstruct, message);
                    }
                },
                JSXElementChild::JSXExprContainer(_) => {}
                JSXElementChild::JSXElement(el) => {
                    let tag = jsx_name(&el.opening.name);
                    let text_like = self.table.lookup(&tag).is_some_and(|m| m.row.roles.text_like);
                    if text_like {
                        self.lower_nested_text_attrs(el, &tag, node);
                        self.collect_text(&el.children, pieces, node);
                    } else {
                        let message = format!("<{tag}> dropped: {} takes text only", node.target_tag);
                        node.comments.push(message.clone());
                        self.diagnostic(DiagnosticKind::UnmappedConstruct, message);
                    }
                }
                JSXElementChild::JSXFragment(f) => self.collect_text(&f.children, pieces, node),
                JSXElementChild::JSXSpreadChild(s) => {
                    let message = format!("spread child {{...{}}} not lowered", expr_source(&s.expr));
                    node.comments.push(message.clone());
                    self.diagnostic(DiagnosticKind::UnmappedConstruct, message);
                }
            }
        }
    }

    fn placeholder(&mut self, expr: &Expr) -> WidgetNode {
        let message = format!("{}: {}", expression_kind(expr), expr_source(expr));
        self.diagnostic(DiagnosticKind::UnmappedConstruct, message.clone());
        WidgetNode::placeholder(message)
    }

    fn lower_children(&mut self, children: &[JSXElementChild]) -> Vec<WidgetNode> {
        let mut out = vec![];
        for child in children {
            match child {
                JSXElementChild::JSXText(t) => {
                    let text = normalize_text(&t.value);
                    if !text.is_empty() {
                        out.push(WidgetNode::text(text));
                    }
                }
                JSXElementChild::JSXExprContainer(c) => {
                    let JSXExpr::Expr(e) = &c.expr else { continue };
                    match unwrap_expr(e) {
                        Expr::Lit(Lit::Str(s)) if !s.value.trim().is_empty() => out.push(WidgetNode::text(s.value.to_string())),
                        Expr::Lit(Lit::Str(_)) => {}
                        Expr::Lit(Lit::Num(_)) => out.push(WidgetNode::text(expr_source(e))),
                        Expr::JSXElement(el) => out.push(self.lower(el)),
                        Expr::JSXFragment(f) => out.extend(self.lower_children(&f.children)),
                        other => out.push(self.placeholder(other)),
                    }
                }
                JSXElementChild::JSXElement(el) => out.push(self.lower(el)),
                JSXElementChild::JSXFragment(f) => out.extend(self.lower_children(&f.children)),
                JSXElementChild::JSXSpreadChild(s) => out.push(self.placeholder(&s.expr)),
            }
        }
        out
    }

    fn place_children(&mut self, node: &mut WidgetNode, slot: ChildSlot, mut children: Vec<WidgetNode>) {
        if children.is_empty() {
            return;
        }
        node.children = match slot {
            ChildSlot::None => {
                let message = format!("{} child widget(s) dropped: {} has no child slot", children.len(), node.target_tag);
                node.comments.push(message.clone());
                self.diagnostic(DiagnosticKind::UnmappedConstruct, message);
                WidgetChildren::None
            }
            ChildSlot::Single(slot) if children.len() == 1 => WidgetChildren::single(slot, children.remove(0)),
            ChildSlot::Single(slot) => WidgetChildren::single(slot, vertical_wrapper(children)),
            ChildSlot::Many(slot) => WidgetChildren::many(slot, children),
        };
    }
}

/// Lower the JSX rendered by the module's component.
pub fn lower_to_widget_tree(module: &Module, structure: &ComponentStructure, config: &TransformConfig) -> LoweredTree {
    let mut builder = WidgetTreeBuilder::new(MappingTable::with_overrides(&config.target_overrides));

    let rendered = find_component(module).and_then(|c| c.rendered_jsx());
    let root = match rendered {
        Some(Expr::JSXElement(el)) => builder.lower(el),
        Some(Expr::JSXFragment(f)) => builder.lower_siblings(&f.children),
        _ => match first_jsx_anywhere(module) {
            Some(el) => {
                builder.diagnostic(
                    DiagnosticKind::StructuralAmbiguity,
                    "no rendered JSX found for the component; lowering the first JSX element in the file".to_string(),
                );
                builder.lower(&el)
            }
            None => {
                builder.diagnostic(DiagnosticKind::StructuralAmbiguity, "no JSX to lower".to_string());
                WidgetNode::default()
            }
        },
    };

    debug!(
        component = structure.component_name.as_deref().unwrap_or("<none>"),
        root = %root.target_tag,
        "widget tree lowered"
    );
    builder.finish(structure.component_name.clone(), root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse::parse_source, structure::analyze_structure};

    fn lower(code: &str) -> LoweredTree {
        let parsed = parse_source(code, "C.jsx").expect("parse");
        let config = TransformConfig::default();
        let structure = analyze_structure(&parsed.module, "C.jsx", &config);
        lower_to_widget_tree(&parsed.module, &structure, &config)
    }

    #[test]
    fn text_children_join_with_single_spaces() {
        let tree = lower("const C = ({ name }) => <p>Hello   {name}, <strong>welcome</strong> back</p>;");
        assert_eq!(tree.root.target_tag, "Text");
        assert_eq!(
            tree.root.properties[0].value,
            PropertyValue::Raw("'Hello ${name} , welcome back'".to_string())
        );
    }

    #[test]
    fn nested_text_attributes_surface_on_the_outer_text() {
        let tree = lower("const C = () => <p>Hi <b className=\"hl\" title=\"t\">there</b></p>;");
        assert_eq!(tree.root.comments, vec!["<b> className: hl".to_string()]);
        assert!(tree.class_names.contains("hl"));
        let comment = &tree.root.properties[1];
        assert!(comment.is_comment);
        assert_eq!(comment.key, "<b> title");
        assert!(tree.diagnostics.iter().any(|d| d.message.contains("attribute title on <b>")));
    }

    #[test]
    fn empty_string_children_add_no_text() {
        let tree = lower("const C = () => <p>a{''}b{\" \"}</p>;");
        assert_eq!(tree.root.properties[0].value, PropertyValue::Str("a b".to_string()));
    }

    #[test]
    fn expression_children_become_placeholders() {
        let tree = lower(
            "function C({ items, open, label }) { return <section>{open && <b>x</b>}{items.map(i => <li>{i}</li>)}{label}</section>; }",
        );
        let WidgetChildren::Many { nodes, .. } = &tree.root.children else {
            panic!("section lowers to a Column with children");
        };
        let comments: Vec<_> = nodes.iter().map(|n| n.comments[0].as_str()).collect();
        assert!(comments[0].starts_with("conditional render: "));
        assert!(comments[1].starts_with("list render: "));
        assert_eq!(comments[2], "expression: label");
        assert_eq!(tree.diagnostics.len(), 3);
    }

    #[test]
    fn unknown_lowercase_tag_falls_back_to_container() {
        let tree = lower("const C = () => <marquee speed=\"3\">hi</marquee>;");
        assert_eq!(tree.root.target_tag, "Container");
        assert_eq!(tree.root.source_tag.as_deref(), Some("marquee"));
        assert!(tree.root.properties.iter().any(|p| p.is_comment && p.key == "speed"));
        assert!(tree
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::UnmappedConstruct && d.message.contains("<marquee>")));
    }

    #[test]
    fn custom_components_pass_through() {
        let tree = lower("const C = () => <Card title=\"Hi\" onSelect={pick} icon={<Icon />}><span>x</span></Card>;");
        assert_eq!(tree.root.target_tag, "Card");
        assert_eq!(
            tree.custom_components.iter().cloned().collect::<Vec<_>>(),
            vec!["Card".to_string(), "Icon".to_string()]
        );
        assert_eq!(tree.root.properties[0].value, PropertyValue::Str("Hi".into()));
        assert_eq!(tree.root.properties[1].value, PropertyValue::Raw("pick".into()));
        assert!(matches!(tree.root.properties[2].value, PropertyValue::Widget(_)));
        assert!(matches!(tree.root.children, WidgetChildren::Single { .. }));
    }

    #[test]
    fn target_overrides_apply() {
        let parsed = parse_source("const C = () => <button>Go</button>;", "C.jsx").expect("parse");
        let mut config = TransformConfig::default();
        config
            .target_overrides
            .insert("button".to_string(), "FilledButton".to_string());
        let structure = analyze_structure(&parsed.module, "C.jsx", &config);
        let tree = lower_to_widget_tree(&parsed.module, &structure, &config);
        assert_eq!(tree.root.target_tag, "FilledButton");
    }
}
