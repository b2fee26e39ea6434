use std::collections::BTreeMap;

use serde::Serialize;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};

use super::decls::DeclIndex;
use crate::{
    component::find_component,
    expr::{expr_source, member_path, unwrap_expr, ValueKind},
    parse::{Location, Locator},
    structure::{attr_value_kind, is_custom_component_name, jsx_attr_name, jsx_name},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedProp {
    pub name: String,
    pub value_kind: ValueKind,
    /// Literal text or a source summary of the value.
    pub value: String,
    pub is_callback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRecord {
    /// The component declared in this file.
    pub parent: Option<String>,
    pub child: String,
    /// Nearest enclosing custom-component element, if any.
    pub jsx_parent: Option<String>,
    pub props: Vec<ComposedProp>,
    pub location: Location,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionTree {
    pub root: Option<String>,
    pub edges: BTreeMap<String, Vec<String>>,
}

struct CompositionVisitor<'a, 'r> {
    decls: &'r DeclIndex<'a>,
    locator: &'r Locator,
    parent: Option<String>,
    stack: Vec<String>,
    records: Vec<CompositionRecord>,
}

impl CompositionVisitor<'_, '_> {
    fn is_callback(&self, expr: &Expr) -> bool {
        match unwrap_expr(expr) {
            Expr::Arrow(_) | Expr::Fn(_) => true,
            Expr::Ident(i) => self.decls.contains(i.sym.as_ref()),
            e => member_path(e)
                .and_then(|p| p.strip_prefix("this.").map(str::to_string))
                .is_some_and(|m| self.decls.contains(&m)),
        }
    }

    fn composed_prop(&self, attr: &JSXAttrOrSpread) -> ComposedProp {
        match attr {
            JSXAttrOrSpread::SpreadElement(s) => ComposedProp {
                name: "...".to_string(),
                value_kind: ValueKind::Object,
                value: expr_source(&s.expr),
                is_callback: false,
            },
            JSXAttrOrSpread::JSXAttr(attr) => {
                let (value, is_callback) = match &attr.value {
                    None => ("true".to_string(), false),
                    Some(JSXAttrValue::Lit(Lit::Str(s))) => (s.value.to_string(), false),
                    Some(JSXAttrValue::Lit(other)) => (expr_source(&Expr::Lit(other.clone())), false),
                    Some(JSXAttrValue::JSXExprContainer(c)) => match &c.expr {
                        JSXExpr::Expr(e) => (expr_source(e), self.is_callback(e)),
                        JSXExpr::JSXEmptyExpr(_) => (String::new(), false),
                    },
                    Some(JSXAttrValue::JSXElement(el)) => (format!("<{} />", jsx_name(&el.opening.name)), false),
                    Some(JSXAttrValue::JSXFragment(_)) => ("<>…</>".to_string(), false),
                };
                ComposedProp {
                    name: jsx_attr_name(&attr.name),
                    value_kind: attr_value_kind(attr.value.as_ref()),
                    value,
                    is_callback,
                }
            }
        }
    }
}

impl Visit for CompositionVisitor<'_, '_> {
    fn visit_jsx_element(&mut self, n: &JSXElement) {
        if !is_custom_component_name(&n.opening.name) {
            n.visit_children_with(self);
            return;
        }

        let child = jsx_name(&n.opening.name);
        let props = n.opening.attrs.iter().map(|a| self.composed_prop(a)).collect();
        self.records.push(CompositionRecord {
            parent: self.parent.clone(),
            child: child.clone(),
            jsx_parent: self.stack.last().cloned(),
            props,
            location: self.locator.locate(n.opening.span),
        });

        self.stack.push(child);
        n.visit_children_with(self);
        self.stack.pop();
    }
}

pub fn analyze_composition(module: &Module, decls: &DeclIndex<'_>, locator: &Locator) -> Vec<CompositionRecord> {
    let mut visitor = CompositionVisitor {
        decls,
        locator,
        parent: find_component(module).and_then(|c| c.name).map(str::to_string),
        stack: vec![],
        records: vec![],
    };
    module.visit_with(&mut visitor);
    visitor.records
}

/// Group composition records into parent -> children edges. Elements nested
/// inside another custom component hang off that component; the rest hang
/// off the declaring component.
pub fn composition_tree(records: &[CompositionRecord]) -> CompositionTree {
    let root = records.iter().find_map(|r| r.parent.clone());
    let mut edges: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for record in records {
        let from = record
            .jsx_parent
            .clone()
            .or_else(|| record.parent.clone())
            .unwrap_or_else(|| "<root>".to_string());
        let children = edges.entry(from).or_default();
        if !children.contains(&record.child) {
            children.push(record.child.clone());
        }
    }
    CompositionTree { root, edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse::parse_source, state::analyze_state};

    const PAGE: &str = r#"
        import { Card, Avatar } from "./ui";
        export default function Profile({ user }) {
            const onEdit = () => open(user.id);
            return (
                <Layout title="Profile">
                    <Card user={user} onEdit={onEdit} compact>
                        <Avatar src={user.avatar} onLoad={() => track()} />
                    </Card>
                    <Card {...user} />
                </Layout>
            );
        }
    "#;

    #[test]
    fn records_custom_children_and_callbacks() {
        let parsed = parse_source(PAGE, "Profile.jsx").expect("parse");
        let state = analyze_state(&parsed.module, &parsed.locator());
        let records = &state.composition;
        let children: Vec<_> = records.iter().map(|r| r.child.as_str()).collect();
        assert_eq!(children, vec!["Layout", "Card", "Avatar", "Card"]);
        assert!(records.iter().all(|r| r.parent.as_deref() == Some("Profile")));

        let card = &records[1];
        assert_eq!(card.jsx_parent.as_deref(), Some("Layout"));
        assert_eq!(card.props.len(), 3);
        assert!(!card.props[0].is_callback);
        assert!(card.props[1].is_callback);
        assert_eq!(card.props[2].value_kind, ValueKind::Boolean);
        assert_eq!(card.props[2].value, "true");

        let avatar = &records[2];
        assert_eq!(avatar.jsx_parent.as_deref(), Some("Card"));
        assert_eq!(avatar.props[0].value, "user.avatar");
        assert!(avatar.props[1].is_callback);

        assert_eq!(records[3].props[0].name, "...");
    }

    #[test]
    fn tree_groups_by_nearest_custom_parent() {
        let parsed = parse_source(PAGE, "Profile.jsx").expect("parse");
        let state = analyze_state(&parsed.module, &parsed.locator());
        let tree = composition_tree(&state.composition);
        assert_eq!(tree.root.as_deref(), Some("Profile"));
        assert_eq!(tree.edges["Profile"], vec!["Layout".to_string()]);
        assert_eq!(tree.edges["Layout"], vec!["Card".to_string()]);
        assert_eq!(tree.edges["Card"], vec!["Avatar".to_string()]);
    }
}
