use serde::Serialize;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};

use crate::{
    component::{find_component, ComponentBody},
    expr::{inferred_type, literal_value, member_path, prop_name, snapshot_value, unwrap_expr},
    naming::is_props_type_name,
    parse::{Location, Locator},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub prop_type: String,
    pub required: bool,
    pub default_value: Option<serde_json::Value>,
    /// False when `default_value` holds source text rather than a literal.
    pub default_is_literal: bool,
    pub usage_locations: Vec<Location>,
}

impl PropRecord {
    fn new(name: String, prop_type: &str, default: Option<&Expr>) -> Self {
        let prop_type = match default {
            Some(d) => inferred_type(Some(d)),
            None => prop_type,
        };
        Self {
            name,
            prop_type: prop_type.to_string(),
            required: default.is_none(),
            default_value: default.map(snapshot_value),
            default_is_literal: default.is_some_and(|d| literal_value(d).is_some()),
            usage_locations: vec![],
        }
    }
}

/// Syntactic rendering of a TypeScript type annotation.
pub fn ts_type_text(ty: &TsType) -> String {
    match ty {
        TsType::TsKeywordType(k) => match k.kind {
            TsKeywordTypeKind::TsStringKeyword => "string",
            TsKeywordTypeKind::TsNumberKeyword => "number",
            TsKeywordTypeKind::TsBooleanKeyword => "boolean",
            TsKeywordTypeKind::TsAnyKeyword => "any",
            TsKeywordTypeKind::TsUnknownKeyword => "unknown",
            TsKeywordTypeKind::TsVoidKeyword => "void",
            TsKeywordTypeKind::TsNullKeyword => "null",
            TsKeywordTypeKind::TsUndefinedKeyword => "undefined",
            TsKeywordTypeKind::TsObjectKeyword => "object",
            TsKeywordTypeKind::TsNeverKeyword => "never",
            TsKeywordTypeKind::TsBigIntKeyword => "bigint",
            TsKeywordTypeKind::TsSymbolKeyword => "symbol",
            _ => "unknown",
        }
        .to_string(),
        TsType::TsTypeRef(r) => {
            let mut name = entity_name(&r.type_name);
            if let Some(params) = &r.type_params {
                let args: Vec<String> = params.params.iter().map(|p| ts_type_text(p)).collect();
                name = format!("{}<{}>", name, args.join(", "));
            }
            name
        }
        TsType::TsArrayType(a) => format!("{}[]", ts_type_text(&a.elem_type)),
        TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(u)) => u
            .types
            .iter()
            .map(|t| ts_type_text(t))
            .collect::<Vec<_>>()
            .join(" | "),
        TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(i)) => i
            .types
            .iter()
            .map(|t| ts_type_text(t))
            .collect::<Vec<_>>()
            .join(" & "),
        TsType::TsLitType(l) => match &l.lit {
            TsLit::Str(s) => format!("\"{}\"", s.value),
            TsLit::Number(n) => n.value.to_string(),
            TsLit::Bool(b) => b.value.to_string(),
            _ => "literal".to_string(),
        },
        TsType::TsFnOrConstructorType(TsFnOrConstructorType::TsFnType(f)) => {
            let params: Vec<String> = f
                .params
                .iter()
                .map(|p| match p {
                    TsFnParam::Ident(b) => match &b.type_ann {
                        Some(ann) => format!("{}: {}", b.id.sym, ts_type_text(&ann.type_ann)),
                        None => b.id.sym.to_string(),
                    },
                    _ => "…".to_string(),
                })
                .collect();
            format!("({}) => {}", params.join(", "), ts_type_text(&f.type_ann.type_ann))
        }
        TsType::TsParenthesizedType(p) => ts_type_text(&p.type_ann),
        TsType::TsTupleType(t) => format!(
            "[{}]",
            t.elem_types
                .iter()
                .map(|e| ts_type_text(&e.ty))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        TsType::TsTypeLit(_) => "object".to_string(),
        _ => "unknown".to_string(),
    }
}

fn entity_name(name: &TsEntityName) -> String {
    match name {
        TsEntityName::Ident(i) => i.sym.to_string(),
        TsEntityName::TsQualifiedName(q) => format!("{}.{}", entity_name(&q.left), q.right.sym),
    }
}

/// Records from a destructured (or plain identifier) props parameter.
fn records_from_pattern(pat: &Pat) -> Vec<PropRecord> {
    match pat {
        Pat::Object(obj) => obj
            .props
            .iter()
            .filter_map(|prop| match prop {
                ObjectPatProp::Assign(a) => Some(PropRecord::new(
                    a.key.id.sym.to_string(),
                    "unknown",
                    a.value.as_deref(),
                )),
                ObjectPatProp::KeyValue(kv) => {
                    let name = prop_name(&kv.key)?;
                    let default = match &*kv.value {
                        Pat::Assign(assign) => Some(&*assign.right),
                        _ => None,
                    };
                    Some(PropRecord::new(name, "unknown", default))
                }
                ObjectPatProp::Rest(rest) => match &*rest.arg {
                    Pat::Ident(b) => {
                        let mut record = PropRecord::new(b.id.sym.to_string(), "object", None);
                        record.required = false;
                        Some(record)
                    }
                    _ => None,
                },
            })
            .collect(),
        Pat::Ident(b) => vec![PropRecord::new(b.id.sym.to_string(), "object", None)],
        Pat::Assign(a) => records_from_pattern(&a.left),
        _ => vec![],
    }
}

/// Inline `({ a }: { a: string })` annotations.
fn inline_type_members(pat: &Pat) -> Option<&[TsTypeElement]> {
    let ann = match pat {
        Pat::Object(o) => o.type_ann.as_deref(),
        Pat::Ident(b) => b.type_ann.as_deref(),
        Pat::Assign(a) => return inline_type_members(&a.left),
        _ => None,
    }?;
    match &*ann.type_ann {
        TsType::TsTypeLit(lit) => Some(&lit.members),
        _ => None,
    }
}

/// `(name, type, optional)` rows from interface/type-literal members.
fn member_rows(members: &[TsTypeElement]) -> Vec<(String, String, bool)> {
    members
        .iter()
        .filter_map(|m| match m {
            TsTypeElement::TsPropertySignature(p) => {
                let name = match unwrap_expr(&p.key) {
                    Expr::Ident(i) => i.sym.to_string(),
                    Expr::Lit(Lit::Str(s)) => s.value.to_string(),
                    _ => return None,
                };
                let ty = p
                    .type_ann
                    .as_ref()
                    .map(|a| ts_type_text(&a.type_ann))
                    .unwrap_or_else(|| "unknown".to_string());
                Some((name, ty, p.optional))
            }
            TsTypeElement::TsMethodSignature(m) => match unwrap_expr(&m.key) {
                Expr::Ident(i) => Some((i.sym.to_string(), "function".to_string(), m.optional)),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

#[derive(Default)]
struct PropsTypeCollector {
    rows: Vec<(String, String, bool)>,
}

impl Visit for PropsTypeCollector {
    fn visit_ts_interface_decl(&mut self, n: &TsInterfaceDecl) {
        if is_props_type_name(n.id.sym.as_ref()) {
            self.rows.extend(member_rows(&n.body.body));
        }
    }

    fn visit_ts_type_alias_decl(&mut self, n: &TsTypeAliasDecl) {
        if is_props_type_name(n.id.sym.as_ref()) {
            if let TsType::TsTypeLit(lit) = &*n.type_ann {
                self.rows.extend(member_rows(&lit.members));
            }
        }
    }
}

fn apply_type_rows(records: &mut [PropRecord], rows: &[(String, String, bool)]) {
    for (name, ty, optional) in rows {
        if let Some(record) = records.iter_mut().find(|r| &r.name == name) {
            record.prop_type = ty.clone();
            record.required = !optional;
        }
    }
}

/// `this.props.x` reads and `const { a, b = 1 } = this.props` in class components.
struct ClassPropsCollector<'l> {
    locator: &'l Locator,
    records: Vec<PropRecord>,
}

impl ClassPropsCollector<'_> {
    fn record(&mut self, name: String, default: Option<&Expr>, location: Option<Location>) {
        let index = match self.records.iter().position(|r| r.name == name) {
            Some(i) => i,
            None => {
                self.records.push(PropRecord::new(name, "unknown", default));
                self.records.len() - 1
            }
        };
        if let Some(location) = location {
            self.records[index].usage_locations.push(location);
        }
    }
}

impl Visit for ClassPropsCollector<'_> {
    fn visit_member_expr(&mut self, n: &MemberExpr) {
        if member_path(&n.obj).as_deref() == Some("this.props") {
            if let MemberProp::Ident(p) = &n.prop {
                let location = self.locator.locate(n.span);
                self.record(p.sym.to_string(), None, Some(location));
            }
        }
        n.visit_children_with(self);
    }

    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        let from_props = d
            .init
            .as_deref()
            .and_then(member_path)
            .is_some_and(|p| p == "this.props");
        if from_props {
            for record in records_from_pattern(&d.name) {
                if !self.records.iter().any(|r| r.name == record.name) {
                    self.records.push(record);
                }
            }
        }
        d.visit_children_with(self);
    }
}

struct UsageCollector<'l, 'r> {
    locator: &'l Locator,
    records: &'r mut [PropRecord],
}

impl Visit for UsageCollector<'_, '_> {
    fn visit_expr(&mut self, n: &Expr) {
        if let Expr::Ident(i) = n {
            if let Some(record) = self.records.iter_mut().find(|r| r.name == i.sym.as_ref()) {
                record.usage_locations.push(self.locator.locate(i.span));
            }
        }
        n.visit_children_with(self);
    }

    fn visit_prop(&mut self, n: &Prop) {
        if let Prop::Shorthand(i) = n {
            if let Some(record) = self.records.iter_mut().find(|r| r.name == i.sym.as_ref()) {
                record.usage_locations.push(self.locator.locate(i.span));
            }
        }
        n.visit_children_with(self);
    }
}

pub fn analyze_props(module: &Module, locator: &Locator) -> Vec<PropRecord> {
    let Some(component) = find_component(module) else {
        return vec![];
    };

    let mut records = match component.body {
        ComponentBody::Class(class) => {
            let mut collector = ClassPropsCollector {
                locator,
                records: vec![],
            };
            class.visit_with(&mut collector);
            collector.records
        }
        _ => {
            let Some(param) = component.props_param() else {
                return vec![];
            };
            let mut records = records_from_pattern(param);
            if let Some(members) = inline_type_members(param) {
                apply_type_rows(&mut records, &member_rows(members));
            }
            let mut usage = UsageCollector {
                locator,
                records: &mut records,
            };
            match component.body {
                ComponentBody::Function(f) => {
                    if let Some(body) = &f.body {
                        body.visit_with(&mut usage);
                    }
                }
                ComponentBody::Arrow(a) => a.body.visit_with(&mut usage),
                ComponentBody::Class(_) => {}
            }
            records
        }
    };

    let mut types = PropsTypeCollector::default();
    module.visit_with(&mut types);
    apply_type_rows(&mut records, &types.rows);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_source;

    fn props(code: &str, path: &str) -> Vec<PropRecord> {
        let parsed = parse_source(code, path).expect("parse");
        analyze_props(&parsed.module, &parsed.locator())
    }

    #[test]
    fn destructured_defaults_decide_required() {
        let code = r#"
            const Button = ({ label, size = "md", count = 0, onPress, ...rest }) => (
                <button onClick={onPress}>{label}</button>
            );
        "#;
        let records = props(code, "Button.jsx");
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["label", "size", "count", "onPress", "rest"]);
        assert!(records[0].required);
        assert_eq!(records[0].prop_type, "unknown");
        assert_eq!(records[0].usage_locations.len(), 1);
        assert!(!records[1].required);
        assert_eq!(records[1].prop_type, "string");
        assert_eq!(records[1].default_value, Some(serde_json::json!("md")));
        assert_eq!(records[2].prop_type, "number");
        assert!(!records[4].required);
    }

    #[test]
    fn non_literal_defaults_are_flagged() {
        let records = props("const B = ({ size = DEFAULT_SIZE, tone = 'info' }) => <b />;", "B.jsx");
        assert_eq!(records[0].default_value, Some(serde_json::json!("DEFAULT_SIZE")));
        assert!(!records[0].default_is_literal);
        assert!(records[1].default_is_literal);
    }

    #[test]
    fn single_identifier_is_opaque() {
        let records = props("function Card(props) { return <div>{props.title}</div>; }", "Card.jsx");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "props");
        assert_eq!(records[0].prop_type, "object");
        assert!(records[0].required);
        assert_eq!(records[0].usage_locations.len(), 1);
    }

    #[test]
    fn interface_overrides_default_inference() {
        let code = r#"
            interface CardProps {
                title: string;
                size?: "sm" | "lg";
                items: Array<string>;
                onSelect?: (id: number) => void;
            }
            export function Card({ title, size = "sm", items, onSelect }: CardProps) {
                return <div>{title}</div>;
            }
        "#;
        let records = props(code, "Card.tsx");
        assert_eq!(records[0].prop_type, "string");
        assert!(records[0].required);
        assert_eq!(records[1].prop_type, r#""sm" | "lg""#);
        assert!(!records[1].required);
        assert_eq!(records[2].prop_type, "Array<string>");
        assert_eq!(records[3].prop_type, "(id: number) => void");
        assert!(!records[3].required);
    }

    #[test]
    fn interface_required_wins_over_default() {
        let code = r#"
            type BadgeProps = { tone: string };
            const Badge = ({ tone = "info" }: BadgeProps) => <span>{tone}</span>;
        "#;
        let records = props(code, "Badge.tsx");
        assert!(records[0].required);
        assert_eq!(records[0].default_value, Some(serde_json::json!("info")));
    }

    #[test]
    fn class_component_props() {
        let code = r#"
            class Profile extends React.Component {
                render() {
                    const { avatar, size = 32 } = this.props;
                    return <div title={this.props.name}><img src={avatar} /></div>;
                }
            }
        "#;
        let records = props(code, "Profile.jsx");
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["avatar", "size", "name"]);
        assert!(!records[1].required);
        assert_eq!(records[2].usage_locations.len(), 1);
    }
}
