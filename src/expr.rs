//! Syntactic classification of expressions.
//!
//! Nothing here evaluates code: expressions are bucketed by shape, literal
//! trees are lifted into JSON, and everything else is summarized as compact
//! source text for diagnostics.

use serde::Serialize;
use swc_core::ecma::ast::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Null,
    Identifier,
    Function,
    Object,
    Array,
    Element,
    Expression,
}

/// Strip parentheses and TypeScript-only wrappers.
pub fn unwrap_expr(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(p) => unwrap_expr(&p.expr),
        Expr::TsAs(a) => unwrap_expr(&a.expr),
        Expr::TsNonNull(n) => unwrap_expr(&n.expr),
        Expr::TsSatisfies(s) => unwrap_expr(&s.expr),
        Expr::TsConstAssertion(c) => unwrap_expr(&c.expr),
        _ => expr,
    }
}

pub fn value_kind(expr: &Expr) -> ValueKind {
    match unwrap_expr(expr) {
        Expr::Lit(Lit::Str(_)) | Expr::Tpl(_) => ValueKind::String,
        Expr::Lit(Lit::Num(_)) | Expr::Lit(Lit::BigInt(_)) => ValueKind::Number,
        Expr::Lit(Lit::Bool(_)) => ValueKind::Boolean,
        Expr::Lit(Lit::Null(_)) => ValueKind::Null,
        Expr::Ident(i) if i.sym.as_ref() == "undefined" => ValueKind::Null,
        Expr::Ident(_) => ValueKind::Identifier,
        Expr::Arrow(_) | Expr::Fn(_) => ValueKind::Function,
        Expr::Object(_) => ValueKind::Object,
        Expr::Array(_) => ValueKind::Array,
        Expr::JSXElement(_) | Expr::JSXFragment(_) => ValueKind::Element,
        _ => ValueKind::Expression,
    }
}

/// Type name inferred from an initializer's shape.
pub fn inferred_type(expr: Option<&Expr>) -> &'static str {
    let Some(expr) = expr else {
        return "undefined";
    };
    match value_kind(expr) {
        ValueKind::String => "string",
        ValueKind::Number => "number",
        ValueKind::Boolean => "boolean",
        ValueKind::Null => "null",
        ValueKind::Function => "function",
        ValueKind::Object => "object",
        ValueKind::Array => "array",
        ValueKind::Element => "element",
        ValueKind::Identifier | ValueKind::Expression => "unknown",
    }
}

/// Lift a literal expression tree into JSON. Returns `None` as soon as any
/// part of the tree is not a literal.
pub fn literal_value(expr: &Expr) -> Option<serde_json::Value> {
    use serde_json::Value;
    match unwrap_expr(expr) {
        Expr::Lit(Lit::Str(s)) => Some(Value::String(s.value.to_string())),
        Expr::Lit(Lit::Bool(b)) => Some(Value::Bool(b.value)),
        Expr::Lit(Lit::Null(_)) => Some(Value::Null),
        Expr::Lit(Lit::Num(n)) => {
            if n.value.fract() == 0.0 && n.value.abs() < 9.0e15 {
                Some(Value::from(n.value as i64))
            } else {
                serde_json::Number::from_f64(n.value).map(Value::Number)
            }
        }
        Expr::Unary(u) if u.op == UnaryOp::Minus => match literal_value(&u.arg)? {
            Value::Number(n) => n
                .as_i64()
                .map(|i| Value::from(-i))
                .or_else(|| n.as_f64().and_then(|f| serde_json::Number::from_f64(-f)).map(Value::Number)),
            _ => None,
        },
        Expr::Tpl(t) if t.exprs.is_empty() => Some(Value::String(
            t.quasis
                .iter()
                .map(|q| q.cooked.as_ref().map(|c| c.to_string()).unwrap_or_else(|| q.raw.to_string()))
                .collect(),
        )),
        Expr::Array(a) => {
            let mut out = Vec::with_capacity(a.elems.len());
            for el in &a.elems {
                match el {
                    Some(el) if el.spread.is_none() => out.push(literal_value(&el.expr)?),
                    _ => return None,
                }
            }
            Some(Value::Array(out))
        }
        Expr::Object(o) => {
            let mut out = serde_json::Map::new();
            for prop in &o.props {
                let PropOrSpread::Prop(p) = prop else {
                    return None;
                };
                let Prop::KeyValue(kv) = &**p else {
                    return None;
                };
                out.insert(prop_name(&kv.key)?, literal_value(&kv.value)?);
            }
            Some(Value::Object(out))
        }
        _ => None,
    }
}

/// Literal JSON when possible, otherwise the source summary as a string.
pub fn snapshot_value(expr: &Expr) -> serde_json::Value {
    literal_value(expr).unwrap_or_else(|| serde_json::Value::String(expr_source(expr)))
}

pub fn prop_name(name: &PropName) -> Option<String> {
    match name {
        PropName::Ident(i) => Some(i.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        PropName::Num(n) => Some(n.value.to_string()),
        _ => None,
    }
}

/// `a.b.c` for identifier/member chains, `None` for anything else.
pub fn member_path(expr: &Expr) -> Option<String> {
    match unwrap_expr(expr) {
        Expr::Ident(i) => Some(i.sym.to_string()),
        Expr::This(_) => Some("this".to_string()),
        Expr::Member(m) => {
            let obj = member_path(&m.obj)?;
            match &m.prop {
                MemberProp::Ident(p) => Some(format!("{}.{}", obj, p.sym)),
                MemberProp::Computed(c) => match unwrap_expr(&c.expr) {
                    Expr::Lit(Lit::Str(s)) => Some(format!(r#"{}["{}"]"#, obj, s.value)),
                    Expr::Lit(Lit::Num(n)) => Some(format!("{}[{}]", obj, n.value)),
                    _ => None,
                },
                MemberProp::PrivateName(_) => None,
            }
        }
        _ => None,
    }
}

/// Name of a call's callee: `fetch`, `router.push`, `React.useState`.
pub fn callee_path(call: &CallExpr) -> Option<String> {
    match &call.callee {
        Callee::Expr(e) => member_path(e),
        _ => None,
    }
}

/// Last segment of a callee path (`React.useState` -> `useState`).
pub fn callee_name(call: &CallExpr) -> Option<String> {
    let path = callee_path(call)?;
    Some(path.rsplit('.').next().unwrap_or(&path).to_string())
}

const MAX_SOURCE_DEPTH: usize = 6;

/// Compact, single-line source rendering used for diagnostics and raw
/// property values.
pub fn expr_source(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(expr, &mut out, 0);
    out
}

fn write_args(args: &[ExprOrSpread], out: &mut String, depth: usize) {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if arg.spread.is_some() {
            out.push_str("...");
        }
        write_expr(&arg.expr, out, depth + 1);
    }
}

fn write_expr(expr: &Expr, out: &mut String, depth: usize) {
    if depth > MAX_SOURCE_DEPTH {
        out.push('…');
        return;
    }
    match expr {
        Expr::Ident(i) => out.push_str(&i.sym),
        Expr::This(_) => out.push_str("this"),
        Expr::Lit(Lit::Str(s)) => {
            out.push('"');
            out.push_str(&s.value.replace('"', "\\\""));
            out.push('"');
        }
        Expr::Lit(Lit::Num(n)) => out.push_str(&n.value.to_string()),
        Expr::Lit(Lit::Bool(b)) => out.push_str(if b.value { "true" } else { "false" }),
        Expr::Lit(Lit::Null(_)) => out.push_str("null"),
        Expr::Lit(Lit::BigInt(b)) => out.push_str(&format!("{}n", b.value)),
        Expr::Lit(Lit::Regex(r)) => out.push_str(&format!("/{}/{}", r.exp, r.flags)),
        Expr::Lit(_) => out.push('…'),
        Expr::Paren(p) => {
            out.push('(');
            write_expr(&p.expr, out, depth + 1);
            out.push(')');
        }
        Expr::Member(m) => {
            write_expr(&m.obj, out, depth + 1);
            match &m.prop {
                MemberProp::Ident(p) => {
                    out.push('.');
                    out.push_str(&p.sym);
                }
                MemberProp::PrivateName(p) => {
                    out.push_str(".#");
                    out.push_str(&p.name);
                }
                MemberProp::Computed(c) => {
                    out.push('[');
                    write_expr(&c.expr, out, depth + 1);
                    out.push(']');
                }
            }
        }
        Expr::OptChain(o) => match &*o.base {
            OptChainBase::Member(m) => {
                write_expr(&m.obj, out, depth + 1);
                match &m.prop {
                    MemberProp::Ident(p) => {
                        out.push_str("?.");
                        out.push_str(&p.sym);
                    }
                    MemberProp::Computed(c) => {
                        out.push_str("?.[");
                        write_expr(&c.expr, out, depth + 1);
                        out.push(']');
                    }
                    MemberProp::PrivateName(_) => out.push_str("?.#…"),
                }
            }
            OptChainBase::Call(c) => {
                write_expr(&c.callee, out, depth + 1);
                out.push_str("?.(");
                write_args(&c.args, out, depth);
                out.push(')');
            }
        },
        Expr::Call(c) => {
            match &c.callee {
                Callee::Expr(e) => write_expr(e, out, depth + 1),
                Callee::Super(_) => out.push_str("super"),
                Callee::Import(_) => out.push_str("import"),
            }
            out.push('(');
            write_args(&c.args, out, depth);
            out.push(')');
        }
        Expr::New(n) => {
            out.push_str("new ");
            write_expr(&n.callee, out, depth + 1);
            out.push('(');
            if let Some(args) = &n.args {
                write_args(args, out, depth);
            }
            out.push(')');
        }
        Expr::Bin(b) => {
            write_expr(&b.left, out, depth + 1);
            out.push_str(&format!(" {} ", b.op));
            write_expr(&b.right, out, depth + 1);
        }
        Expr::Unary(u) => {
            let op = u.op.to_string();
            out.push_str(&op);
            if op.chars().all(|c| c.is_alphabetic()) {
                out.push(' ');
            }
            write_expr(&u.arg, out, depth + 1);
        }
        Expr::Update(u) => {
            if u.prefix {
                out.push_str(&u.op.to_string());
                write_expr(&u.arg, out, depth + 1);
            } else {
                write_expr(&u.arg, out, depth + 1);
                out.push_str(&u.op.to_string());
            }
        }
        Expr::Cond(c) => {
            write_expr(&c.test, out, depth + 1);
            out.push_str(" ? ");
            write_expr(&c.cons, out, depth + 1);
            out.push_str(" : ");
            write_expr(&c.alt, out, depth + 1);
        }
        Expr::Await(a) => {
            out.push_str("await ");
            write_expr(&a.arg, out, depth + 1);
        }
        Expr::Assign(a) => {
            match &a.left {
                AssignTarget::Simple(SimpleAssignTarget::Ident(b)) => out.push_str(&b.id.sym),
                AssignTarget::Simple(SimpleAssignTarget::Member(m)) => {
                    write_expr(&Expr::Member(m.clone()), out, depth + 1)
                }
                _ => out.push('…'),
            }
            out.push_str(&format!(" {} ", a.op));
            write_expr(&a.right, out, depth + 1);
        }
        Expr::Tpl(t) => {
            out.push('`');
            for (i, quasi) in t.quasis.iter().enumerate() {
                out.push_str(&quasi.raw);
                if let Some(e) = t.exprs.get(i) {
                    out.push_str("${");
                    write_expr(e, out, depth + 1);
                    out.push('}');
                }
            }
            out.push('`');
        }
        Expr::Arrow(a) => {
            out.push('(');
            for (i, p) in a.params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&pat_source(p));
            }
            out.push_str(") => ");
            match &*a.body {
                BlockStmtOrExpr::Expr(e) => write_expr(e, out, depth + 1),
                BlockStmtOrExpr::BlockStmt(_) => out.push_str("{…}"),
            }
        }
        Expr::Fn(f) => {
            out.push_str("function");
            if let Some(id) = &f.ident {
                out.push(' ');
                out.push_str(&id.sym);
            }
            out.push_str("() {…}");
        }
        Expr::Object(o) if o.props.is_empty() => out.push_str("{}"),
        Expr::Object(_) => out.push_str("{…}"),
        Expr::Array(a) if a.elems.is_empty() => out.push_str("[]"),
        Expr::Array(a) if a.elems.len() <= 3 => {
            out.push('[');
            for (i, el) in a.elems.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if let Some(el) = el {
                    if el.spread.is_some() {
                        out.push_str("...");
                    }
                    write_expr(&el.expr, out, depth + 1);
                }
            }
            out.push(']');
        }
        Expr::Array(_) => out.push_str("[…]"),
        Expr::JSXElement(el) => {
            out.push('<');
            out.push_str(&crate::structure::jsx_name(&el.opening.name));
            out.push_str(" />");
        }
        Expr::JSXFragment(_) => out.push_str("<>…</>"),
        Expr::TsAs(a) => write_expr(&a.expr, out, depth),
        Expr::TsNonNull(n) => {
            write_expr(&n.expr, out, depth + 1);
            out.push('!');
        }
        Expr::TsSatisfies(s) => write_expr(&s.expr, out, depth),
        Expr::TsConstAssertion(c) => write_expr(&c.expr, out, depth),
        Expr::Seq(s) => {
            for (i, e) in s.exprs.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(e, out, depth + 1);
            }
        }
        _ => out.push('…'),
    }
}

fn pat_source(pat: &Pat) -> String {
    match pat {
        Pat::Ident(b) => b.id.sym.to_string(),
        Pat::Array(_) => "[…]".to_string(),
        Pat::Object(_) => "{…}".to_string(),
        Pat::Rest(r) => format!("...{}", pat_source(&r.arg)),
        Pat::Assign(a) => pat_source(&a.left),
        _ => "…".to_string(),
    }
}

/// Static string pieces of a `+` concatenation.
///
/// A left/right pair is read, and each side that is itself a `+` is expanded
/// exactly one more level. Deeper chains are treated as opaque: their pieces
/// are not returned.
pub fn string_concat_parts(expr: &Expr) -> Vec<String> {
    let mut parts = vec![];
    match unwrap_expr(expr) {
        Expr::Bin(b) if b.op == BinaryOp::Add => {
            for side in [&b.left, &b.right] {
                match unwrap_expr(side) {
                    Expr::Bin(inner) if inner.op == BinaryOp::Add => {
                        for nested in [&inner.left, &inner.right] {
                            push_static_piece(nested, &mut parts);
                        }
                    }
                    other => push_static_piece(other, &mut parts),
                }
            }
        }
        other => push_static_piece(other, &mut parts),
    }
    parts
}

fn push_static_piece(expr: &Expr, parts: &mut Vec<String>) {
    match unwrap_expr(expr) {
        Expr::Lit(Lit::Str(s)) => parts.push(s.value.to_string()),
        Expr::Tpl(t) => {
            for q in &t.quasis {
                parts.push(q.raw.to_string());
            }
        }
        Expr::Cond(c) => {
            push_static_piece(&c.cons, parts);
            push_static_piece(&c.alt, parts);
        }
        _ => {}
    }
}

/// Whitespace-separated class tokens of a `className` value expression.
pub fn class_tokens(expr: &Expr) -> Vec<String> {
    string_concat_parts(expr)
        .iter()
        .flat_map(|piece| piece.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_source;

    fn first_init(code: &str) -> Box<Expr> {
        let parsed = parse_source(code, "t.jsx").expect("parse");
        for item in parsed.module.body {
            if let ModuleItem::Stmt(Stmt::Decl(Decl::Var(v))) = item {
                if let Some(init) = v.decls.into_iter().next().and_then(|d| d.init) {
                    return init;
                }
            }
        }
        panic!("no initializer in {code}");
    }

    #[test]
    fn classifies_value_shapes() {
        assert_eq!(value_kind(&first_init("const a = 'x';")), ValueKind::String);
        assert_eq!(value_kind(&first_init("const a = (1);")), ValueKind::Number);
        assert_eq!(value_kind(&first_init("const a = () => 1;")), ValueKind::Function);
        assert_eq!(value_kind(&first_init("const a = [1];")), ValueKind::Array);
        assert_eq!(value_kind(&first_init("const a = b + c;")), ValueKind::Expression);
        assert_eq!(value_kind(&first_init("const a = <b />;")), ValueKind::Element);
    }

    #[test]
    fn literal_trees_become_json() {
        assert_eq!(
            literal_value(&first_init("const a = { n: -2, tags: ['x', true, null] };")),
            Some(serde_json::json!({ "n": -2, "tags": ["x", true, null] }))
        );
        assert_eq!(literal_value(&first_init("const a = [b];")), None);
        assert_eq!(
            snapshot_value(&first_init("const a = props.items;")),
            serde_json::json!("props.items")
        );
    }

    #[test]
    fn renders_compact_source() {
        assert_eq!(
            expr_source(&first_init("const a = () => setCount(count + 1);")),
            "() => setCount(count + 1)"
        );
        assert_eq!(
            expr_source(&first_init("const a = open ? items[0].name : 'none';")),
            r#"open ? items[0].name : "none""#
        );
    }

    #[test]
    fn concat_expands_one_nested_level_only() {
        let parts = string_concat_parts(&first_init(r#"const a = ("a" + "b") + "c";"#));
        assert_eq!(parts, vec!["a", "b", "c"]);

        let deep = string_concat_parts(&first_init(r#"const a = (("a" + "b") + "c") + "d";"#));
        assert_eq!(deep, vec!["c", "d"]);
    }

    #[test]
    fn class_tokens_split_pieces() {
        let tokens = class_tokens(&first_init(r#"const a = "btn " + (active ? "on" : "off");"#));
        assert_eq!(tokens, vec!["btn", "on", "off"]);
    }
}
