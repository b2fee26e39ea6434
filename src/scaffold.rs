//! Wraps an emitted widget tree into a complete Dart widget file.

use std::{collections::BTreeSet, fmt::Write};

use serde_json::Value;

use crate::{
    config::TransformConfig,
    emit::{dart_string, emit_with_indent},
    naming::{capitalize, snake_case},
    state::{PropRecord, StateAnalysis, StateVariable},
    structure::ComponentStructure,
    widget::LoweredTree,
};

const DEFAULT_CLASS_NAME: &str = "GeneratedWidget";

/// Map a syntactic TS type (or inferred type name) to a Dart type.
pub fn dart_type(ts_type: &str) -> &'static str {
    let ty = ts_type.trim();
    match ty {
        "string" => "String",
        "number" => "num",
        "boolean" => "bool",
        "function" => "VoidCallback",
        "array" => "List<dynamic>",
        "object" => "Map<String, dynamic>",
        _ if ty.contains("=>") => "VoidCallback",
        _ if ty.ends_with("[]") || ty.starts_with("Array<") => "List<dynamic>",
        _ if ty.starts_with("Record<") => "Map<String, dynamic>",
        _ => "dynamic",
    }
}

/// Dart literal for a JSON snapshot.
fn dart_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => dart_string(s),
        Value::Array(items) => format!("[{}]", items.iter().map(dart_literal).collect::<Vec<_>>().join(", ")),
        Value::Object(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(k, v)| format!("{}: {}", dart_string(k), dart_literal(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Whether a snapshot really is the literal its inferred type claims.
fn is_literal_of(value: &Value, inferred_type: &str) -> bool {
    matches!(
        (inferred_type, value),
        ("string", Value::String(_))
            | ("number", Value::Number(_))
            | ("boolean", Value::Bool(_))
            | ("array", Value::Array(_))
            | ("object", Value::Object(_))
            | ("null", Value::Null)
    )
}

fn class_name(structure: &ComponentStructure) -> String {
    let raw = match &structure.component_name {
        Some(name) => name.clone(),
        None => {
            let stem = structure
                .file_path
                .rsplit(['/', '\\'])
                .next()
                .and_then(|f| f.split('.').next())
                .unwrap_or_default();
            stem.split(['-', '_', ' ']).map(capitalize).collect()
        }
    };
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '_').collect();
    match cleaned.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => cleaned,
        _ => DEFAULT_CLASS_NAME.to_string(),
    }
}

fn is_dart_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn imports(lowered: &LoweredTree, own_name: &str, config: &TransformConfig) -> Vec<String> {
    let files: BTreeSet<String> = lowered
        .custom_components
        .iter()
        .map(|c| c.split('.').next().unwrap_or(c))
        .filter(|c| *c != own_name)
        .map(snake_case)
        .collect();
    let mut out = vec!["import 'package:flutter/material.dart';".to_string()];
    out.extend(
        files
            .into_iter()
            .map(|f| format!("import 'package:{}/{f}.dart';", config.package_name)),
    );
    out
}

/// Props usable as Dart fields, in declaration order.
fn field_props(props: &[PropRecord]) -> Vec<&PropRecord> {
    props.iter().filter(|p| is_dart_identifier(&p.name)).collect()
}

/// A default usable as a constant parameter value.
fn const_default(p: &PropRecord) -> Option<&Value> {
    p.default_value
        .as_ref()
        .filter(|d| p.default_is_literal && !d.is_null())
}

fn constructor(out: &mut String, name: &str, props: &[&PropRecord]) {
    for p in props.iter().filter(|p| !p.required && !p.default_is_literal) {
        if let Some(Value::String(source)) = &p.default_value {
            let _ = writeln!(out, "  // {} defaults to {source}", p.name);
        }
    }
    let mut params = vec!["super.key".to_string()];
    for p in props {
        let param = match (p.required, const_default(p)) {
            (true, _) => format!("required this.{}", p.name),
            (false, Some(default)) => {
                // Default parameter values must be constant.
                let prefix = if default.is_array() || default.is_object() { "const " } else { "" };
                format!("this.{} = {prefix}{}", p.name, dart_literal(default))
            }
            (false, None) => format!("this.{}", p.name),
        };
        params.push(param);
    }
    let _ = writeln!(out, "  const {name}({{{}}});", params.join(", "));
}

fn prop_fields(out: &mut String, props: &[&PropRecord]) {
    for p in props {
        let ty = dart_type(&p.prop_type);
        let nullable = !p.required && const_default(p).is_none() && ty != "dynamic";
        let _ = writeln!(out, "  final {ty}{} {};", if nullable { "?" } else { "" }, p.name);
    }
}

fn state_fields(out: &mut String, state: &[&StateVariable]) {
    for var in state {
        let ty = dart_type(&var.inferred_type);
        match &var.initial_value {
            Some(value) if is_literal_of(value, &var.inferred_type) && var.inferred_type != "null" => {
                let _ = writeln!(out, "  {ty} {} = {};", var.name, dart_literal(value));
            }
            Some(value) => {
                let nullable = if ty == "dynamic" { "" } else { "?" };
                let initial = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let _ = writeln!(out, "  {ty}{nullable} {}; // initial: {initial}", var.name);
            }
            None => {
                let nullable = if ty == "dynamic" { "" } else { "?" };
                let _ = writeln!(out, "  {ty}{nullable} {};", var.name);
            }
        }
    }
}

/// `build`, with `widget.x` bound to `x` for each prop when it lives in a
/// `State` class.
fn build_method(out: &mut String, widget_props: &[&PropRecord], body: &str) {
    out.push_str("  @override\n");
    out.push_str("  Widget build(BuildContext context) {\n");
    for p in widget_props {
        let _ = writeln!(out, "    final {0} = widget.{0};", p.name);
    }
    let _ = writeln!(out, "    return {body};");
    out.push_str("  }\n");
}

/// Complete Dart source: imports, the widget class and, when the component
/// holds state, its `State` class.
pub fn emit_component(
    structure: &ComponentStructure,
    state: &StateAnalysis,
    lowered: &LoweredTree,
    config: &TransformConfig,
) -> String {
    let name = class_name(structure);
    let props = field_props(&state.props);
    let state_vars: Vec<&StateVariable> = state
        .state_variables
        .iter()
        .filter(|v| is_dart_identifier(&v.name))
        .collect();
    let body = emit_with_indent(&lowered.root, 2);

    let mut out = String::new();
    let _ = writeln!(out, "// Generated from {}.", structure.file_path);
    for line in imports(lowered, &name, config) {
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');

    if !state.has_state() {
        let _ = writeln!(out, "class {name} extends StatelessWidget {{");
        constructor(&mut out, &name, &props);
        if !props.is_empty() {
            out.push('\n');
            prop_fields(&mut out, &props);
        }
        out.push('\n');
        build_method(&mut out, &[], &body);
        out.push_str("}\n");
        return out;
    }

    let _ = writeln!(out, "class {name} extends StatefulWidget {{");
    constructor(&mut out, &name, &props);
    if !props.is_empty() {
        out.push('\n');
        prop_fields(&mut out, &props);
    }
    out.push('\n');
    out.push_str("  @override\n");
    let _ = writeln!(out, "  State<{name}> createState() => _{name}State();");
    out.push_str("}\n\n");

    let _ = writeln!(out, "class _{name}State extends State<{name}> {{");
    state_fields(&mut out, &state_vars);
    out.push('\n');
    build_method(&mut out, &props, &body);
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ts_types_map_to_dart() {
        assert_eq!(dart_type("string"), "String");
        assert_eq!(dart_type("number"), "num");
        assert_eq!(dart_type("boolean"), "bool");
        assert_eq!(dart_type("() => void"), "VoidCallback");
        assert_eq!(dart_type("(id: number) => void"), "VoidCallback");
        assert_eq!(dart_type("string[]"), "List<dynamic>");
        assert_eq!(dart_type("Array<Item>"), "List<dynamic>");
        assert_eq!(dart_type("object"), "Map<String, dynamic>");
        assert_eq!(dart_type("User"), "dynamic");
        assert_eq!(dart_type("unknown"), "dynamic");
    }

    #[test]
    fn json_snapshots_become_dart_literals() {
        let value = serde_json::json!({ "a": [1, "x"], "b": null });
        assert_eq!(dart_literal(&value), "{'a': [1, 'x'], 'b': null}");
        assert!(is_literal_of(&serde_json::json!("x"), "string"));
        assert!(!is_literal_of(&serde_json::json!("props.initial"), "unknown"));
    }

    #[test]
    fn identifiers() {
        assert!(is_dart_identifier("count"));
        assert!(is_dart_identifier("_private"));
        assert!(!is_dart_identifier("data-id"));
        assert!(!is_dart_identifier("9lives"));
    }
}
