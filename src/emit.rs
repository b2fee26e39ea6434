//! Deterministic Dart pretty-printer for the widget IR.

use crate::widget::{PropertyValue, WidgetChildren, WidgetNode, WidgetProperty};

const INDENT: &str = "  ";

/// Zero-argument named constructors printed as `const X()` when nothing is
/// attached to them.
const NAMED_CONSTRUCTORS: &[&str] = &["SizedBox.shrink", "SizedBox.expand"];

/// Emitted for a node with no target tag.
const FALLBACK: &str = "const SizedBox.shrink()";

pub fn emit(node: &WidgetNode) -> String {
    emit_with_indent(node, 0)
}

/// Render `node` as if it started at nesting level `indent`. The first line
/// carries no leading whitespace; the closing parenthesis is aligned to
/// `indent`.
pub fn emit_with_indent(node: &WidgetNode, indent: usize) -> String {
    let mut out = String::new();
    write_node(&mut out, node, indent);
    out
}

/// Dart single-quoted string literal.
pub fn dart_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn pad(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str(INDENT);
    }
}

fn comment_text(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Raw(s) | PropertyValue::Str(s) => s.clone(),
        PropertyValue::Bool(b) => b.to_string(),
        PropertyValue::Widget(w) => w.target_tag.clone(),
        PropertyValue::List(items) => format!("[{} items]", items.len()),
    }
}

fn write_comment(out: &mut String, text: &str, level: usize) {
    for line in text.lines() {
        pad(out, level);
        out.push_str("// ");
        out.push_str(line);
        out.push('\n');
    }
}

fn write_value(out: &mut String, value: &PropertyValue, level: usize) {
    match value {
        PropertyValue::Raw(s) => out.push_str(s),
        PropertyValue::Str(s) => out.push_str(&dart_string(s)),
        PropertyValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        PropertyValue::Widget(w) => write_node(out, w, level),
        PropertyValue::List(items) if items.is_empty() => out.push_str("[]"),
        PropertyValue::List(items) => {
            out.push_str("[\n");
            for item in items {
                pad(out, level + 1);
                write_value(out, item, level + 1);
                out.push_str(",\n");
            }
            pad(out, level);
            out.push(']');
        }
    }
}

/// One argument line of a widget block, not including the trailing comma.
enum Arg<'a> {
    Property(&'a WidgetProperty),
    Child(&'a str, &'a WidgetNode),
}

fn write_node(out: &mut String, node: &WidgetNode, indent: usize) {
    let tag = node.target_tag.as_str();
    if tag.is_empty() {
        out.push_str(FALLBACK);
        return;
    }
    if NAMED_CONSTRUCTORS.contains(&tag) && node.is_empty() {
        out.push_str("const ");
        out.push_str(tag);
        out.push_str("()");
        return;
    }
    if node.is_empty() {
        out.push_str(tag);
        out.push_str("()");
        return;
    }

    let inner = indent + 1;
    out.push_str(tag);
    out.push_str("(\n");

    for comment in &node.comments {
        write_comment(out, comment, inner);
    }

    let mut args: Vec<Arg<'_>> = node.properties.iter().map(Arg::Property).collect();
    if let WidgetChildren::Single { slot, node: child } = &node.children {
        args.push(Arg::Child(slot, child));
    }
    let children_block = match &node.children {
        WidgetChildren::Many { slot, nodes } => Some((slot.as_str(), nodes)),
        _ => None,
    };
    let last_real = args
        .iter()
        .rposition(|a| !matches!(a, Arg::Property(p) if p.is_comment));

    for (i, arg) in args.iter().enumerate() {
        match arg {
            Arg::Property(p) if p.is_comment => {
                let text = comment_text(&p.value);
                if p.key.is_empty() {
                    write_comment(out, &text, inner);
                } else {
                    write_comment(out, &format!("{}: {}", p.key, text), inner);
                }
                continue;
            }
            Arg::Property(p) => {
                pad(out, inner);
                if !p.key.is_empty() {
                    out.push_str(&p.key);
                    out.push_str(": ");
                }
                write_value(out, &p.value, inner);
            }
            Arg::Child(slot, child) => {
                pad(out, inner);
                out.push_str(slot);
                out.push_str(": ");
                write_node(out, child, inner);
            }
        }
        if children_block.is_some() || Some(i) != last_real {
            out.push(',');
        }
        out.push('\n');
    }

    if let Some((slot, nodes)) = children_block {
        pad(out, inner);
        out.push_str(slot);
        out.push_str(": [\n");
        for child in nodes {
            pad(out, inner + 1);
            write_node(out, child, inner + 1);
            out.push_str(",\n");
        }
        pad(out, inner);
        out.push_str("]\n");
    }

    pad(out, indent);
    out.push(')');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_dart_strings() {
        assert_eq!(dart_string("it's $5"), r"'it\'s \$5'");
        assert_eq!(dart_string("a\\b\nc"), r"'a\\b\nc'");
    }

    #[test]
    fn empty_and_named_constructor_forms() {
        assert_eq!(emit(&WidgetNode::new("Divider")), "Divider()");
        assert_eq!(emit(&WidgetNode::new("SizedBox.shrink")), "const SizedBox.shrink()");
        assert_eq!(emit(&WidgetNode::default()), "const SizedBox.shrink()");
    }

    #[test]
    fn named_constructors_keep_attached_comments() {
        let spacer = WidgetNode::new("SizedBox.shrink")
            .with_comment("className: gap")
            .with_property(WidgetProperty::comment("data-x", "unhandled attribute (1)"));
        assert_eq!(
            emit(&spacer),
            "SizedBox.shrink(\n  // className: gap\n  // data-x: unhandled attribute (1)\n)"
        );
    }

    #[test]
    fn comment_properties_keep_their_position_without_commas() {
        let node = WidgetNode::new("TextField")
            .with_property(WidgetProperty::named("obscureText", PropertyValue::Bool(true)))
            .with_property(WidgetProperty::comment("data-id", "unhandled attribute ('x')"));
        assert_eq!(
            emit(&node),
            "TextField(\n  obscureText: true\n  // data-id: unhandled attribute ('x')\n)"
        );
    }

    #[test]
    fn list_values_indent_by_two() {
        let node = WidgetNode::new("Wrap").with_property(WidgetProperty::named(
            "spacing",
            PropertyValue::List(vec![PropertyValue::Raw("1".into()), PropertyValue::Str("a".into())]),
        ));
        assert_eq!(emit(&node), "Wrap(\n  spacing: [\n    1,\n    'a',\n  ]\n)");
    }
}
