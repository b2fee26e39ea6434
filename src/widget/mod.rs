//! Target-agnostic widget IR produced by lowering JSX.

mod lower;
mod mapping;

use std::collections::BTreeSet;

use serde::Serialize;

pub use lower::{lower_to_widget_tree, WidgetTreeBuilder};
pub use mapping::{
    ChildSlot, ElementMapping, MappingTable, ResolvedMapping, RoleFlags, ELEMENT_MAPPINGS, FALLBACK_MAPPING,
    MAPPING_TABLE_VERSION,
};

use crate::diagnostics::Diagnostic;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PropertyValue {
    /// Target source text, emitted verbatim.
    Raw(String),
    /// String literal, quoted on emission.
    Str(String),
    Bool(bool),
    Widget(Box<WidgetNode>),
    List(Vec<PropertyValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetProperty {
    /// Empty for positional arguments.
    pub key: String,
    pub value: PropertyValue,
    /// Emitted as a `// key: value` line instead of an argument.
    pub is_comment: bool,
}

impl WidgetProperty {
    pub fn named(key: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            key: key.into(),
            value,
            is_comment: false,
        }
    }

    pub fn positional(value: PropertyValue) -> Self {
        Self::named("", value)
    }

    pub fn comment(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: PropertyValue::Raw(text.into()),
            is_comment: true,
        }
    }
}

/// A single child slot or an ordered collection, never both. `slot` is the
/// argument name (`child`, `title`, `children`, `items`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WidgetChildren {
    #[default]
    None,
    Single { slot: String, node: Box<WidgetNode> },
    Many { slot: String, nodes: Vec<WidgetNode> },
}

impl WidgetChildren {
    pub fn single(slot: impl Into<String>, node: WidgetNode) -> Self {
        WidgetChildren::Single {
            slot: slot.into(),
            node: Box::new(node),
        }
    }

    pub fn many(slot: impl Into<String>, nodes: Vec<WidgetNode>) -> Self {
        WidgetChildren::Many {
            slot: slot.into(),
            nodes,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            WidgetChildren::None => true,
            WidgetChildren::Single { .. } => false,
            WidgetChildren::Many { nodes, .. } => nodes.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetNode {
    pub target_tag: String,
    pub properties: Vec<WidgetProperty>,
    pub comments: Vec<String>,
    pub children: WidgetChildren,
    /// Source tag this node was lowered from, if any.
    pub source_tag: Option<String>,
}

impl WidgetNode {
    pub fn new(target_tag: impl Into<String>) -> Self {
        Self {
            target_tag: target_tag.into(),
            ..Default::default()
        }
    }

    pub fn from_source(mut self, source_tag: impl Into<String>) -> Self {
        self.source_tag = Some(source_tag.into());
        self
    }

    pub fn with_property(mut self, property: WidgetProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }

    pub fn with_children(mut self, children: WidgetChildren) -> Self {
        self.children = children;
        self
    }

    /// `Text('…')`.
    pub fn text(payload: impl Into<String>) -> Self {
        Self::new("Text").with_property(WidgetProperty::positional(PropertyValue::Str(payload.into())))
    }

    /// Stand-in for something lowering does not evaluate.
    pub fn placeholder(comment: impl Into<String>) -> Self {
        Self::new("Placeholder").with_comment(comment)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.iter().any(|p| !p.is_comment && p.key == key)
    }

    /// Nothing to print between the parentheses.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.comments.is_empty() && self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoweredTree {
    pub component_name: Option<String>,
    pub root: WidgetNode,
    /// `className` tokens seen while lowering; never emitted as properties.
    pub class_names: BTreeSet<String>,
    /// Custom components passed through unchanged, for import aggregation.
    pub custom_components: BTreeSet<String>,
    pub diagnostics: Vec<Diagnostic>,
}
