//! Static element mapping: source markup tag -> Flutter widget descriptor.

use std::collections::BTreeMap;

use serde::Serialize;

/// Bumped whenever a row's target, slot or extras change.
pub const MAPPING_TABLE_VERSION: &str = "1.3.0";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleFlags {
    pub text_like: bool,
    pub button_like: bool,
    pub list_like: bool,
    pub navigational: bool,
    pub multiline: bool,
}

const NONE: RoleFlags = RoleFlags {
    text_like: false,
    button_like: false,
    list_like: false,
    navigational: false,
    multiline: false,
};
const TEXT: RoleFlags = RoleFlags { text_like: true, ..NONE };
const MULTILINE_TEXT: RoleFlags = RoleFlags {
    text_like: true,
    multiline: true,
    ..NONE
};
const BUTTON: RoleFlags = RoleFlags { button_like: true, ..NONE };
const LIST: RoleFlags = RoleFlags { list_like: true, ..NONE };
const NAV: RoleFlags = RoleFlags { navigational: true, ..NONE };
const MULTILINE: RoleFlags = RoleFlags { multiline: true, ..NONE };

/// Where lowered children go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "slot", rename_all = "camelCase")]
pub enum ChildSlot {
    /// Children cannot be represented; they are dropped with a comment.
    None,
    /// One child under the named argument; several get a `Column` wrapper.
    Single(&'static str),
    /// Ordered collection under the named argument.
    Many(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementMapping {
    pub source_tag: &'static str,
    pub target_tag: &'static str,
    pub slot: ChildSlot,
    pub roles: RoleFlags,
    /// Fixed `(key, raw value)` arguments appended after lowered attributes.
    pub extras: &'static [(&'static str, &'static str)],
}

impl ElementMapping {
    pub fn has_default_child_slot(&self) -> bool {
        !matches!(self.slot, ChildSlot::None)
    }
}

const fn row(
    source_tag: &'static str,
    target_tag: &'static str,
    slot: ChildSlot,
    roles: RoleFlags,
    extras: &'static [(&'static str, &'static str)],
) -> ElementMapping {
    ElementMapping {
        source_tag,
        target_tag,
        slot,
        roles,
        extras,
    }
}

const CHILD: ChildSlot = ChildSlot::Single("child");
const CHILDREN: ChildSlot = ChildSlot::Many("children");

const BOLD: &[(&str, &str)] = &[("style", "const TextStyle(fontWeight: FontWeight.bold)")];
const ITALIC: &[(&str, &str)] = &[("style", "const TextStyle(fontStyle: FontStyle.italic)")];

pub static ELEMENT_MAPPINGS: &[ElementMapping] = &[
    row("div", "Container", CHILD, NONE, &[]),
    row("section", "Column", CHILDREN, NONE, &[]),
    row("header", "Column", CHILDREN, NONE, &[]),
    row("footer", "Column", CHILDREN, NONE, &[]),
    row("main", "Column", CHILDREN, NONE, &[]),
    row("article", "Column", CHILDREN, NONE, &[]),
    row("aside", "Column", CHILDREN, NONE, &[]),
    row("span", "Text", ChildSlot::None, TEXT, &[]),
    row("p", "Text", ChildSlot::None, MULTILINE_TEXT, &[]),
    row("h1", "Text", ChildSlot::None, TEXT, &[("style", "Theme.of(context).textTheme.headlineLarge")]),
    row("h2", "Text", ChildSlot::None, TEXT, &[("style", "Theme.of(context).textTheme.headlineMedium")]),
    row("h3", "Text", ChildSlot::None, TEXT, &[("style", "Theme.of(context).textTheme.headlineSmall")]),
    row("h4", "Text", ChildSlot::None, TEXT, &[("style", "Theme.of(context).textTheme.titleLarge")]),
    row("h5", "Text", ChildSlot::None, TEXT, &[("style", "Theme.of(context).textTheme.titleMedium")]),
    row("h6", "Text", ChildSlot::None, TEXT, &[("style", "Theme.of(context).textTheme.titleSmall")]),
    row("label", "Text", ChildSlot::None, TEXT, &[]),
    row("strong", "Text", ChildSlot::None, TEXT, BOLD),
    row("b", "Text", ChildSlot::None, TEXT, BOLD),
    row("em", "Text", ChildSlot::None, TEXT, ITALIC),
    row("i", "Text", ChildSlot::None, TEXT, ITALIC),
    row("small", "Text", ChildSlot::None, TEXT, &[("style", "Theme.of(context).textTheme.bodySmall")]),
    row("code", "Text", ChildSlot::None, TEXT, &[("style", "const TextStyle(fontFamily: 'monospace')")]),
    row("button", "ElevatedButton", CHILD, BUTTON, &[]),
    row("a", "InkWell", CHILD, NAV, &[]),
    row("img", "Image.network", ChildSlot::None, NONE, &[]),
    row("input", "TextField", ChildSlot::None, NONE, &[]),
    row("textarea", "TextField", ChildSlot::None, MULTILINE, &[("maxLines", "null")]),
    row("ul", "ListView", CHILDREN, LIST, &[("shrinkWrap", "true")]),
    row("ol", "ListView", CHILDREN, LIST, &[("shrinkWrap", "true")]),
    row("li", "ListTile", ChildSlot::Single("title"), NONE, &[]),
    row("nav", "Row", CHILDREN, NONE, &[]),
    row("form", "Form", CHILD, NONE, &[]),
    row("hr", "Divider", ChildSlot::None, NONE, &[]),
    row("br", "SizedBox.shrink", ChildSlot::None, NONE, &[]),
    row("select", "DropdownButton", ChildSlot::Many("items"), LIST, &[("onChanged", "(value) {}")]),
    row("option", "DropdownMenuItem", CHILD, NONE, &[]),
    row("table", "Table", CHILDREN, LIST, &[]),
    row("tr", "TableRow", CHILDREN, LIST, &[]),
    row("td", "TableCell", CHILD, NONE, &[]),
    row("th", "TableCell", CHILD, NONE, &[]),
];

/// Lowercase tags missing from the table lower through this row.
pub static FALLBACK_MAPPING: ElementMapping = row("*", "Container", CHILD, NONE, &[]);

/// A mapping row with any configured target override applied.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedMapping<'t> {
    pub row: &'static ElementMapping,
    pub target_tag: &'t str,
}

/// Read-only view of [`ELEMENT_MAPPINGS`] plus per-run overrides.
#[derive(Debug, Clone, Copy)]
pub struct MappingTable<'t> {
    rows: &'static [ElementMapping],
    overrides: Option<&'t BTreeMap<String, String>>,
}

impl Default for MappingTable<'_> {
    fn default() -> Self {
        Self {
            rows: ELEMENT_MAPPINGS,
            overrides: None,
        }
    }
}

impl<'t> MappingTable<'t> {
    pub fn with_overrides(overrides: &'t BTreeMap<String, String>) -> Self {
        Self {
            rows: ELEMENT_MAPPINGS,
            overrides: Some(overrides),
        }
    }

    pub fn lookup(&self, source_tag: &str) -> Option<ResolvedMapping<'t>> {
        let row = self.rows.iter().find(|r| r.source_tag == source_tag)?;
        let target_tag = self
            .overrides
            .and_then(|o| o.get(source_tag))
            .map(String::as_str)
            .unwrap_or(row.target_tag);
        Some(ResolvedMapping { row, target_tag })
    }
}
