//! Lowers a single React/JSX component file into a Flutter widget tree.
//!
//! The pipeline is parse -> structure -> state -> lowering -> emission. Each
//! stage is a pure function of the parsed module and the [`TransformConfig`];
//! constructs a stage cannot handle are reported as [`Diagnostic`]s instead
//! of failing the run.

pub mod component;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod expr;
pub mod naming;
pub mod parse;
pub mod scaffold;
pub mod state;
pub mod structure;
pub mod widget;

use serde::Serialize;
use tracing::{debug, warn};

pub use config::TransformConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use emit::{emit, emit_with_indent};
pub use parse::{parse_source, Location, ParseError, ParsedSource};
pub use scaffold::emit_component;
pub use state::{analyze_state, composition_tree, CompositionTree, StateAnalysis};
pub use structure::{analyze_structure, ComponentStructure, Complexity};
pub use widget::{lower_to_widget_tree, LoweredTree, PropertyValue, WidgetChildren, WidgetNode, WidgetProperty};

/// Everything a single-file transform produces.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutput {
    pub structure: ComponentStructure,
    pub state: StateAnalysis,
    pub composition_tree: CompositionTree,
    pub widget_tree: LoweredTree,
    /// The emitted widget expression alone.
    pub code: String,
    /// A complete Dart file wrapping `code`.
    pub component_source: String,
    /// All stage diagnostics, in pipeline order.
    pub diagnostics: Vec<Diagnostic>,
}

impl TransformOutput {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            warn!(error = %e, "failed to serialize transform output");
            "{}".to_string()
        })
    }
}

/// Run the whole pipeline over `source`.
pub fn transform_source(source: &str, file_path: &str, config: &TransformConfig) -> Result<TransformOutput, ParseError> {
    let parsed = parse_source(source, file_path)?;
    let locator = parsed.locator();

    let structure = analyze_structure(&parsed.module, file_path, config);
    let state = analyze_state(&parsed.module, &locator);
    let widget_tree = lower_to_widget_tree(&parsed.module, &structure, config);
    let composition_tree = composition_tree(&state.composition);

    let code = emit(&widget_tree.root);
    let component_source = emit_component(&structure, &state, &widget_tree, config);

    let diagnostics: Vec<Diagnostic> = parsed
        .diagnostics
        .iter()
        .chain(&structure.diagnostics)
        .chain(&state.diagnostics)
        .chain(&widget_tree.diagnostics)
        .cloned()
        .collect();

    debug!(
        file = file_path,
        component = structure.component_name.as_deref().unwrap_or("<none>"),
        diagnostics = diagnostics.len(),
        "transform finished"
    );

    Ok(TransformOutput {
        structure,
        state,
        composition_tree,
        widget_tree,
        code,
        component_source,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_are_returned() {
        let err = transform_source("const = ;", "Broken.jsx", &TransformConfig::default());
        assert!(matches!(err, Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn output_serializes_with_camel_case_keys() {
        let out = transform_source(
            "export default function Hi() { return <p>hi</p>; }",
            "Hi.jsx",
            &TransformConfig::default(),
        )
        .expect("transform");
        let json = out.to_json();
        assert!(json.contains("\"componentSource\""));
        assert!(json.contains("\"widgetTree\""));
        assert_eq!(out.code, "Text(\n  'hi'\n)");
    }
}
