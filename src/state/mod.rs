//! Semantic passes over a component module: hooks, props, state variables,
//! event handlers and composition.
//!
//! Every pass is a pure function of the module. Unrecognized shapes are
//! skipped.

mod composition;
mod decls;
mod events;
mod hooks;
mod props;
mod variables;

use serde::Serialize;
use swc_core::ecma::ast::Module;
use tracing::debug;

pub use composition::{composition_tree, CompositionRecord, CompositionTree, ComposedProp};
pub use events::{EventHandlerRecord, HandlerAction};
pub use hooks::{
    CallbackHook, ContextHook, CustomHook, EffectHook, HookRecord, MemoHook, ReducerHook, RefHook,
    SideEffect, StateHook,
};
pub use props::PropRecord;
pub use variables::{PropPassing, ReadContext, ReadLocation, StateVariable};

use crate::{diagnostics::Diagnostic, parse::Locator};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateAnalysis {
    pub hooks: Vec<HookRecord>,
    pub props: Vec<PropRecord>,
    pub state_variables: Vec<StateVariable>,
    pub event_handlers: Vec<EventHandlerRecord>,
    pub composition: Vec<CompositionRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl StateAnalysis {
    /// Whether the component needs a `State` class.
    pub fn has_state(&self) -> bool {
        !self.state_variables.is_empty()
    }
}

pub fn analyze_state(module: &Module, locator: &Locator) -> StateAnalysis {
    let mut diagnostics = vec![];
    let decls = decls::DeclIndex::build(module);

    let hooks = hooks::analyze_hooks(module, locator, &mut diagnostics);
    let props = props::analyze_props(module, locator);

    let state_hooks: Vec<&StateHook> = hooks
        .iter()
        .filter_map(|h| match h {
            HookRecord::State(s) => Some(s),
            _ => None,
        })
        .collect();
    let mut state_variables = variables::analyze_state_variables(module, &state_hooks, locator);
    state_variables.extend(variables::analyze_class_state(module, locator));

    let event_handlers = events::analyze_event_handlers(module, &decls, &state_variables, locator, &mut diagnostics);
    let composition = composition::analyze_composition(module, &decls, locator);

    debug!(
        hooks = hooks.len(),
        props = props.len(),
        state = state_variables.len(),
        handlers = event_handlers.len(),
        composed = composition.len(),
        "state analyzed"
    );

    StateAnalysis {
        hooks,
        props,
        state_variables,
        event_handlers,
        composition,
        diagnostics,
    }
}
