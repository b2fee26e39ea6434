use std::collections::HashMap;

use serde::Serialize;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};
use tracing::trace;

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind},
    expr::{callee_name, callee_path, expr_source, inferred_type, member_path, snapshot_value, unwrap_expr},
    naming::{is_hook_name, setter_name},
    parse::{Location, Locator},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateHook {
    pub variable: String,
    pub setter: String,
    pub initial_value: Option<serde_json::Value>,
    pub inferred_type: String,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SideEffect {
    ApiCall,
    Timer,
    EventListener,
    Dom,
    Storage,
    StateUpdate,
    Logging,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectHook {
    pub hook: String,
    pub dependencies: Vec<String>,
    /// `false` when the dependency array is omitted (runs after every render).
    pub has_dependency_array: bool,
    pub has_cleanup: bool,
    pub side_effect_tags: Vec<SideEffect>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextHook {
    pub context_name: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefHook {
    pub name: Option<String>,
    pub initial_value: Option<serde_json::Value>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoHook {
    pub name: Option<String>,
    pub dependencies: Vec<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackHook {
    pub name: Option<String>,
    pub dependencies: Vec<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReducerHook {
    /// Reducer identifier, or `inline` for a function literal.
    pub reducer_ref: Option<String>,
    pub initial_state: Option<serde_json::Value>,
    pub state: Option<String>,
    pub dispatch: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomHook {
    pub name: String,
    pub definition_loc: Location,
    pub usage_locs: Vec<Location>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HookRecord {
    State(StateHook),
    Effect(EffectHook),
    Context(ContextHook),
    Ref(RefHook),
    Memo(MemoHook),
    Callback(CallbackHook),
    Reducer(ReducerHook),
    Custom(CustomHook),
}

// -----------------------------------------------------------------------------
// Custom hook definitions
// -----------------------------------------------------------------------------

struct DefinitionCollector<'l> {
    locator: &'l Locator,
    out: HashMap<String, Location>,
}

impl Visit for DefinitionCollector<'_> {
    fn visit_fn_decl(&mut self, n: &FnDecl) {
        let name = n.ident.sym.as_ref();
        if is_hook_name(name) {
            self.out
                .entry(name.to_string())
                .or_insert_with(|| self.locator.locate(n.ident.span));
        }
        n.visit_children_with(self);
    }

    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        if let (Some(id), Some(init)) = (d.name.as_ident(), d.init.as_deref()) {
            let name = id.id.sym.as_ref();
            if is_hook_name(name) && matches!(unwrap_expr(init), Expr::Arrow(_) | Expr::Fn(_)) {
                self.out
                    .entry(name.to_string())
                    .or_insert_with(|| self.locator.locate(id.id.span));
            }
        }
        d.visit_children_with(self);
    }
}

// -----------------------------------------------------------------------------
// Hook call sites
// -----------------------------------------------------------------------------

struct HookVisitor<'l> {
    locator: &'l Locator,
    definitions: HashMap<String, Location>,
    records: Vec<HookRecord>,
    dropped: Vec<String>,
}

fn dependencies(arg: Option<&ExprOrSpread>) -> (Vec<String>, bool) {
    match arg.map(|a| unwrap_expr(&a.expr)) {
        Some(Expr::Array(arr)) => (
            arr.elems
                .iter()
                .flatten()
                .map(|el| member_path(&el.expr).unwrap_or_else(|| expr_source(&el.expr)))
                .collect(),
            true,
        ),
        _ => (vec![], false),
    }
}

fn pattern_ident(pat: Option<&Pat>) -> Option<String> {
    match pat? {
        Pat::Ident(b) => Some(b.id.sym.to_string()),
        _ => None,
    }
}

/// Names bound by `const [a, b] = …` (either may be missing).
fn array_pair(pat: Option<&Pat>) -> (Option<String>, Option<String>) {
    match pat {
        Some(Pat::Array(a)) => {
            let name = |idx: usize| match a.elems.get(idx) {
                Some(Some(Pat::Ident(b))) => Some(b.id.sym.to_string()),
                _ => None,
            };
            (name(0), name(1))
        }
        Some(Pat::Ident(b)) => (Some(b.id.sym.to_string()), None),
        _ => (None, None),
    }
}

/// Recover `[variable, setter]` of a `useState` call, synthesizing a setter
/// name when the pattern omits one.
fn state_names(pat: Option<&Pat>) -> (String, String) {
    match array_pair(pat) {
        (Some(variable), Some(setter)) => (variable, setter),
        (Some(variable), None) => {
            let setter = setter_name(&variable);
            (variable, setter)
        }
        (None, Some(setter)) => {
            let stem = setter.strip_prefix("set").unwrap_or(&setter);
            let mut chars = stem.chars();
            let variable = match chars.next() {
                Some(first) => first.to_lowercase().chain(chars).collect(),
                None => "state".to_string(),
            };
            (variable, setter)
        }
        (None, None) => ("state".to_string(), setter_name("state")),
    }
}

fn has_cleanup(callback: Option<&ExprOrSpread>) -> bool {
    let Some(arg) = callback else { return false };
    let stmts = match unwrap_expr(&arg.expr) {
        Expr::Arrow(a) => match &*a.body {
            BlockStmtOrExpr::BlockStmt(b) => &b.stmts,
            BlockStmtOrExpr::Expr(e) => {
                return matches!(unwrap_expr(e), Expr::Arrow(_) | Expr::Fn(_));
            }
        },
        Expr::Fn(f) => match &f.function.body {
            Some(b) => &b.stmts,
            None => return false,
        },
        _ => return false,
    };
    stmts.iter().any(|s| match s {
        Stmt::Return(r) => r
            .arg
            .as_deref()
            .is_some_and(|a| !matches!(unwrap_expr(a), Expr::Lit(Lit::Null(_)))),
        _ => false,
    })
}

#[derive(Default)]
struct SideEffectScanner {
    tags: Vec<SideEffect>,
}

impl SideEffectScanner {
    fn tag(&mut self, tag: SideEffect) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }
}

impl Visit for SideEffectScanner {
    fn visit_call_expr(&mut self, n: &CallExpr) {
        if let Some(path) = callee_path(n) {
            let lower = path.to_ascii_lowercase();
            let last = path.rsplit('.').next().unwrap_or(&path);
            if lower.contains("fetch") || lower.contains("axios") || lower.contains("api") {
                self.tag(SideEffect::ApiCall);
            }
            if matches!(last, "setTimeout" | "setInterval" | "requestAnimationFrame") {
                self.tag(SideEffect::Timer);
            } else if matches!(last, "addEventListener" | "removeEventListener") {
                self.tag(SideEffect::EventListener);
            } else if lower.starts_with("localstorage.") || lower.starts_with("sessionstorage.") {
                self.tag(SideEffect::Storage);
            } else if lower.starts_with("console.") {
                self.tag(SideEffect::Logging);
            } else if lower.starts_with("document.") || lower.starts_with("window.") {
                self.tag(SideEffect::Dom);
            } else if crate::naming::is_setter_name(last) {
                self.tag(SideEffect::StateUpdate);
            }
        }
        n.visit_children_with(self);
    }

    fn visit_assign_expr(&mut self, n: &AssignExpr) {
        if let AssignTarget::Simple(SimpleAssignTarget::Member(m)) = &n.left {
            if let Some(path) = member_path(&m.obj) {
                if path.starts_with("document") || path.starts_with("window") {
                    self.tag(SideEffect::Dom);
                }
            }
        }
        n.visit_children_with(self);
    }
}

fn side_effects(callback: Option<&ExprOrSpread>) -> Vec<SideEffect> {
    let mut scanner = SideEffectScanner::default();
    if let Some(arg) = callback {
        arg.expr.visit_with(&mut scanner);
    }
    scanner.tags
}

impl HookVisitor<'_> {
    fn classify(&mut self, call: &CallExpr, name: &str, pattern: Option<&Pat>) {
        let location = self.locator.locate(call.span);
        let first = call.args.first();
        let second = call.args.get(1);
        trace!(hook = name, line = location.line, "hook call");

        let record = match name {
            "useState" => {
                let (variable, setter) = state_names(pattern);
                HookRecord::State(StateHook {
                    variable,
                    setter,
                    initial_value: first.map(|a| snapshot_value(&a.expr)),
                    inferred_type: inferred_type(first.map(|a| &*a.expr)).to_string(),
                    location,
                })
            }
            "useEffect" | "useLayoutEffect" | "useInsertionEffect" => {
                let (deps, has_array) = dependencies(second);
                HookRecord::Effect(EffectHook {
                    hook: name.to_string(),
                    dependencies: deps,
                    has_dependency_array: has_array,
                    has_cleanup: has_cleanup(first),
                    side_effect_tags: side_effects(first),
                    location,
                })
            }
            "useContext" => HookRecord::Context(ContextHook {
                context_name: first.map(|a| member_path(&a.expr).unwrap_or_else(|| expr_source(&a.expr))),
                location,
            }),
            "useRef" => HookRecord::Ref(RefHook {
                name: pattern_ident(pattern),
                initial_value: first.map(|a| snapshot_value(&a.expr)),
                location,
            }),
            "useMemo" => HookRecord::Memo(MemoHook {
                name: pattern_ident(pattern),
                dependencies: dependencies(second).0,
                location,
            }),
            "useCallback" => HookRecord::Callback(CallbackHook {
                name: pattern_ident(pattern),
                dependencies: dependencies(second).0,
                location,
            }),
            "useReducer" => {
                let (state, dispatch) = array_pair(pattern);
                HookRecord::Reducer(ReducerHook {
                    reducer_ref: first.map(|a| match unwrap_expr(&a.expr) {
                        Expr::Arrow(_) | Expr::Fn(_) => "inline".to_string(),
                        e => member_path(e).unwrap_or_else(|| expr_source(e)),
                    }),
                    initial_state: second.map(|a| snapshot_value(&a.expr)),
                    state,
                    dispatch,
                    location,
                })
            }
            custom => {
                let existing = self.records.iter_mut().find_map(|r| match r {
                    HookRecord::Custom(c) if c.name == custom => Some(c),
                    _ => None,
                });
                if let Some(record) = existing {
                    record.usage_locs.push(location);
                    return;
                }
                match self.definitions.get(custom) {
                    Some(def) => HookRecord::Custom(CustomHook {
                        name: custom.to_string(),
                        definition_loc: *def,
                        usage_locs: vec![location],
                    }),
                    // Usages without a same-file definition are not reported.
                    None => {
                        self.dropped.push(custom.to_string());
                        return;
                    }
                }
            }
        };
        self.records.push(record);
    }

    fn hook_call(expr: &Expr) -> Option<(&CallExpr, String)> {
        match unwrap_expr(expr) {
            Expr::Call(c) => {
                let name = callee_name(c)?;
                is_hook_name(&name).then_some((c, name))
            }
            Expr::Await(a) => Self::hook_call(&a.arg),
            _ => None,
        }
    }
}

impl Visit for HookVisitor<'_> {
    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        if let Some((call, name)) = d.init.as_deref().and_then(Self::hook_call) {
            self.classify(call, &name, Some(&d.name));
            // Arguments may hold further hook calls; the call itself is done.
            for arg in &call.args {
                arg.visit_with(self);
            }
            return;
        }
        d.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, n: &CallExpr) {
        if let Some(name) = callee_name(n) {
            if is_hook_name(&name) {
                self.classify(n, &name, None);
            }
        }
        n.visit_children_with(self);
    }
}

pub fn analyze_hooks(module: &Module, locator: &Locator, diagnostics: &mut Vec<Diagnostic>) -> Vec<HookRecord> {
    let mut defs = DefinitionCollector {
        locator,
        out: HashMap::new(),
    };
    module.visit_with(&mut defs);

    let mut visitor = HookVisitor {
        locator,
        definitions: defs.out,
        records: vec![],
        dropped: vec![],
    };
    module.visit_with(&mut visitor);

    let mut seen = std::collections::HashSet::new();
    visitor.dropped.retain(|name| seen.insert(name.clone()));
    for name in visitor.dropped {
        trace!(hook = %name, "custom hook usage without a same-file definition");
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnmappedConstruct,
            format!("hook {name} has no definition in this file; usage not recorded"),
        ));
    }
    visitor.records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_source;

    fn hooks(code: &str) -> (Vec<HookRecord>, Vec<Diagnostic>) {
        let parsed = parse_source(code, "h.jsx").expect("parse");
        let mut diagnostics = vec![];
        let records = analyze_hooks(&parsed.module, &parsed.locator(), &mut diagnostics);
        (records, diagnostics)
    }

    #[test]
    fn use_state_without_setter_synthesizes_one() {
        let (records, _) = hooks("function A() { const [x] = useState('x'); return <div />; }");
        let HookRecord::State(state) = &records[0] else {
            panic!("expected state hook, got {:?}", records[0]);
        };
        assert_eq!(state.variable, "x");
        assert_eq!(state.setter, "setX");
        assert_eq!(state.initial_value, Some(serde_json::json!("x")));
        assert_eq!(state.inferred_type, "string");
        assert_eq!(state.location.line, 1);
    }

    #[test]
    fn use_state_explicit_pair_and_namespace_call() {
        let (records, _) = hooks("const [count, updateCount] = React.useState(0);");
        let HookRecord::State(state) = &records[0] else { panic!() };
        assert_eq!((state.variable.as_str(), state.setter.as_str()), ("count", "updateCount"));
        assert_eq!(state.inferred_type, "number");
        assert_eq!(state.initial_value, Some(serde_json::json!(0)));
    }

    #[test]
    fn effect_with_cleanup_and_tags() {
        let code = r#"
            useEffect(() => {
                const id = setInterval(() => setTick(t => t + 1), 1000);
                fetch("/api/items").then(r => r.json());
                window.addEventListener("resize", onResize);
                return () => clearInterval(id);
            }, [tick, props.userId]);
        "#;
        let (records, _) = hooks(code);
        let HookRecord::Effect(effect) = &records[0] else { panic!() };
        assert_eq!(effect.dependencies, vec!["tick", "props.userId"]);
        assert!(effect.has_dependency_array);
        assert!(effect.has_cleanup);
        assert_eq!(
            effect.side_effect_tags,
            vec![
                SideEffect::Timer,
                SideEffect::StateUpdate,
                SideEffect::ApiCall,
                SideEffect::EventListener
            ]
        );
    }

    #[test]
    fn effect_without_deps() {
        let (records, _) = hooks("useEffect(() => { document.title = 'x'; });");
        let HookRecord::Effect(effect) = &records[0] else { panic!() };
        assert!(!effect.has_dependency_array);
        assert!(!effect.has_cleanup);
        assert_eq!(effect.side_effect_tags, vec![SideEffect::Dom]);
    }

    #[test]
    fn context_ref_memo_callback_reducer() {
        let code = r#"
            const theme = useContext(ThemeContext);
            const inputRef = useRef(null);
            const total = useMemo(() => a + b, [a, b]);
            const onSave = useCallback(() => save(id), [id]);
            const [state, dispatch] = useReducer(reducer, { count: 0 });
        "#;
        let (records, _) = hooks(code);
        assert_eq!(records.len(), 5);
        assert!(matches!(&records[0], HookRecord::Context(c) if c.context_name.as_deref() == Some("ThemeContext")));
        assert!(matches!(&records[1], HookRecord::Ref(r) if r.name.as_deref() == Some("inputRef") && r.initial_value == Some(serde_json::Value::Null)));
        assert!(matches!(&records[2], HookRecord::Memo(m) if m.dependencies == vec!["a", "b"]));
        assert!(matches!(&records[3], HookRecord::Callback(c) if c.name.as_deref() == Some("onSave")));
        let HookRecord::Reducer(r) = &records[4] else { panic!() };
        assert_eq!(r.reducer_ref.as_deref(), Some("reducer"));
        assert_eq!(r.initial_state, Some(serde_json::json!({ "count": 0 })));
        assert_eq!(r.dispatch.as_deref(), Some("dispatch"));
    }

    #[test]
    fn custom_hooks_join_definitions_and_drop_unknown() {
        let code = r#"
            function useToggle(initial) { const [on, setOn] = useState(initial); return [on, () => setOn(!on)]; }
            function Panel() {
                const [open, toggle] = useToggle(false);
                const [other] = useToggle(true);
                const user = useCurrentUser();
                return <div />;
            }
        "#;
        let (records, diagnostics) = hooks(code);
        let customs: Vec<&CustomHook> = records
            .iter()
            .filter_map(|r| match r {
                HookRecord::Custom(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(customs.len(), 1);
        assert_eq!(customs[0].name, "useToggle");
        assert_eq!(customs[0].definition_loc.line, 2);
        assert_eq!(customs[0].usage_locs.len(), 2);
        assert!(records.iter().all(|r| !matches!(r, HookRecord::Custom(c) if c.name == "useCurrentUser")));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("useCurrentUser"));
    }
}
