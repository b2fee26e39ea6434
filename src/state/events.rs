use serde::Serialize;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};
use tracing::trace;

use super::{
    decls::{DeclIndex, FnBody},
    variables::StateVariable,
};
use crate::{
    diagnostics::{Diagnostic, DiagnosticKind},
    expr::{expr_source, member_path, unwrap_expr},
    naming::{event_type, is_event_handler_name},
    parse::{Location, Locator},
    structure::{jsx_attr_name, jsx_name},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HandlerAction {
    SetState,
    ApiCall,
    Navigation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHandlerRecord {
    /// Declared handler name, or `inline:<attribute>` for function literals.
    pub name: String,
    pub event_type: String,
    pub element: String,
    pub uses_state: Vec<String>,
    pub actions: Vec<HandlerAction>,
    pub location: Location,
}

/// Top-level scan of a handler body. Calls nested inside call arguments and
/// nested function literals are not inspected.
struct ShallowScanner<'s> {
    state: &'s [StateVariable],
    call_depth: usize,
    uses_state: Vec<String>,
    actions: Vec<HandlerAction>,
}

impl ShallowScanner<'_> {
    fn action(&mut self, action: HandlerAction) {
        if !self.actions.contains(&action) {
            self.actions.push(action);
        }
    }

    fn uses(&mut self, name: &str) {
        if !self.uses_state.iter().any(|n| n == name) {
            self.uses_state.push(name.to_string());
        }
    }

    fn classify_callee(&mut self, call: &CallExpr) {
        let Callee::Expr(callee) = &call.callee else {
            return;
        };
        let text = member_path(callee).unwrap_or_else(|| expr_source(callee));
        let last = text.rsplit('.').next().unwrap_or(&text);
        let lower = text.to_ascii_lowercase();

        if let Some(var) = self.state.iter().find(|v| v.setter_name == last) {
            let name = if last == "setState" { None } else { Some(var.name.clone()) };
            self.action(HandlerAction::SetState);
            if let Some(name) = name {
                self.uses(&name);
            }
        } else if last == "setState" {
            self.action(HandlerAction::SetState);
        } else if lower.contains("api") || lower.contains("fetch") || lower.contains("axios") {
            self.action(HandlerAction::ApiCall);
        } else if lower.contains("router") || lower.contains("navigate") || lower.contains("navigation") {
            self.action(HandlerAction::Navigation);
        }
    }
}

impl Visit for ShallowScanner<'_> {
    fn visit_call_expr(&mut self, n: &CallExpr) {
        if self.call_depth > 0 {
            return;
        }
        self.classify_callee(n);
        self.call_depth += 1;
        n.args.visit_with(self);
        self.call_depth -= 1;
    }

    fn visit_ident(&mut self, n: &Ident) {
        let name = n.sym.as_ref();
        let hit = self
            .state
            .iter()
            .find(|v| v.name == name || v.setter_name == name)
            .map(|v| (v.name.clone(), v.setter_name == name));
        if let Some((variable, is_setter)) = hit {
            self.uses(&variable);
            if is_setter {
                self.action(HandlerAction::SetState);
            }
        }
    }

    fn visit_member_expr(&mut self, n: &MemberExpr) {
        let key = match (member_path(&n.obj).as_deref(), &n.prop) {
            (Some("this.state"), MemberProp::Ident(p)) => Some(p.sym.to_string()),
            (Some(path), _) => path
                .strip_prefix("this.state.")
                .map(|rest| rest.split('.').next().unwrap_or(rest).to_string()),
            _ => None,
        };
        match key {
            Some(key) => {
                if self.state.iter().any(|v| v.name == key) {
                    self.uses(&key);
                }
            }
            None => n.visit_children_with(self),
        }
    }

    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}

    fn visit_function(&mut self, _: &Function) {}
}

fn scan(body: FnBody<'_>, state: &[StateVariable]) -> (Vec<String>, Vec<HandlerAction>) {
    let mut scanner = ShallowScanner {
        state,
        call_depth: 0,
        uses_state: vec![],
        actions: vec![],
    };
    match body {
        FnBody::Expr(e) => e.visit_with(&mut scanner),
        FnBody::Block(b) => {
            for stmt in &b.stmts {
                stmt.visit_with(&mut scanner);
            }
        }
    }
    (scanner.uses_state, scanner.actions)
}

/// `this.handle` and `this.handle.bind(this)` both name `handle`.
fn this_method(expr: &Expr) -> Option<String> {
    match unwrap_expr(expr) {
        Expr::Call(c) => {
            let Callee::Expr(callee) = &c.callee else { return None };
            let path = member_path(callee)?;
            let method = path.strip_prefix("this.")?.strip_suffix(".bind")?;
            Some(method.to_string())
        }
        e => {
            let path = member_path(e)?;
            let method = path.strip_prefix("this.")?;
            (!method.contains('.')).then(|| method.to_string())
        }
    }
}

struct HandlerVisitor<'a, 'r> {
    decls: &'r DeclIndex<'a>,
    state: &'r [StateVariable],
    locator: &'r Locator,
    records: Vec<EventHandlerRecord>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> HandlerVisitor<'a, '_> {
    /// Handler name plus its body, when it can be found in this file.
    fn resolve<'e>(&self, attr: &str, expr: &'e Expr) -> (String, Option<FnBody<'e>>)
    where
        'a: 'e,
    {
        let expr = unwrap_expr(expr);
        if let Some(body) = FnBody::of_expr(expr) {
            return (format!("inline:{attr}"), Some(body));
        }
        if let Expr::Ident(i) = expr {
            let name = i.sym.to_string();
            let body = self.decls.get(&name);
            return (name, body);
        }
        if let Some(method) = this_method(expr) {
            let body = self.decls.get(&method);
            return (method, body);
        }
        (expr_source(expr), None)
    }
}

impl Visit for HandlerVisitor<'_, '_> {
    fn visit_jsx_opening_element(&mut self, n: &JSXOpeningElement) {
        let element = jsx_name(&n.name);
        for attr in &n.attrs {
            let JSXAttrOrSpread::JSXAttr(attr) = attr else {
                continue;
            };
            let attr_name = jsx_attr_name(&attr.name);
            if !is_event_handler_name(&attr_name) {
                continue;
            }
            let Some(JSXAttrValue::JSXExprContainer(JSXExprContainer {
                expr: JSXExpr::Expr(value),
                ..
            })) = &attr.value
            else {
                continue;
            };

            let location = self.locator.locate(attr.span);
            let (name, body) = self.resolve(&attr_name, value);
            let (uses_state, actions) = match body {
                Some(body) => scan(body, self.state),
                None => {
                    self.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticKind::UnmappedConstruct,
                            format!("{attr_name} handler `{name}` on <{element}> could not be resolved in this file"),
                        )
                        .at(location),
                    );
                    (vec![], vec![])
                }
            };
            trace!(handler = %name, element = %element, ?actions, "event handler");

            self.records.push(EventHandlerRecord {
                name,
                event_type: event_type(&attr_name),
                element: element.clone(),
                uses_state,
                actions,
                location,
            });
        }
        n.visit_children_with(self);
    }
}

pub fn analyze_event_handlers(
    module: &Module,
    decls: &DeclIndex<'_>,
    state: &[StateVariable],
    locator: &Locator,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<EventHandlerRecord> {
    let mut visitor = HandlerVisitor {
        decls,
        state,
        locator,
        records: vec![],
        diagnostics: vec![],
    };
    module.visit_with(&mut visitor);
    diagnostics.extend(visitor.diagnostics);
    visitor.records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        parse::parse_source,
        state::{analyze_state, StateAnalysis},
    };

    fn analysis(code: &str) -> StateAnalysis {
        let parsed = parse_source(code, "Form.jsx").expect("parse");
        analyze_state(&parsed.module, &parsed.locator())
    }

    #[test]
    fn inline_and_named_handlers() {
        let code = r#"
            export default function Form() {
                const [name, setName] = useState("");
                const router = useRouter();
                async function submit() {
                    await fetch("/api/users", { body: JSON.stringify({ name }) });
                    router.push("/done");
                }
                return (
                    <form onSubmit={submit}>
                        <input onChange={(e) => setName(e.target.value)} />
                        <button onClick={() => { log(setName); }}>Save</button>
                    </form>
                );
            }
        "#;
        let state = analysis(code);
        let handlers = &state.event_handlers;
        assert_eq!(handlers.len(), 3);

        assert_eq!(handlers[0].name, "submit");
        assert_eq!(handlers[0].event_type, "submit");
        assert_eq!(handlers[0].element, "form");
        assert_eq!(handlers[0].actions, vec![HandlerAction::ApiCall, HandlerAction::Navigation]);
        assert!(handlers[0].uses_state.is_empty());

        assert_eq!(handlers[1].name, "inline:onChange");
        assert_eq!(handlers[1].actions, vec![HandlerAction::SetState]);
        assert_eq!(handlers[1].uses_state, vec!["name".to_string()]);

        assert_eq!(handlers[2].actions, vec![HandlerAction::SetState]);
    }

    #[test]
    fn unresolved_handler_is_reported() {
        let state = analysis("function A() { return <button onClick={props.onPress}>x</button>; }");
        assert_eq!(state.event_handlers.len(), 1);
        assert!(state.event_handlers[0].actions.is_empty());
        assert!(state
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::UnmappedConstruct && d.message.contains("props.onPress")));
    }

    #[test]
    fn class_method_handler() {
        let code = r#"
            class Toggle extends React.Component {
                state = { on: false };
                toggle() { this.setState({ on: !this.state.on }); }
                render() { return <button onClick={this.toggle.bind(this)}>t</button>; }
            }
        "#;
        let state = analysis(code);
        let handler = &state.event_handlers[0];
        assert_eq!(handler.name, "toggle");
        assert_eq!(handler.actions, vec![HandlerAction::SetState]);
        assert_eq!(handler.uses_state, vec!["on".to_string()]);
    }
}
