use serde::Serialize;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};

use super::hooks::StateHook;
use crate::{
    expr::{callee_path, inferred_type, member_path, prop_name, snapshot_value, unwrap_expr},
    parse::{Location, Locator},
    structure::jsx_name,
};

/// How many enclosing nodes are inspected when classifying a read.
const CONTEXT_DEPTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReadContext {
    Jsx,
    CallExpression,
    Conditional,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadLocation {
    pub location: Location,
    pub context: ReadContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropPassing {
    pub host_component: String,
    pub prop_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateVariable {
    pub name: String,
    pub initial_value: Option<serde_json::Value>,
    pub inferred_type: String,
    pub setter_name: String,
    pub read_locations: Vec<ReadLocation>,
    pub update_locations: Vec<Location>,
    pub passed_as_props: Vec<PropPassing>,
}

impl StateVariable {
    fn new(name: String, setter_name: String, initial: Option<serde_json::Value>, inferred_type: String) -> Self {
        Self {
            name,
            initial_value: initial,
            inferred_type,
            setter_name,
            read_locations: vec![],
            update_locations: vec![],
            passed_as_props: vec![],
        }
    }
}

#[derive(Clone, Copy)]
enum Frame {
    Jsx,
    Call,
    Conditional,
    Other,
}

fn frame_of(expr: &Expr) -> Frame {
    match expr {
        Expr::JSXElement(_) | Expr::JSXFragment(_) => Frame::Jsx,
        Expr::Call(_) | Expr::New(_) | Expr::OptChain(_) => Frame::Call,
        Expr::Cond(_) => Frame::Conditional,
        Expr::Bin(b) if matches!(b.op, BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing) => {
            Frame::Conditional
        }
        _ => Frame::Other,
    }
}

/// Which variable a tracker follows: a hook binding or a class `this.state` key.
enum Target<'t> {
    Hook { variable: &'t str, setter: &'t str },
    ClassField { key: &'t str },
}

struct UsageTracker<'l, 't> {
    locator: &'l Locator,
    target: Target<'t>,
    ancestors: Vec<Frame>,
    out: StateVariable,
}

impl UsageTracker<'_, '_> {
    fn context(&self) -> ReadContext {
        self.ancestors
            .iter()
            .rev()
            .take(CONTEXT_DEPTH)
            .find_map(|frame| match frame {
                Frame::Jsx => Some(ReadContext::Jsx),
                Frame::Call => Some(ReadContext::CallExpression),
                Frame::Conditional => Some(ReadContext::Conditional),
                Frame::Other => None,
            })
            .unwrap_or(ReadContext::Unknown)
    }

    fn read(&mut self, location: Location) {
        let context = self.context();
        self.out.read_locations.push(ReadLocation { location, context });
    }

    fn with_frame(&mut self, frame: Frame, f: impl FnOnce(&mut Self)) {
        self.ancestors.push(frame);
        f(self);
        self.ancestors.pop();
    }

    fn is_update(&self, call: &CallExpr) -> bool {
        match &self.target {
            Target::Hook { setter, .. } => callee_path(call).is_some_and(|p| p == *setter),
            Target::ClassField { key } => {
                callee_path(call).is_some_and(|p| p == "this.setState")
                    && call.args.first().is_some_and(|a| set_state_keys(&a.expr).iter().any(|k| k.as_str() == *key))
            }
        }
    }

    /// Bare identifier naming the followed variable.
    fn names_target(&self, expr: &Expr) -> bool {
        match (&self.target, unwrap_expr(expr)) {
            (Target::Hook { variable, .. }, Expr::Ident(i)) => i.sym.as_ref() == *variable,
            (Target::ClassField { key }, e @ Expr::Member(_)) => {
                member_path(e).is_some_and(|p| p.strip_prefix("this.state.") == Some(*key))
            }
            _ => false,
        }
    }
}

/// Keys written by a `setState` argument: `{a: 1}` or `prev => ({a: …})`.
fn set_state_keys(arg: &Expr) -> Vec<String> {
    let object = match unwrap_expr(arg) {
        Expr::Object(o) => Some(o),
        Expr::Arrow(a) => match &*a.body {
            BlockStmtOrExpr::Expr(e) => match unwrap_expr(e) {
                Expr::Object(o) => Some(o),
                _ => None,
            },
            BlockStmtOrExpr::BlockStmt(_) => None,
        },
        _ => None,
    };
    object
        .map(|o| {
            o.props
                .iter()
                .filter_map(|p| match p {
                    PropOrSpread::Prop(p) => match &**p {
                        Prop::KeyValue(kv) => prop_name(&kv.key),
                        Prop::Shorthand(i) => Some(i.sym.to_string()),
                        _ => None,
                    },
                    PropOrSpread::Spread(_) => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

impl Visit for UsageTracker<'_, '_> {
    fn visit_expr(&mut self, n: &Expr) {
        if self.names_target(n) {
            let span = match n {
                Expr::Ident(i) => i.span,
                Expr::Member(m) => m.span,
                _ => Default::default(),
            };
            let location = self.locator.locate(span);
            self.read(location);
            if matches!(n, Expr::Member(_)) {
                return;
            }
        }
        if let Expr::Call(call) = n {
            if self.is_update(call) {
                let location = self.locator.locate(call.span);
                self.out.update_locations.push(location);
            }
        }
        self.with_frame(frame_of(n), |this| n.visit_children_with(this));
    }

    fn visit_prop(&mut self, n: &Prop) {
        if let Prop::Shorthand(i) = n {
            let matches = matches!(&self.target, Target::Hook { variable, .. } if i.sym.as_ref() == *variable);
            if matches {
                let location = self.locator.locate(i.span);
                self.read(location);
            }
        }
        n.visit_children_with(self);
    }

    fn visit_stmt(&mut self, n: &Stmt) {
        let frame = match n {
            Stmt::If(_) | Stmt::Switch(_) => Frame::Conditional,
            _ => Frame::Other,
        };
        self.with_frame(frame, |this| n.visit_children_with(this));
    }

    fn visit_jsx_expr_container(&mut self, n: &JSXExprContainer) {
        self.with_frame(Frame::Jsx, |this| n.visit_children_with(this));
    }

    fn visit_jsx_opening_element(&mut self, n: &JSXOpeningElement) {
        for attr in &n.attrs {
            let JSXAttrOrSpread::JSXAttr(attr) = attr else {
                continue;
            };
            let Some(JSXAttrValue::JSXExprContainer(c)) = &attr.value else {
                continue;
            };
            let JSXExpr::Expr(e) = &c.expr else { continue };
            if self.names_target(e) {
                self.out.passed_as_props.push(PropPassing {
                    host_component: jsx_name(&n.name),
                    prop_name: crate::structure::jsx_attr_name(&attr.name),
                });
            }
        }
        self.with_frame(Frame::Jsx, |this| n.visit_children_with(this));
    }

    /// `const { a } = this.state` reads `a`.
    fn visit_var_declarator(&mut self, d: &VarDeclarator) {
        let reads_key = match (&self.target, d.init.as_deref(), &d.name) {
            (Target::ClassField { key }, Some(init), Pat::Object(obj)) => {
                member_path(init).is_some_and(|p| p == "this.state")
                    && obj.props.iter().any(|p| match p {
                        ObjectPatProp::Assign(a) => a.key.id.sym.as_ref() == *key,
                        ObjectPatProp::KeyValue(kv) => prop_name(&kv.key).as_deref() == Some(*key),
                        ObjectPatProp::Rest(_) => false,
                    })
            }
            _ => false,
        };
        if reads_key {
            let location = self.locator.locate(d.span);
            self.read(location);
        }
        d.visit_children_with(self);
    }
}

pub fn analyze_state_variables(module: &Module, hooks: &[&StateHook], locator: &Locator) -> Vec<StateVariable> {
    hooks
        .iter()
        .map(|hook| {
            let mut tracker = UsageTracker {
                locator,
                target: Target::Hook {
                    variable: &hook.variable,
                    setter: &hook.setter,
                },
                ancestors: vec![],
                out: StateVariable::new(
                    hook.variable.clone(),
                    hook.setter.clone(),
                    hook.initial_value.clone(),
                    hook.inferred_type.clone(),
                ),
            };
            module.visit_with(&mut tracker);
            tracker.out
        })
        .collect()
}

/// Initial `this.state` object of a class component, from the constructor
/// or a `state = {…}` field.
fn class_state_object(class: &Class) -> Option<&ObjectLit> {
    for member in &class.body {
        match member {
            ClassMember::ClassProp(p) => {
                if matches!(&p.key, PropName::Ident(i) if i.sym.as_ref() == "state") {
                    if let Some(Expr::Object(o)) = p.value.as_deref().map(unwrap_expr) {
                        return Some(o);
                    }
                }
            }
            ClassMember::Constructor(c) => {
                let stmts = c.body.as_ref().map(|b| b.stmts.as_slice()).unwrap_or_default();
                for stmt in stmts {
                    let Stmt::Expr(e) = stmt else { continue };
                    let Expr::Assign(assign) = unwrap_expr(&e.expr) else {
                        continue;
                    };
                    let AssignTarget::Simple(SimpleAssignTarget::Member(m)) = &assign.left else {
                        continue;
                    };
                    let is_state = matches!(&*m.obj, Expr::This(_))
                        && matches!(&m.prop, MemberProp::Ident(p) if p.sym.as_ref() == "state");
                    if is_state {
                        if let Expr::Object(o) = unwrap_expr(&assign.right) {
                            return Some(o);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    None
}

pub fn analyze_class_state(module: &Module, locator: &Locator) -> Vec<StateVariable> {
    let Some(component) = crate::component::find_component(module) else {
        return vec![];
    };
    let crate::component::ComponentBody::Class(class) = component.body else {
        return vec![];
    };
    let Some(state) = class_state_object(class) else {
        return vec![];
    };

    state
        .props
        .iter()
        .filter_map(|p| match p {
            PropOrSpread::Prop(p) => match &**p {
                Prop::KeyValue(kv) => Some((prop_name(&kv.key)?, Some(&*kv.value))),
                Prop::Shorthand(i) => Some((i.sym.to_string(), None)),
                _ => None,
            },
            PropOrSpread::Spread(_) => None,
        })
        .map(|(key, value)| {
            let mut tracker = UsageTracker {
                locator,
                target: Target::ClassField { key: &key },
                ancestors: vec![],
                out: StateVariable::new(
                    key.clone(),
                    "setState".to_string(),
                    value.map(snapshot_value),
                    inferred_type(value).to_string(),
                ),
            };
            class.visit_with(&mut tracker);
            tracker.out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_source;

    fn hook(variable: &str, setter: &str) -> StateHook {
        StateHook {
            variable: variable.to_string(),
            setter: setter.to_string(),
            initial_value: Some(serde_json::json!(0)),
            inferred_type: "number".to_string(),
            location: Location::default(),
        }
    }

    #[test]
    fn reads_updates_and_prop_passing() {
        let code = r#"
            function Counter() {
                const [count, setCount] = useState(0);
                const doubled = Math.round(count * 2);
                const payload = { count };
                return (
                    <div>
                        {count > 0 ? <span>{count}</span> : null}
                        <Display value={count} />
                        <button onClick={() => setCount(count + 1)}>+</button>
                    </div>
                );
            }
        "#;
        let parsed = parse_source(code, "Counter.jsx").expect("parse");
        let h = hook("count", "setCount");
        let vars = analyze_state_variables(&parsed.module, &[&h], &parsed.locator());
        let var = &vars[0];

        let contexts: Vec<_> = var.read_locations.iter().map(|r| r.context).collect();
        assert_eq!(
            contexts,
            vec![
                ReadContext::CallExpression,
                ReadContext::Unknown,
                ReadContext::Conditional,
                ReadContext::Jsx,
                ReadContext::Jsx,
                ReadContext::CallExpression,
            ]
        );
        assert_eq!(var.update_locations.len(), 1);
        assert_eq!(
            var.passed_as_props,
            vec![PropPassing {
                host_component: "Display".to_string(),
                prop_name: "value".to_string(),
            }]
        );
    }

    #[test]
    fn class_state_fields() {
        let code = r#"
            class Toggle extends Component {
                constructor(props) {
                    super(props);
                    this.state = { on: false, label: "off" };
                }
                flip = () => this.setState(prev => ({ on: !prev.on }));
                render() {
                    const { label } = this.state;
                    return <button onClick={this.flip}>{this.state.on ? label : "-"}</button>;
                }
            }
        "#;
        let parsed = parse_source(code, "Toggle.jsx").expect("parse");
        let vars = analyze_class_state(&parsed.module, &parsed.locator());
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[0].name, "on");
        assert_eq!(vars[0].setter_name, "setState");
        assert_eq!(vars[0].inferred_type, "boolean");
        assert_eq!(vars[0].update_locations.len(), 1);
        assert_eq!(vars[0].read_locations.len(), 1);
        assert_eq!(vars[0].read_locations[0].context, ReadContext::Conditional);
        assert_eq!(vars[1].name, "label");
        assert_eq!(vars[1].initial_value, Some(serde_json::json!("off")));
        assert_eq!(vars[1].read_locations.len(), 1);
        assert!(vars[1].update_locations.is_empty());
    }
}
