//! Component discovery.
//!
//! Three rules, tried in a fixed order over the whole module; the first rule
//! that finds a candidate wins and, within a rule, the first candidate in
//! document order wins:
//!
//! 1. a function declaration whose body contains `return <JSX>`,
//! 2. a variable declarator initialized to an arrow/function expression
//!    returning JSX (implicit or explicit body, optionally wrapped in
//!    `memo`/`forwardRef`),
//! 3. a class declaration extending `Component`/`PureComponent`.

use serde::Serialize;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};

use crate::expr::{member_path, unwrap_expr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentKind {
    Functional,
    Arrow,
    Class,
    Unknown,
}

/// Borrowed view of the discovered component.
#[derive(Clone, Copy)]
pub enum ComponentBody<'a> {
    Function(&'a Function),
    Arrow(&'a ArrowExpr),
    Class(&'a Class),
}

#[derive(Clone, Copy)]
pub struct Component<'a> {
    pub name: Option<&'a str>,
    pub kind: ComponentKind,
    pub body: ComponentBody<'a>,
}

impl<'a> Component<'a> {
    /// First parameter pattern (props) of a function component.
    pub fn props_param(&self) -> Option<&'a Pat> {
        match self.body {
            ComponentBody::Function(f) => f.params.first().map(|p| &p.pat),
            ComponentBody::Arrow(a) => a.params.first(),
            ComponentBody::Class(_) => None,
        }
    }

    /// The JSX the component renders: the first `return <JSX>` in the body
    /// (or `render()` for classes), or an implicit arrow body.
    pub fn rendered_jsx(&self) -> Option<&'a Expr> {
        match self.body {
            ComponentBody::Function(f) => f.body.as_ref().and_then(first_jsx_return),
            ComponentBody::Arrow(a) => match &*a.body {
                BlockStmtOrExpr::Expr(e) if is_jsx(e) => Some(unwrap_expr(e)),
                BlockStmtOrExpr::Expr(_) => None,
                BlockStmtOrExpr::BlockStmt(b) => first_jsx_return(b),
            },
            ComponentBody::Class(c) => render_method(c)
                .and_then(|f| f.body.as_ref())
                .and_then(first_jsx_return),
        }
    }
}

pub fn is_jsx(expr: &Expr) -> bool {
    matches!(
        unwrap_expr(expr),
        Expr::JSXElement(_) | Expr::JSXFragment(_)
    )
}

/// Finds `return <JSX>` anywhere in a block, without entering nested functions.
struct ReturnFinder<'a> {
    found: Option<&'a Expr>,
}

impl<'a> ReturnFinder<'a> {
    fn scan_stmt(&mut self, stmt: &'a Stmt) {
        if self.found.is_some() {
            return;
        }
        match stmt {
            Stmt::Return(r) => {
                if let Some(arg) = &r.arg {
                    if is_jsx(arg) {
                        self.found = Some(unwrap_expr(arg));
                    }
                }
            }
            Stmt::Block(b) => b.stmts.iter().for_each(|s| self.scan_stmt(s)),
            Stmt::If(i) => {
                self.scan_stmt(&i.cons);
                if let Some(alt) = &i.alt {
                    self.scan_stmt(alt);
                }
            }
            Stmt::Switch(s) => s
                .cases
                .iter()
                .flat_map(|c| c.cons.iter())
                .for_each(|s| self.scan_stmt(s)),
            Stmt::Try(t) => {
                t.block.stmts.iter().for_each(|s| self.scan_stmt(s));
                if let Some(h) = &t.handler {
                    h.body.stmts.iter().for_each(|s| self.scan_stmt(s));
                }
            }
            Stmt::Labeled(l) => self.scan_stmt(&l.body),
            Stmt::For(f) => self.scan_stmt(&f.body),
            Stmt::ForIn(f) => self.scan_stmt(&f.body),
            Stmt::ForOf(f) => self.scan_stmt(&f.body),
            Stmt::While(w) => self.scan_stmt(&w.body),
            Stmt::DoWhile(w) => self.scan_stmt(&w.body),
            _ => {}
        }
    }
}

pub fn first_jsx_return(block: &BlockStmt) -> Option<&Expr> {
    let mut finder = ReturnFinder { found: None };
    for stmt in &block.stmts {
        finder.scan_stmt(stmt);
    }
    finder.found
}

fn render_method(class: &Class) -> Option<&Function> {
    class.body.iter().find_map(|member| match member {
        ClassMember::Method(m) => match &m.key {
            PropName::Ident(i) if i.sym.as_ref() == "render" => Some(&*m.function),
            _ => None,
        },
        _ => None,
    })
}

pub fn extends_component(class: &Class) -> bool {
    class
        .super_class
        .as_deref()
        .and_then(member_path)
        .map(|path| {
            matches!(
                path.as_str(),
                "Component" | "PureComponent" | "React.Component" | "React.PureComponent"
            )
        })
        .unwrap_or(false)
}

/// Unwrap `memo(fn)`, `React.forwardRef(fn)` and friends down to the function.
fn component_fn_expr(expr: &Expr) -> Option<&Expr> {
    match unwrap_expr(expr) {
        e @ (Expr::Arrow(_) | Expr::Fn(_)) => Some(e),
        Expr::Call(c) => {
            let path = match &c.callee {
                Callee::Expr(e) => member_path(e)?,
                _ => return None,
            };
            let wrapper = path.rsplit('.').next().unwrap_or(&path);
            if matches!(wrapper, "memo" | "forwardRef" | "observer") {
                c.args.first().and_then(|a| component_fn_expr(&a.expr))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn arrow_returns_jsx(a: &ArrowExpr) -> bool {
    match &*a.body {
        BlockStmtOrExpr::Expr(e) => is_jsx(e),
        BlockStmtOrExpr::BlockStmt(b) => first_jsx_return(b).is_some(),
    }
}

fn function_returns_jsx(f: &Function) -> bool {
    f.body.as_ref().and_then(first_jsx_return).is_some()
}

#[derive(Default)]
struct Candidates<'a> {
    functions: Vec<Component<'a>>,
    declarators: Vec<Component<'a>>,
    classes: Vec<Component<'a>>,
}

impl<'a> Candidates<'a> {
    fn push_fn(&mut self, name: Option<&'a str>, function: &'a Function) {
        if function_returns_jsx(function) {
            self.functions.push(Component {
                name,
                kind: ComponentKind::Functional,
                body: ComponentBody::Function(function),
            });
        }
    }

    fn push_class(&mut self, name: Option<&'a str>, class: &'a Class) {
        if extends_component(class) {
            self.classes.push(Component {
                name,
                kind: ComponentKind::Class,
                body: ComponentBody::Class(class),
            });
        }
    }

    fn visit_module(&mut self, module: &'a Module) {
        for item in &module.body {
            match item {
                ModuleItem::Stmt(s) => self.visit_stmt(s),
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(e)) => self.visit_decl(&e.decl),
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(e)) => match &e.decl {
                    DefaultDecl::Fn(f) => {
                        self.push_fn(f.ident.as_ref().map(|i| i.sym.as_ref()), &f.function)
                    }
                    DefaultDecl::Class(c) => {
                        self.push_class(c.ident.as_ref().map(|i| i.sym.as_ref()), &c.class)
                    }
                    DefaultDecl::TsInterfaceDecl(_) => {}
                },
                _ => {}
            }
        }
    }

    fn visit_stmt(&mut self, stmt: &'a Stmt) {
        if let Stmt::Decl(d) = stmt {
            self.visit_decl(d);
        }
    }

    fn visit_decl(&mut self, decl: &'a Decl) {
        match decl {
            Decl::Fn(f) => self.push_fn(Some(f.ident.sym.as_ref()), &f.function),
            Decl::Class(c) => self.push_class(Some(c.ident.sym.as_ref()), &c.class),
            Decl::Var(v) => {
                for d in &v.decls {
                    let (Some(id), Some(init)) = (d.name.as_ident(), d.init.as_deref()) else {
                        continue;
                    };
                    match component_fn_expr(init) {
                        Some(Expr::Arrow(a)) if arrow_returns_jsx(a) => {
                            self.declarators.push(Component {
                                name: Some(id.id.sym.as_ref()),
                                kind: ComponentKind::Arrow,
                                body: ComponentBody::Arrow(a),
                                            })
                        }
                        Some(Expr::Fn(f)) if function_returns_jsx(&f.function) => {
                            self.declarators.push(Component {
                                name: Some(id.id.sym.as_ref()),
                                kind: ComponentKind::Functional,
                                body: ComponentBody::Function(&f.function),
                                            })
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}

/// Resolve the component of a module. Only top-level (and exported)
/// declarations are candidates.
pub fn find_component(module: &Module) -> Option<Component<'_>> {
    let mut candidates = Candidates::default();
    candidates.visit_module(module);

    [candidates.functions, candidates.declarators, candidates.classes]
        .into_iter()
        .find_map(|tier| tier.into_iter().next())
}

/// Names of every top-level component candidate, in rule order.
pub fn candidate_names(module: &Module) -> Vec<String> {
    let mut candidates = Candidates::default();
    candidates.visit_module(module);
    candidates
        .functions
        .iter()
        .chain(&candidates.declarators)
        .chain(&candidates.classes)
        .filter_map(|c| c.name.map(str::to_string))
        .collect()
}

/// Clone of the first JSX element in the module, used when no component is found.
pub fn first_jsx_anywhere(module: &Module) -> Option<JSXElement> {
    struct First {
        found: Option<JSXElement>,
    }
    impl Visit for First {
        fn visit_jsx_element(&mut self, n: &JSXElement) {
            if self.found.is_none() {
                self.found = Some(n.clone());
            }
        }
    }
    let mut first = First { found: None };
    module.visit_with(&mut first);
    first.found
}
