//! Same-file function declarations, used to resolve handler references.

use std::collections::HashMap;

use swc_core::ecma::ast::*;

use crate::expr::unwrap_expr;

#[derive(Clone, Copy)]
pub enum FnBody<'a> {
    Block(&'a BlockStmt),
    Expr(&'a Expr),
}

impl<'a> FnBody<'a> {
    pub fn of_expr(expr: &'a Expr) -> Option<Self> {
        match unwrap_expr(expr) {
            Expr::Arrow(a) => Some(Self::of_arrow(a)),
            Expr::Fn(f) => f.function.body.as_ref().map(FnBody::Block),
            _ => None,
        }
    }

    pub fn of_arrow(a: &'a ArrowExpr) -> Self {
        match &*a.body {
            BlockStmtOrExpr::BlockStmt(b) => FnBody::Block(b),
            BlockStmtOrExpr::Expr(e) => FnBody::Expr(e),
        }
    }
}

/// Function-valued declarations anywhere in the module (including inside
/// component bodies and class bodies). The first declaration of a name wins.
#[derive(Default)]
pub struct DeclIndex<'a> {
    functions: HashMap<String, FnBody<'a>>,
}

impl<'a> DeclIndex<'a> {
    pub fn build(module: &'a Module) -> Self {
        let mut index = Self::default();
        for item in &module.body {
            match item {
                ModuleItem::Stmt(s) => index.stmt(s),
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(e)) => index.decl(&e.decl),
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(e)) => match &e.decl {
                    DefaultDecl::Fn(f) => {
                        if let Some(id) = &f.ident {
                            index.function(id.sym.as_ref(), &f.function);
                        } else if let Some(body) = &f.function.body {
                            index.block(body);
                        }
                    }
                    DefaultDecl::Class(c) => index.class(&c.class),
                    DefaultDecl::TsInterfaceDecl(_) => {}
                },
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(e)) => index.expr_body(&e.expr),
                _ => {}
            }
        }
        index
    }

    pub fn get(&self, name: &str) -> Option<FnBody<'a>> {
        self.functions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    fn insert(&mut self, name: &str, body: FnBody<'a>) {
        self.functions.entry(name.to_string()).or_insert(body);
    }

    fn function(&mut self, name: &str, function: &'a Function) {
        if let Some(body) = &function.body {
            self.insert(name, FnBody::Block(body));
            self.block(body);
        }
    }

    fn block(&mut self, block: &'a BlockStmt) {
        for s in &block.stmts {
            self.stmt(s);
        }
    }

    fn stmt(&mut self, stmt: &'a Stmt) {
        match stmt {
            Stmt::Decl(d) => self.decl(d),
            Stmt::Block(b) => self.block(b),
            _ => {}
        }
    }

    fn decl(&mut self, decl: &'a Decl) {
        match decl {
            Decl::Fn(f) => self.function(f.ident.sym.as_ref(), &f.function),
            Decl::Class(c) => self.class(&c.class),
            Decl::Var(v) => {
                for d in &v.decls {
                    let Some(init) = &d.init else { continue };
                    if let Some(id) = d.name.as_ident() {
                        if let Some(body) = handler_init(init) {
                            self.insert(id.id.sym.as_ref(), body);
                        }
                    }
                    self.expr_body(init);
                }
            }
            _ => {}
        }
    }

    /// Descend into the body of a function-valued expression.
    fn expr_body(&mut self, expr: &'a Expr) {
        match unwrap_expr(expr) {
            Expr::Arrow(a) => {
                if let BlockStmtOrExpr::BlockStmt(b) = &*a.body {
                    self.block(b);
                }
            }
            Expr::Fn(f) => {
                if let Some(b) = &f.function.body {
                    self.block(b);
                }
            }
            Expr::Call(c) => {
                for a in &c.args {
                    self.expr_body(&a.expr);
                }
            }
            _ => {}
        }
    }

    fn class(&mut self, class: &'a Class) {
        for member in &class.body {
            match member {
                ClassMember::Method(m) => {
                    if let PropName::Ident(i) = &m.key {
                        self.function(i.sym.as_ref(), &m.function);
                    }
                }
                ClassMember::ClassProp(p) => {
                    if let (PropName::Ident(i), Some(value)) = (&p.key, &p.value) {
                        if let Some(body) = FnBody::of_expr(value) {
                            self.insert(i.sym.as_ref(), body);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// `const h = () => …`, `const h = function () {…}`, `const h = useCallback(() => …, [])`.
fn handler_init(init: &Expr) -> Option<FnBody<'_>> {
    match unwrap_expr(init) {
        Expr::Call(c) => {
            let is_callback = crate::expr::callee_name(c).is_some_and(|n| n == "useCallback");
            if is_callback {
                c.args.first().and_then(|a| FnBody::of_expr(&a.expr))
            } else {
                None
            }
        }
        other => FnBody::of_expr(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_source;

    #[test]
    fn indexes_nested_and_class_handlers() {
        let code = r#"
            function App() {
                const onSave = useCallback(() => save(), []);
                function onReset() { reset(); }
                const label = "x";
                return <div />;
            }
            class Legacy extends React.Component {
                handleClick = () => this.setState({ a: 1 });
                submit() { send(); }
            }
        "#;
        let parsed = parse_source(code, "a.jsx").expect("parse");
        let index = DeclIndex::build(&parsed.module);
        for name in ["App", "onSave", "onReset", "handleClick", "submit"] {
            assert!(index.contains(name), "missing {name}");
        }
        assert!(!index.contains("label"));
    }
}
