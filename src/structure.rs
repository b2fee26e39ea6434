//! Single-pass structural census of a component file.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};
use tracing::debug;

use crate::{
    component::{candidate_names, find_component, ComponentKind},
    config::TransformConfig,
    diagnostics::{Diagnostic, DiagnosticKind},
    expr::{class_tokens, value_kind, ValueKind},
    naming::{is_event_handler_name, is_hook_name},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportKind {
    Relative,
    FrameworkBuiltin,
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedBinding {
    pub imported: String,
    pub local: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRecord {
    pub source: String,
    pub kind: ImportKind,
    pub default_binding: Option<String>,
    pub named: Vec<NamedBinding>,
    pub namespace: Option<String>,
    pub type_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportKind {
    Named,
    Default,
    ReExport,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub exported: String,
    pub local: Option<String>,
    pub source: Option<String>,
    pub kind: ExportKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropObservation {
    pub element: String,
    pub name: String,
    pub value_kind: ValueKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub fn classify(total_elements: usize, max_depth: usize, total_props: usize, hook_count: usize) -> Self {
        if total_elements > 20 || max_depth > 5 || total_props > 15 || hook_count > 3 {
            Complexity::Complex
        } else if total_elements > 10 || max_depth > 3 || total_props > 8 || hook_count > 1 {
            Complexity::Moderate
        } else {
            Complexity::Simple
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentStructure {
    pub file_path: String,
    pub component_name: Option<String>,
    pub component_type: ComponentKind,
    pub is_page: bool,
    pub is_default_export: bool,
    pub imports: Vec<ImportRecord>,
    pub exports: Vec<ExportRecord>,
    pub jsx_elements: BTreeMap<String, usize>,
    pub attributes: BTreeMap<String, usize>,
    pub prop_observations: Vec<PropObservation>,
    pub class_names: BTreeSet<String>,
    pub text_samples: Vec<String>,
    pub custom_components: BTreeSet<String>,
    pub html_elements: BTreeMap<String, usize>,
    pub hooks: Vec<String>,
    pub event_handlers: BTreeSet<String>,
    pub total_elements: usize,
    pub max_depth: usize,
    pub complexity: Complexity,
    pub diagnostics: Vec<Diagnostic>,
}

impl ComponentStructure {
    pub fn total_props(&self) -> usize {
        self.prop_observations.len()
    }
}

/// Display name of a JSX tag: `div`, `Card`, `Menu.Item`, `svg:path`.
pub fn jsx_name(name: &JSXElementName) -> String {
    fn object(obj: &JSXObject) -> String {
        match obj {
            JSXObject::Ident(i) => i.sym.to_string(),
            JSXObject::JSXMemberExpr(m) => format!("{}.{}", object(&m.obj), m.prop.sym),
        }
    }
    match name {
        JSXElementName::Ident(i) => i.sym.to_string(),
        JSXElementName::JSXMemberExpr(m) => format!("{}.{}", object(&m.obj), m.prop.sym),
        JSXElementName::JSXNamespacedName(n) => format!("{}:{}", n.ns.sym, n.name.sym),
    }
}

/// Capitalized or dotted tags are components; lowercase identifiers are html.
pub fn is_custom_component_name(name: &JSXElementName) -> bool {
    match name {
        JSXElementName::Ident(ident) => ident
            .sym
            .chars()
            .next()
            .map(|c| c.is_uppercase())
            .unwrap_or(false),
        JSXElementName::JSXMemberExpr(_) => true,
        JSXElementName::JSXNamespacedName(_) => false,
    }
}

pub fn jsx_attr_name(name: &JSXAttrName) -> String {
    match name {
        JSXAttrName::Ident(i) => i.sym.to_string(),
        JSXAttrName::JSXNamespacedName(n) => format!("{}:{}", n.ns.sym, n.name.sym),
    }
}

pub fn attr_value_kind(value: Option<&JSXAttrValue>) -> ValueKind {
    match value {
        None => ValueKind::Boolean,
        Some(JSXAttrValue::Lit(Lit::Str(_))) => ValueKind::String,
        Some(JSXAttrValue::Lit(Lit::Num(_))) => ValueKind::Number,
        Some(JSXAttrValue::Lit(Lit::Bool(_))) => ValueKind::Boolean,
        Some(JSXAttrValue::Lit(_)) => ValueKind::Expression,
        Some(JSXAttrValue::JSXExprContainer(c)) => match &c.expr {
            JSXExpr::Expr(e) => value_kind(e),
            JSXExpr::JSXEmptyExpr(_) => ValueKind::Expression,
        },
        Some(JSXAttrValue::JSXElement(_)) | Some(JSXAttrValue::JSXFragment(_)) => ValueKind::Element,
    }
}

/// Collapse whitespace runs (JSX text semantics, roughly).
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct StructureVisitor<'c> {
    config: &'c TransformConfig,
    imports: Vec<ImportRecord>,
    exports: Vec<ExportRecord>,
    default_export_locals: Vec<String>,
    jsx_elements: BTreeMap<String, usize>,
    attributes: BTreeMap<String, usize>,
    prop_observations: Vec<PropObservation>,
    class_names: BTreeSet<String>,
    text_samples: Vec<String>,
    custom_components: BTreeSet<String>,
    html_elements: BTreeMap<String, usize>,
    hooks: Vec<String>,
    event_handlers: BTreeSet<String>,
    total_elements: usize,
    depth: usize,
    max_depth: usize,
    element_stack: Vec<String>,
}

impl<'c> StructureVisitor<'c> {
    fn new(config: &'c TransformConfig) -> Self {
        Self {
            config,
            imports: vec![],
            exports: vec![],
            default_export_locals: vec![],
            jsx_elements: BTreeMap::new(),
            attributes: BTreeMap::new(),
            prop_observations: vec![],
            class_names: BTreeSet::new(),
            text_samples: vec![],
            custom_components: BTreeSet::new(),
            html_elements: BTreeMap::new(),
            hooks: vec![],
            event_handlers: BTreeSet::new(),
            total_elements: 0,
            depth: 0,
            max_depth: 0,
            element_stack: vec![],
        }
    }

    fn classify_import(&self, source: &str) -> ImportKind {
        if source.starts_with('.') || source.starts_with('/') {
            ImportKind::Relative
        } else if self.config.is_framework_source(source) {
            ImportKind::FrameworkBuiltin
        } else {
            ImportKind::External
        }
    }

    fn export_name(name: &ModuleExportName) -> String {
        match name {
            ModuleExportName::Ident(i) => i.sym.to_string(),
            ModuleExportName::Str(s) => s.value.to_string(),
        }
    }

    fn push_export(&mut self, exported: String, local: Option<String>, source: Option<String>, kind: ExportKind) {
        if kind == ExportKind::Default {
            if let Some(local) = &local {
                self.default_export_locals.push(local.clone());
            }
        }
        self.exports.push(ExportRecord {
            exported,
            local,
            source,
            kind,
        });
    }
}

impl Visit for StructureVisitor<'_> {
    fn visit_import_decl(&mut self, n: &ImportDecl) {
        let source = n.src.value.to_string();
        let mut record = ImportRecord {
            kind: self.classify_import(&source),
            source,
            default_binding: None,
            named: vec![],
            namespace: None,
            type_only: n.type_only,
        };
        for s in &n.specifiers {
            match s {
                ImportSpecifier::Named(named) => record.named.push(NamedBinding {
                    imported: named
                        .imported
                        .as_ref()
                        .map(Self::export_name)
                        .unwrap_or_else(|| named.local.sym.to_string()),
                    local: named.local.sym.to_string(),
                }),
                ImportSpecifier::Default(def) => {
                    record.default_binding = Some(def.local.sym.to_string())
                }
                ImportSpecifier::Namespace(ns) => record.namespace = Some(ns.local.sym.to_string()),
            }
        }
        self.imports.push(record);
    }

    fn visit_export_decl(&mut self, n: &ExportDecl) {
        match &n.decl {
            Decl::Var(v) => {
                for d in &v.decls {
                    if let Some(id) = d.name.as_ident() {
                        let name = id.id.sym.to_string();
                        self.push_export(name.clone(), Some(name), None, ExportKind::Named);
                    }
                }
            }
            Decl::Fn(f) => {
                let name = f.ident.sym.to_string();
                self.push_export(name.clone(), Some(name), None, ExportKind::Named);
            }
            Decl::Class(c) => {
                let name = c.ident.sym.to_string();
                self.push_export(name.clone(), Some(name), None, ExportKind::Named);
            }
            Decl::TsInterface(i) => {
                let name = i.id.sym.to_string();
                self.push_export(name.clone(), Some(name), None, ExportKind::Named);
            }
            Decl::TsTypeAlias(t) => {
                let name = t.id.sym.to_string();
                self.push_export(name.clone(), Some(name), None, ExportKind::Named);
            }
            _ => {}
        }
        n.visit_children_with(self);
    }

    fn visit_named_export(&mut self, n: &NamedExport) {
        let source = n.src.as_ref().map(|s| s.value.to_string());
        for s in &n.specifiers {
            match s {
                ExportSpecifier::Named(nm) => {
                    let orig = Self::export_name(&nm.orig);
                    let exported = nm
                        .exported
                        .as_ref()
                        .map(Self::export_name)
                        .unwrap_or_else(|| orig.clone());
                    let kind = if source.is_some() {
                        ExportKind::ReExport
                    } else if exported == "default" {
                        ExportKind::Default
                    } else {
                        ExportKind::Named
                    };
                    self.push_export(exported, Some(orig), source.clone(), kind);
                }
                ExportSpecifier::Namespace(ns) => {
                    self.push_export(Self::export_name(&ns.name), None, source.clone(), ExportKind::ReExport)
                }
                ExportSpecifier::Default(d) => {
                    let name = d.exported.sym.to_string();
                    self.push_export(name.clone(), Some(name), source.clone(), ExportKind::ReExport)
                }
            }
        }
    }

    fn visit_export_all(&mut self, n: &ExportAll) {
        self.push_export("*".into(), None, Some(n.src.value.to_string()), ExportKind::All);
    }

    fn visit_export_default_decl(&mut self, n: &ExportDefaultDecl) {
        let local = match &n.decl {
            DefaultDecl::Fn(f) => f.ident.as_ref().map(|i| i.sym.to_string()),
            DefaultDecl::Class(c) => c.ident.as_ref().map(|i| i.sym.to_string()),
            DefaultDecl::TsInterfaceDecl(i) => Some(i.id.sym.to_string()),
        };
        self.push_export("default".into(), local, None, ExportKind::Default);
        n.visit_children_with(self);
    }

    fn visit_export_default_expr(&mut self, n: &ExportDefaultExpr) {
        // `export default memo(Card)` still names Card.
        let local = match crate::expr::unwrap_expr(&n.expr) {
            Expr::Ident(i) => Some(i.sym.to_string()),
            Expr::Call(c) => c.args.first().and_then(|a| match crate::expr::unwrap_expr(&a.expr) {
                Expr::Ident(i) => Some(i.sym.to_string()),
                _ => None,
            }),
            _ => None,
        };
        self.push_export("default".into(), local, None, ExportKind::Default);
        n.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, n: &CallExpr) {
        if let Some(name) = crate::expr::callee_name(n) {
            if is_hook_name(&name) {
                self.hooks.push(name);
            }
        }
        n.visit_children_with(self);
    }

    fn visit_jsx_element(&mut self, n: &JSXElement) {
        let name = jsx_name(&n.opening.name);
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.total_elements += 1;
        *self.jsx_elements.entry(name.clone()).or_default() += 1;
        if is_custom_component_name(&n.opening.name) {
            self.custom_components.insert(name.clone());
        } else {
            *self.html_elements.entry(name.clone()).or_default() += 1;
        }

        self.element_stack.push(name);
        n.visit_children_with(self);
        self.element_stack.pop();
        self.depth -= 1;
    }

    fn visit_jsx_attr(&mut self, n: &JSXAttr) {
        let name = jsx_attr_name(&n.name);
        *self.attributes.entry(name.clone()).or_default() += 1;

        if name == "className" || name == "class" {
            match &n.value {
                Some(JSXAttrValue::Lit(Lit::Str(s))) => {
                    for token in s.value.split_whitespace() {
                        self.class_names.insert(token.to_string());
                    }
                }
                Some(JSXAttrValue::JSXExprContainer(JSXExprContainer {
                    expr: JSXExpr::Expr(e),
                    ..
                })) => self.class_names.extend(class_tokens(e)),
                _ => {}
            }
        }
        if is_event_handler_name(&name) {
            self.event_handlers.insert(name.clone());
        }

        self.prop_observations.push(PropObservation {
            element: self.element_stack.last().cloned().unwrap_or_default(),
            name,
            value_kind: attr_value_kind(n.value.as_ref()),
        });
        n.visit_children_with(self);
    }

    fn visit_jsx_text(&mut self, n: &JSXText) {
        let text = normalize_text(&n.value);
        if !text.is_empty() && self.text_samples.len() < self.config.text_sample_limit {
            self.text_samples.push(text);
        }
    }
}

fn is_page(file_path: &str, name: Option<&str>, config: &TransformConfig) -> bool {
    let path = file_path.replace('\\', "/");
    let stem = path
        .rsplit('/')
        .next()
        .and_then(|f| f.split('.').next())
        .unwrap_or_default();
    config.page_markers.iter().any(|m| path.contains(m.as_str()))
        || stem == "page"
        || name.is_some_and(|n| n.ends_with("Page") || n.ends_with("Screen"))
}

pub fn analyze_structure(module: &Module, file_path: &str, config: &TransformConfig) -> ComponentStructure {
    let mut visitor = StructureVisitor::new(config);
    module.visit_with(&mut visitor);

    let mut diagnostics = vec![];
    let component = find_component(module);
    let (component_name, component_type) = match component {
        Some(c) => (c.name.map(str::to_string), c.kind),
        None => {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::StructuralAmbiguity,
                "no component found: no JSX-returning function, arrow or component class",
            ));
            (None, ComponentKind::Unknown)
        }
    };
    let candidates = candidate_names(module);
    if candidates.len() > 1 {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::StructuralAmbiguity,
            format!(
                "{} component candidates ({}); using {}",
                candidates.len(),
                candidates.join(", "),
                component_name.as_deref().unwrap_or("<anonymous>")
            ),
        ));
    }

    let is_default_export = match &component_name {
        Some(name) => visitor.default_export_locals.iter().any(|l| l == name),
        None => false,
    } || module.body.iter().any(|item| {
        matches!(
            item,
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(ExportDefaultDecl {
                decl: DefaultDecl::Fn(FnExpr { ident: None, .. }),
                ..
            }))
        )
    }) && component.is_some();

    let complexity = Complexity::classify(
        visitor.total_elements,
        visitor.max_depth,
        visitor.prop_observations.len(),
        visitor.hooks.len(),
    );
    debug!(
        file = file_path,
        component = component_name.as_deref().unwrap_or("<none>"),
        elements = visitor.total_elements,
        depth = visitor.max_depth,
        ?complexity,
        "structure analyzed"
    );

    ComponentStructure {
        file_path: file_path.to_string(),
        is_page: is_page(file_path, component_name.as_deref(), config),
        component_name,
        component_type,
        is_default_export,
        imports: visitor.imports,
        exports: visitor.exports,
        jsx_elements: visitor.jsx_elements,
        attributes: visitor.attributes,
        prop_observations: visitor.prop_observations,
        class_names: visitor.class_names,
        text_samples: visitor.text_samples,
        custom_components: visitor.custom_components,
        html_elements: visitor.html_elements,
        hooks: visitor.hooks,
        event_handlers: visitor.event_handlers,
        total_elements: visitor.total_elements,
        max_depth: visitor.max_depth,
        complexity,
        diagnostics,
    }
}
