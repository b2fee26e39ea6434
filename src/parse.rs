use serde::Serialize;
use swc_core::{
    common::{sync::Lrc, FileName, SourceMap, Span, Spanned},
    ecma::{
        ast::Module,
        parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax},
    },
};
use thiserror::Error;
use tracing::warn;

use crate::diagnostics::{Diagnostic, DiagnosticKind};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse {file}: {message}")]
    Syntax { file: String, message: String },
}

/// A parsed module together with the source map its spans point into.
pub struct ParsedSource {
    pub module: Module,
    pub file_path: String,
    pub source_map: Lrc<SourceMap>,
    /// Errors the parser recovered from.
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedSource {
    pub fn locator(&self) -> Locator {
        Locator::new(Some(self.source_map.clone()))
    }
}

fn syntax_for_path(file_path: &str) -> Syntax {
    if file_path.ends_with(".tsx") {
        Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        })
    } else if file_path.ends_with(".ts") || file_path.ends_with(".mts") {
        Syntax::Typescript(TsSyntax::default())
    } else {
        Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        })
    }
}

pub fn parse_source(source: &str, file_path: &str) -> Result<ParsedSource, ParseError> {
    let source_map: Lrc<SourceMap> = Default::default();
    let file = source_map.new_source_file(
        FileName::Real(file_path.into()).into(),
        source.to_string(),
    );

    let mut parser = Parser::new(syntax_for_path(file_path), StringInput::from(&*file), None);
    let module = parser.parse_module().map_err(|err| ParseError::Syntax {
        file: file_path.to_string(),
        message: format!("{:?}", err.kind()),
    })?;

    let locator = Locator::new(Some(source_map.clone()));
    let diagnostics = parser
        .take_errors()
        .into_iter()
        .map(|err| {
            let message = format!("recovered from syntax error: {:?}", err.kind());
            warn!(file = file_path, %message);
            Diagnostic::new(DiagnosticKind::MalformedInput, message).at(locator.locate(err.span()))
        })
        .collect();

    Ok(ParsedSource {
        module,
        file_path: file_path.to_string(),
        source_map,
        diagnostics,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub offset: u32,
}

/// Turns spans into line/column locations.
///
/// Without a source map (or for dummy spans) only `offset` is meaningful.
#[derive(Clone, Default)]
pub struct Locator {
    source_map: Option<Lrc<SourceMap>>,
}

impl Locator {
    pub fn new(source_map: Option<Lrc<SourceMap>>) -> Self {
        Self { source_map }
    }

    pub fn locate(&self, span: Span) -> Location {
        if span.is_dummy() {
            return Location::default();
        }
        match self.source_map {
            Some(ref cm) => {
                let loc = cm.lookup_char_pos(span.lo());
                Location {
                    line: loc.line,
                    column: loc.col_display,
                    offset: span.lo().0,
                }
            }
            None => Location {
                line: 0,
                column: 0,
                offset: span.lo().0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_grammar_from_extension() {
        let tsx = "interface P { a: string }\nexport const A = (p: P) => <div />;";
        assert!(parse_source(tsx, "A.tsx").is_ok());
        assert!(parse_source("const a = <div />;", "a.jsx").is_ok());
        assert!(parse_source("let x: number = 1;", "x.ts").is_ok());
    }

    #[test]
    fn unrecoverable_error_is_reported() {
        let err = parse_source("const = ;", "broken.js")
            .err()
            .expect("parse should fail");
        assert!(err.to_string().starts_with("failed to parse broken.js"));
    }

    #[test]
    fn locator_reports_lines() {
        let parsed = parse_source("\n\nconst a = 1;", "a.js").expect("parse");
        let span = match &parsed.module.body[0] {
            swc_core::ecma::ast::ModuleItem::Stmt(s) => swc_core::common::Spanned::span(s),
            _ => panic!("expected stmt"),
        };
        let loc = parsed.locator().locate(span);
        assert_eq!(loc.line, 3);
        assert_eq!(loc.column, 0);
    }
}
