//! The Aster compiler driver: lex → parse → analyze → transpile.

pub mod host_functions;

use aster_parser::{ast::Stmt, lexer::tokenize, parser::Parser};
use aster_passes::{
    analyze::{Analyzer, AnalyzerConfig},
    symbol_table::ScopeLookup,
};
use aster_source::{DiagnosticKind, Source};
use aster_transpile::transpile::transpile_to_string;
use thiserror::Error;
use tracing::{debug, info};

/// Options for a single compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    pub scope_lookup: ScopeLookup,
    /// Functions that can be called without being declared.
    pub host_functions: Vec<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            scope_lookup: ScopeLookup::default(),
            host_functions: host_functions::default_host_functions(),
        }
    }
}

impl CompileOptions {
    fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            scope_lookup: self.scope_lookup,
            host_functions: self.host_functions.clone(),
        }
    }
}

/// The stage that stopped a compilation. The diagnostics themselves are in [`Source::errors`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CompileError {
    #[error("aborting due to {0} lexical error(s)")]
    Lexical(usize),
    #[error("aborting due to a syntax error")]
    Syntax,
    #[error("aborting due to {0} semantic error(s)")]
    Semantic(usize),
}

/// Lexes and parses `source`, stopping at the first stage that reports an error.
pub fn parse(source: &Source) -> Result<Vec<Stmt>, CompileError> {
    info!(source = source.name, "lexing");
    let tokens = tokenize(source);
    let lexical_errors = source.errors.count(DiagnosticKind::Lexical);
    if lexical_errors > 0 {
        return Err(CompileError::Lexical(lexical_errors));
    }

    info!(tokens = tokens.len(), "parsing");
    let mut parser = Parser::with_tokens(source, tokens);
    let program = parser.parse_program();
    if parser.had_error() {
        return Err(CompileError::Syntax);
    }
    debug!(ast = ?program, "parsed program");
    Ok(program)
}

/// Compiles `source` to C. Every stage runs only if the previous one reported no error.
pub fn compile(source: &Source, options: &CompileOptions) -> Result<String, CompileError> {
    let program = parse(source)?;

    info!(declarations = program.len(), "analyzing");
    let mut analyzer = Analyzer::with_config(source, options.analyzer_config());
    if analyzer.analyze(&program) {
        return Err(CompileError::Semantic(
            source.errors.count(DiagnosticKind::Semantic),
        ));
    }

    info!("transpiling");
    Ok(transpile_to_string(&program))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages() {
        let source = "fn main(): i32 { let a: i32 = 1 $ }".into();
        assert_eq!(
            compile(&source, &CompileOptions::default()),
            Err(CompileError::Lexical(1))
        );

        let source = "fn main(): i32 { let a = 1 }".into();
        assert_eq!(
            compile(&source, &CompileOptions::default()),
            Err(CompileError::Syntax)
        );
        assert_eq!(source.errors.len(), 1);

        let source = "fn main(): i32 { stop undefined() return 0 }".into();
        assert_eq!(
            compile(&source, &CompileOptions::default()),
            Err(CompileError::Semantic(2))
        );
    }

    #[test]
    fn test_host_functions() {
        let program = r#"fn main(): i32 { printf("%d\n", 1) return 0 }"#;
        let source = program.into();
        assert!(compile(&source, &CompileOptions::default()).is_ok());

        let source = program.into();
        let options = CompileOptions {
            host_functions: Vec::new(),
            ..CompileOptions::default()
        };
        assert_eq!(compile(&source, &options), Err(CompileError::Semantic(1)));
    }

    #[test]
    fn test_scope_lookup() {
        let program = "fn main(): i32 { let x: i32 = 1 while true { stop } return x }";
        let source = program.into();
        assert!(compile(&source, &CompileOptions::default()).is_ok());

        // only the innermost scope is searched, so the call to `helper` inside `main` is not found
        let program = "fn helper(): i32 => 1 fn main(): i32 { return helper() }";
        let source = program.into();
        let options = CompileOptions {
            scope_lookup: ScopeLookup::Innermost,
            ..CompileOptions::default()
        };
        assert_eq!(compile(&source, &options), Err(CompileError::Semantic(1)));
        assert_eq!(
            source.errors.errors()[0].message,
            "call to undefined function `helper`"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            CompileError::Semantic(2).to_string(),
            "aborting due to 2 semantic error(s)"
        );
        assert_eq!(
            CompileError::Syntax.to_string(),
            "aborting due to a syntax error"
        );
    }
}
