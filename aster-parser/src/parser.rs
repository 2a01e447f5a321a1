use crate::ast::*;
use crate::lexer::{tokenize, Token, TokenKind};
use aster_source::{Diagnostic, Source};

/// Nodes that have a dedicated error sentinel variant.
pub trait ErrorNode {
    fn error() -> Self;
    fn is_error(&self) -> bool;
}

impl ErrorNode for Expr {
    fn error() -> Self {
        Expr::Error
    }

    fn is_error(&self) -> bool {
        matches!(self, Expr::Error)
    }
}

impl ErrorNode for Stmt {
    fn error() -> Self {
        Stmt::Error
    }

    fn is_error(&self) -> bool {
        matches!(self, Stmt::Error)
    }
}

/// Evaluates a sub-parse and returns the error sentinel from the enclosing function if it failed.
macro_rules! propagate {
    ($node: expr) => {{
        let node = $node;
        if ErrorNode::is_error(&node) {
            return ErrorNode::error();
        }
        node
    }};
}

/// Unwraps an `Option` produced by a parse helper, returning the error sentinel on `None`.
/// The helper has already reported the error.
macro_rules! require {
    ($opt: expr) => {
        match $opt {
            Some(value) => value,
            None => return ErrorNode::error(),
        }
    };
}

mod expr;
mod stmt;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    /// Index of the current token in `tokens`.
    position: usize,
    /// Source code
    source: &'a Source<'a>,
    had_error: bool,
    /// Interface methods may omit their body.
    in_interface: bool,
}

impl<'a> Parser<'a> {
    /// Tokenizes `source` and creates a parser over the resulting tokens.
    pub fn new(source: &'a Source<'a>) -> Self {
        let tokens = tokenize(source);
        Self::with_tokens(source, tokens)
    }

    /// Creates a parser over an existing token stream. An [`TokenKind::Eof`] token is appended if missing.
    pub fn with_tokens(source: &'a Source<'a>, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, column) = tokens.last().map(|t| (t.line, t.column)).unwrap_or((1, 1));
            tokens.push(Token {
                lexeme: String::new(),
                kind: TokenKind::Eof,
                line,
                column,
                leading_whitespace: false,
            });
        }
        Self {
            tokens,
            position: 0,
            source,
            had_error: false,
            in_interface: false,
        }
    }

    /// Returns `true` if a syntax error was reported.
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl<'a> Parser<'a> {
    /// Parses every top-level declaration until EOF.
    /// Parsing stops at the first syntax error; the declarations parsed so far are returned.
    pub fn parse_program(&mut self) -> Vec<Stmt> {
        let mut program = Vec::new();
        while self.current_kind() != TokenKind::Eof {
            let stmt = self.parse_declaration();
            if stmt.is_error() {
                break;
            }
            program.push(stmt);
        }
        tracing::debug!(
            declarations = program.len(),
            had_error = self.had_error,
            "parsed {}",
            self.source.name
        );
        program
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    fn current(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Kind of the token after the current one.
    fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.position + 1)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// Consumes the current token and returns it. `Eof` is never consumed.
    fn next(&mut self) -> Token {
        let token = self.current().clone();
        if token.kind != TokenKind::Eof {
            self.position += 1;
        }
        token
    }

    /// Predicate that tests whether the current token has the same kind and eats it if yes as a side effect.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.current_kind() == kind {
            self.next();
            true
        } else {
            false
        }
    }

    /// Eats a token of `kind` or reports `expected {what}`.
    fn expect(&mut self, kind: TokenKind, what: &str) -> Option<()> {
        if self.eat(kind) {
            Some(())
        } else {
            self.error(format!("expected {}", what));
            None
        }
    }

    /// Eats an identifier and returns an owned copy of its lexeme.
    fn expect_ident(&mut self, what: &str) -> Option<String> {
        if self.current_kind() == TokenKind::Identifier {
            Some(self.next().lexeme)
        } else {
            self.error(format!("expected {}", what));
            None
        }
    }

    /// Reports a syntax error at the current token.
    /// Nothing is reported for a BAD token since the lexer already did.
    fn error(&mut self, message: impl ToString) {
        self.had_error = true;

        let mut token = self.current();
        if token.kind == TokenKind::Error {
            return;
        }
        if token.kind == TokenKind::Eof && self.position > 0 {
            token = &self.tokens[self.position - 1];
        }

        self.source.errors.add_error(Diagnostic::syntax(
            message,
            token.location(),
            self.line_context(token.line),
        ));
    }

    /// Reconstructs source line `line` from its tokens.
    fn line_context(&self, line: u32) -> String {
        let mut context = String::new();
        for token in self
            .tokens
            .iter()
            .filter(|t| t.line == line && t.kind != TokenKind::Eof)
        {
            if token.leading_whitespace {
                context.push(' ');
            }
            context.push_str(&token.lexeme);
        }
        context.trim_start().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aster_source::Location;

    fn program(content: &str) -> (Vec<Stmt>, bool) {
        let source = content.into();
        let mut parser = Parser::new(&source);
        let ast = parser.parse_program();
        (ast, parser.had_error())
    }

    #[test]
    fn test_empty_program() {
        let (ast, had_error) = program("");
        assert!(ast.is_empty());
        assert!(!had_error);
    }

    #[test]
    fn test_multiple_declarations() {
        let (ast, had_error) = program(
            r#"
            enum Colour { Red, Green }
            fn main(): i32 { return 0 }
            let answer: i32 = 42;"#,
        );
        assert!(!had_error);
        assert_eq!(ast.len(), 3);
        assert!(matches!(ast[0], Stmt::EnumDeclaration(_)));
        assert!(matches!(ast[1], Stmt::FnDeclaration(_)));
        assert!(matches!(ast[2], Stmt::LetDeclaration { .. }));
    }

    #[test]
    fn test_first_error_aborts_parse() {
        let source = "fn a(): i32 { return 1 }\nlet x: i32 = )\nfn b(): i32 { return = }".into();
        let mut parser = Parser::new(&source);
        let ast = parser.parse_program();
        assert!(parser.had_error());
        assert_eq!(ast.len(), 1);
        assert_eq!(source.errors.len(), 1);

        let error = &source.errors.errors()[0];
        assert_eq!(error.message, "expected expression");
        assert_eq!(error.location, Some(Location { line: 2, column: 14 }));
        assert_eq!(error.context.as_deref(), Some("let x: i32 = )"));
    }

    #[test]
    fn test_error_at_eof_uses_previous_token() {
        let source = "fn main(): i32 {\n    return 0".into();
        let mut parser = Parser::new(&source);
        parser.parse_program();
        assert!(parser.had_error());
        let error = &source.errors.errors()[0];
        assert_eq!(error.location, Some(Location { line: 2, column: 12 }));
        assert_eq!(error.context.as_deref(), Some("return 0"));
    }

    #[test]
    fn test_bad_token_not_rediagnosed() {
        let source = "let x: i32 = $".into();
        let mut parser = Parser::new(&source);
        let ast = parser.parse_program();
        assert!(ast.is_empty());
        assert!(parser.had_error());
        assert_eq!(source.errors.len(), 1); // only the lexical error
    }

    #[test]
    fn test_with_tokens_appends_eof() {
        let source = "".into();
        let mut parser = Parser::with_tokens(&source, Vec::new());
        assert!(parser.parse_program().is_empty());
        assert_eq!(parser.tokens().len(), 1);
    }
}
