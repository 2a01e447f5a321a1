use aster_source::{Diagnostic, Location, Source};
use logos::Logos;
use std::fmt;

#[derive(Debug, Logos, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // literals
    #[regex(r"[0-9]+")]
    IntLit,
    #[regex(r"[0-9]+\.[0-9]+")]
    FloatLit,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    StringLit,
    #[regex(r"'([^'\\\n]|\\.)'")]
    CharLit,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // identifiers
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,

    // unary operators
    #[token("not")]
    Not,
    #[token("~")]
    Tilde,
    #[token("sizeof")]
    Sizeof,

    // binary operators
    // - arithmetics
    #[token("+")]
    Plus,
    #[token("-")]
    Minus, // NOTE: can also be unary
    #[token("*")]
    Asterisk, // NOTE: also dereference and pointer types
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("as")]
    As,
    // - bitwise
    #[token("&")]
    Ampersand, // NOTE: also address-of
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("<<")]
    ShiftLeft,
    #[token(">>")]
    ShiftRight,
    // - logical
    #[token("and")]
    And,
    #[token("or")]
    Or,
    // - assignment
    #[token("=")]
    Equals,
    // - equality
    #[token("==")]
    EqualsEquals,
    #[token("!=")]
    NotEquals,
    // - ordering
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEquals,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEquals,

    // punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token("=>")]
    FatArrow,

    // keywords
    #[token("fn")]
    Fn,
    #[token("let")]
    Let,
    #[token("mut")]
    Mut,
    #[token("pub")]
    Pub,
    #[token("return")]
    Return,
    #[token("struct")]
    Struct,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,
    #[token("while")]
    While,
    #[token("for")]
    For,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("match")]
    Match,
    #[token("next")]
    Next,
    #[token("stop")]
    Stop,

    // misc
    #[regex(r"[ \t\n\r\f]+", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)] // single line comments
    #[error]
    Error,

    /// Only generated at the end of [`tokenize`].
    Eof,
}

impl TokenKind {
    /// Returns the binary binding power or `None` if invalid binop token.
    /// Binding power `0` and `1` is reserved for accepting any expression.
    /// Every tier is left associative (`l_bp < r_bp`).
    pub fn binop_bp(&self) -> Option<(u8, u8)> {
        match self {
            /* Logical */
            TokenKind::Or => Some((2, 3)),
            TokenKind::And => Some((4, 5)),
            /* Bitwise */
            TokenKind::Pipe => Some((6, 7)),
            TokenKind::Caret => Some((8, 9)),
            TokenKind::Ampersand => Some((10, 11)),
            /* Equality */
            TokenKind::EqualsEquals | TokenKind::NotEquals => Some((12, 13)),
            TokenKind::GreaterThan
            | TokenKind::GreaterThanEquals
            | TokenKind::LessThan
            | TokenKind::LessThanEquals => Some((14, 15)),
            /* Shift */
            TokenKind::ShiftLeft | TokenKind::ShiftRight => Some((16, 17)),
            /* Additive */
            TokenKind::Plus | TokenKind::Minus => Some((18, 19)),
            /* Multiplicative and cast */
            TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percent | TokenKind::As => {
                Some((20, 21))
            }
            _ => None,
        }
    }
}

/// A single token of the stream consumed by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub lexeme: String,
    pub kind: TokenKind,
    pub line: u32,
    pub column: u32,
    /// Whether the token was separated from the previous one (by whitespace or a comment).
    pub leading_whitespace: bool,
}

impl Token {
    pub fn location(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} {:?} at {}:{}",
            self.lexeme, self.kind, self.line, self.column
        )
    }
}

/// Byte offsets of the first character of every line.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            content
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    /// Returns the 1-based (line, column) of `offset`.
    fn position(&self, offset: usize) -> (u32, u32) {
        let line = match self.starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        (line as u32 + 1, (offset - self.starts[line]) as u32 + 1)
    }

    fn line_text<'a>(&self, content: &'a str, line: u32) -> &'a str {
        let start = self.starts[line as usize - 1];
        let end = self
            .starts
            .get(line as usize)
            .map(|next| next - 1)
            .unwrap_or_else(|| content.len());
        content[start..end].trim_end_matches('\r')
    }
}

/// Scans `source` into a token stream terminated by a [`TokenKind::Eof`] token.
/// Unknown characters become [`TokenKind::Error`] tokens and are reported as lexical errors.
pub fn tokenize(source: &Source) -> Vec<Token> {
    let content = source.content;
    let lines = LineIndex::new(content);
    let mut tokens = Vec::new();
    let mut prev_end = 0;

    for (kind, span) in TokenKind::lexer(content).spanned() {
        let (line, column) = lines.position(span.start);
        let lexeme = &content[span.clone()];

        if kind == TokenKind::Error {
            source.errors.add_error(Diagnostic::lexical(
                format!("unexpected character `{}`", lexeme),
                Location { line, column },
                lines.line_text(content, line),
            ));
        }

        tokens.push(Token {
            lexeme: lexeme.to_string(),
            kind,
            line,
            column,
            leading_whitespace: span.start > prev_end,
        });
        prev_end = span.end;
    }

    let (line, column) = lines.position(content.len());
    tokens.push(Token {
        lexeme: String::new(),
        kind: TokenKind::Eof,
        line,
        column,
        leading_whitespace: content.len() > prev_end,
    });

    tracing::debug!(count = tokens.len(), "tokenized {}", source.name);
    tokens
}
