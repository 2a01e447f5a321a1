//! Source code representation and error management.

use std::{
    cell::{Ref, RefCell},
    fmt,
};

/// Name used when a `Source` is created without a file path.
pub const ANONYMOUS_SOURCE: &str = "<input>";

/// Represents source code.
pub struct Source<'a> {
    /// Identifier of the source file, used in diagnostics.
    pub name: &'a str,
    /// Original source code.
    pub content: &'a str,
    /// Accumulated errors.
    pub errors: ErrorReporter,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self::with_name(ANONYMOUS_SOURCE, content)
    }

    /// Create a new `Source` for the file `name`.
    pub fn with_name(name: &'a str, content: &'a str) -> Self {
        Self {
            name,
            content,
            errors: ErrorReporter::new(name),
        }
    }

    /// Returns `true` if `Source` has no accumulated errors. Returns `false` otherwise.
    pub fn has_no_errors(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// Stage of the pipeline that produced a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Semantic,
}

/// 1-based position of a token in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// Represents a compile time error.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Parse and lex errors are positioned, analyzer errors are reported by name only.
    pub location: Option<Location>,
    /// The offending source line, reprinted under the message.
    pub context: Option<String>,
}

impl Diagnostic {
    /// Create a lexical error at `location`.
    pub fn lexical(message: impl ToString, location: Location, context: impl ToString) -> Self {
        Self {
            kind: DiagnosticKind::Lexical,
            message: message.to_string(),
            location: Some(location),
            context: Some(context.to_string()),
        }
    }

    /// Create a syntax error at `location`.
    pub fn syntax(message: impl ToString, location: Location, context: impl ToString) -> Self {
        Self {
            kind: DiagnosticKind::Syntax,
            message: message.to_string(),
            location: Some(location),
            context: Some(context.to_string()),
        }
    }

    /// Create a semantic error. These have no position.
    pub fn semantic(message: impl ToString) -> Self {
        Self {
            kind: DiagnosticKind::Semantic,
            message: message.to_string(),
            location: None,
            context: None,
        }
    }
}

/// Manages all the errors of one [`Source`].
pub struct ErrorReporter {
    source_name: String,
    errors: RefCell<Vec<Diagnostic>>,
}

impl ErrorReporter {
    /// Create an empty `ErrorReporter` for the file `source_name`.
    pub fn new(source_name: impl ToString) -> Self {
        Self {
            source_name: source_name.to_string(),
            errors: RefCell::new(Vec::new()),
        }
    }

    /// Adds an error to the `ErrorReporter`.
    /// This method uses the interior mutability pattern. This does not require mutability for ergonomics.
    pub fn add_error(&self, error: Diagnostic) {
        tracing::debug!(kind = ?error.kind, message = %error.message, "diagnostic reported");
        // This should be the only place where self.errors is borrowed mutably.
        self.errors.borrow_mut().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.borrow().len()
    }

    /// Number of accumulated errors of the given `kind`.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.errors
            .borrow()
            .iter()
            .filter(|error| error.kind == kind)
            .count()
    }

    /// Borrows the accumulated errors in report order.
    pub fn errors(&self) -> Ref<'_, Vec<Diagnostic>> {
        self.errors.borrow()
    }

    /// Renders a single diagnostic the way it is printed on the terminal.
    pub fn render(&self, error: &Diagnostic) -> String {
        let mut out = String::new();
        match error.location {
            Some(Location { line, column }) => {
                out.push_str(&format!(
                    "error at {}:{} in {}\n",
                    line, column, self.source_name
                ));
                out.push_str(&error.message);
                out.push('\n');
                if let Some(context) = &error.context {
                    out.push_str(&format!("  {}|  {}\n", line, context));
                }
            }
            None => {
                out.push_str(&format!("error in {}\n", self.source_name));
                out.push_str(&error.message);
                out.push('\n');
            }
        }
        out
    }
}

impl fmt::Display for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors.borrow();
        for error in errors.iter() {
            writeln!(f, "{}", self.render(error))?;
        }

        Ok(())
    }
}

/// Aborts compilation because the AST violated one of its own invariants.
/// This is a bug in the compiler, never in the compiled program.
#[track_caller]
pub fn internal_compiler_error(message: impl fmt::Display) -> ! {
    tracing::error!(%message, "internal compiler error");
    panic!("internal compiler error: {}", message)
}
