use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub const fn dummy() -> Self {
        Self { line: 0, column: 0 }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 && self.column == 0 {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Malformed block structure. Fatal for the document being parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at {span}")]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Failure to resolve a single `--import`. Never aborts the page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("import not found: {0}")]
    NotFound(String),

    #[error("failed to read import '{path}': {message}")]
    Read { path: String, message: String },

    #[error("import '{0}' is not valid UTF-8")]
    Encoding(String),

    #[error("failed to parse import '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: SyntaxError,
    },

    #[error("recursive import detected: {0}")]
    Recursive(String),

    #[error("import '{0}' escapes the pages root")]
    Escapes(String),
}

/// Top-level error for a transpile invocation.
#[derive(Error, Debug)]
pub enum CssxError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("failed to read page: {0}")]
    Page(ImportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Non-fatal problems collected while emitting a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    UnboundVariable { name: String, span: Span },
    Import { path: String, span: Span, error: ImportError },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnboundVariable { name, span } => {
                write!(f, "{}: unbound variable --{}", span, name)
            }
            Diagnostic::Import { span, error, .. } => write!(f, "{}: {}", span, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_display() {
        assert_eq!(Span::new(3, 7).to_string(), "3:7");
        assert_eq!(Span::dummy().to_string(), "<unknown>");
    }

    #[test]
    fn syntax_error_mentions_position() {
        let err = SyntaxError::new("stray '}'", Span::new(2, 5));
        assert_eq!(err.to_string(), "stray '}' at 2:5");
    }

    #[test]
    fn diagnostic_display() {
        let diag = Diagnostic::UnboundVariable {
            name: "title".to_string(),
            span: Span::new(1, 4),
        };
        assert_eq!(diag.to_string(), "1:4: unbound variable --title");
    }
}
