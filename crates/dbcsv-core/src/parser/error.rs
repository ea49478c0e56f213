//! Parser error types.

use crate::lexer::{Span, Token, TokenKind};

/// A syntax error with a human-readable diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub span: Span,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The offending source fragment, empty at end of input.
    pub found: Option<String>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            expected: None,
            found: None,
        }
    }

    /// Creates an "unexpected token" error quoting the offending fragment.
    #[must_use]
    pub fn unexpected(expected: impl Into<String>, found: &Token, source: &str) -> Self {
        let expected_str: String = expected.into();
        let fragment = found.span.slice(source).to_string();
        let message = match &found.kind {
            TokenKind::Eof => format!("Unexpected end of input: expected {expected_str}"),
            TokenKind::Error(reason) => {
                format!("{reason} near '{fragment}': expected {expected_str}")
            }
            kind => format!(
                "Unexpected {} '{fragment}': expected {expected_str}",
                kind.describe()
            ),
        };
        Self {
            message,
            span: found.span,
            expected: Some(expected_str),
            found: Some(fragment),
        }
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} at position {}..{}",
            self.message, self.span.start, self.span.end
        )
    }
}

impl std::error::Error for ParseError {}
