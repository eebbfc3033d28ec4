use core::fmt;

use thiserror::Error;

use crate::parser::Span;

/// Lexer error with the span of the offending input.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

/// Specific kinds of lexical errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexErrorKind {
    #[error("Unterminated string literal")]
    UnterminatedString,

    #[error("Unexpected character '{ch}' near \"{context}\"")]
    UnexpectedCharacter { ch: char, context: String },

    #[error("Unknown operator '{op}'")]
    UnknownOperator { op: String },
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.span)
    }
}

impl std::error::Error for LexError {}
