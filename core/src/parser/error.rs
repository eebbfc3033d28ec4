use core::fmt;

use thiserror::Error;

use crate::lexer::Token;
use crate::parser::Span;

/// Parser error with the position of the offending token.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// Text of the offending token, when there is one.
    pub token: Option<String>,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    #[error("Expression is empty")]
    EmptyExpression,

    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput { expected: String },

    #[error("Unexpected token, expected {expected}")]
    UnexpectedToken { expected: String },

    #[error("Expected property name after '.'")]
    ExpectedPropertyName,

    #[error("Expected ']' to close computed member access")]
    ExpectedClosingBracket,

    #[error("Expected '(' after function name")]
    ExpectedOpeningParenthesis,

    #[error("Expected ')'")]
    ExpectedClosingParenthesis,

    #[error("Expected ',' between function arguments")]
    ExpectedCommaBetweenArguments,

    #[error("Expected ':' in conditional expression")]
    ExpectedColonInConditional,

    #[error("Invalid number literal")]
    InvalidNumber,

    #[error("Expression nesting depth exceeds maximum of {max_depth} levels")]
    MaxDepthExceeded { max_depth: usize },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            token: None,
        }
    }

    pub fn at_token(kind: ParseErrorKind, token: &Token) -> Self {
        Self {
            kind,
            span: token.span.clone(),
            token: Some(token.text.clone()),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(token) = &self.token {
            write!(f, " (found '{}')", token)?;
        }
        write!(f, " at {}", self.span)
    }
}

impl std::error::Error for ParseError {}
