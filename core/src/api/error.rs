//! Public error types for the Safeval API.
//!
//! Every stage (lexer, parser, policy checks, evaluator) has its own internal
//! error type. They are all converted to [`Error`] at API boundaries, so
//! callers only ever match on one type and one closed set of [`ErrorCode`]s.

use core::fmt;

use crate::evaluator::{
    ExecutionError, ExecutionErrorKind, ResourceExceededError, RuntimeError,
};
use crate::lexer::{LexError, LexErrorKind};
use crate::parser::{ParseError, ParseErrorKind, Span};

/// Every way an expression can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Lexical
    UnterminatedString,
    UnexpectedCharacter,
    UnknownOperator,

    // Syntactic
    UnexpectedEndOfInput,
    UnexpectedToken,
    ExpectedPropertyName,
    ExpectedClosingBracket,
    ExpectedOpeningParenthesis,
    ExpectedClosingParenthesis,
    ExpectedCommaBetweenArguments,
    ExpectedColonInConditional,
    InvalidNumber,

    // Runtime
    UndefinedVariable,
    UndefinedFunction,
    NullPropertyAccess,
    InvalidUnaryOperand,
    UnsupportedOperator,
    /// A registered function returned an error or panicked.
    HostFunction,

    // Policy and limits
    BlacklistedKeyword,
    EvaluationTimeout,
    EmptyExpression,
    StackOverflow,
    InvalidFunctionName,
    StrictModeViolation,
}

/// Pipeline stage an [`ErrorCode`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Runtime,
    Policy,
}

impl ErrorCode {
    /// Short stable identifier, used in diagnostics.
    pub fn code(self) -> &'static str {
        use ErrorCode::*;
        match self {
            UnterminatedString => "L001",
            UnexpectedCharacter => "L002",
            UnknownOperator => "L003",
            UnexpectedEndOfInput => "P001",
            UnexpectedToken => "P002",
            ExpectedPropertyName => "P003",
            ExpectedClosingBracket => "P004",
            ExpectedOpeningParenthesis => "P005",
            ExpectedClosingParenthesis => "P006",
            ExpectedCommaBetweenArguments => "P007",
            ExpectedColonInConditional => "P008",
            InvalidNumber => "P009",
            UndefinedVariable => "E001",
            UndefinedFunction => "E002",
            NullPropertyAccess => "E003",
            InvalidUnaryOperand => "E004",
            UnsupportedOperator => "E005",
            HostFunction => "E006",
            BlacklistedKeyword => "S001",
            EvaluationTimeout => "S002",
            EmptyExpression => "S003",
            StackOverflow => "S004",
            InvalidFunctionName => "S005",
            StrictModeViolation => "S006",
        }
    }

    pub fn category(self) -> ErrorCategory {
        match self.code().as_bytes().first() {
            Some(b'L') => ErrorCategory::Lexical,
            Some(b'P') => ErrorCategory::Syntax,
            Some(b'E') => ErrorCategory::Runtime,
            _ => ErrorCategory::Policy,
        }
    }

    fn help(self) -> Option<&'static str> {
        use ErrorCode::*;
        let help = match self {
            UnterminatedString => "close the string with the same quote it was opened with",
            UnknownOperator => "use `===`/`==` for equality, `&&` and `||` for logic",
            ExpectedCommaBetweenArguments => "separate function arguments with `,`",
            ExpectedColonInConditional => "a conditional needs both branches: `test ? a : b`",
            UndefinedFunction => "register the function before evaluating the expression",
            NullPropertyAccess => "check the value for null before reading its members",
            BlacklistedKeyword => "remove the identifier or adjust the configured blacklist",
            EvaluationTimeout => "simplify the expression or raise `max_timeout_ms`",
            StackOverflow => "reduce the nesting of the expression or raise `max_depth`",
            StrictModeViolation => "disable strict mode to allow shadowing registered functions",
            _ => return None,
        };
        Some(help)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug output is the variant name.
        write!(f, "{:?}", self)
    }
}

/// Public error type for all Safeval operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    /// Byte range in the expression source, when the error has a location.
    pub span: Option<Span>,
    /// Text of the offending token, when there is one.
    pub token: Option<String>,
    /// The expression source the error refers to.
    pub expression: Option<String>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            span: None,
            token: None,
            expression: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Attach the expression source unless one is already attached.
    pub fn with_expression(mut self, source: &str) -> Self {
        if self.expression.is_none() {
            self.expression = Some(source.to_string());
        }
        self
    }

    pub(crate) fn blacklisted(word: &str, span: Span) -> Self {
        Error::new(
            ErrorCode::BlacklistedKeyword,
            format!("Use of blacklisted keyword '{}'", word),
        )
        .with_span(span)
        .with_token(word)
    }

    pub(crate) fn invalid_function_name(name: &str) -> Self {
        Error::new(
            ErrorCode::InvalidFunctionName,
            format!("Invalid function name '{}'", name),
        )
        .with_token(name)
    }

    pub(crate) fn strict_mode(name: &str, reason: &str) -> Self {
        Error::new(
            ErrorCode::StrictModeViolation,
            format!("Cannot extend with function '{}': {}", name, reason),
        )
        .with_token(name)
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Text of the source covered by the error span, if both are known.
    pub fn snippet(&self) -> Option<&str> {
        let span = self.span.as_ref()?;
        Some(span.str_of(self.expression.as_deref()?))
    }

    /// Convert to a diagnostic for rendering or IDE integration.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            message: self.message.clone(),
            span: self.span.clone().unwrap_or(Span(0..0)),
            help: self.code.help().map(str::to_string),
            code: Some(self.code.code().to_string()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(token) = &self.token {
            write!(f, " (found '{}')", token)?;
        }
        if let Some(span) = &self.span {
            write!(f, " at {}", span)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// A diagnostic message with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the issue. Errors without a location use `0..0`.
    pub span: Span,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Error code (e.g., "P003") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

// ============================================================================
// Conversion from internal errors
// ============================================================================

impl From<LexError> for Error {
    fn from(err: LexError) -> Self {
        let (code, token) = match &err.kind {
            LexErrorKind::UnterminatedString => (ErrorCode::UnterminatedString, None),
            LexErrorKind::UnexpectedCharacter { ch, .. } => {
                (ErrorCode::UnexpectedCharacter, Some(ch.to_string()))
            }
            LexErrorKind::UnknownOperator { op } => (ErrorCode::UnknownOperator, Some(op.clone())),
        };
        Error {
            code,
            message: err.kind.to_string(),
            span: Some(err.span),
            token,
            expression: None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        use ParseErrorKind::*;
        let code = match &err.kind {
            EmptyExpression => ErrorCode::EmptyExpression,
            UnexpectedEndOfInput { .. } => ErrorCode::UnexpectedEndOfInput,
            UnexpectedToken { .. } => ErrorCode::UnexpectedToken,
            ExpectedPropertyName => ErrorCode::ExpectedPropertyName,
            ExpectedClosingBracket => ErrorCode::ExpectedClosingBracket,
            ExpectedOpeningParenthesis => ErrorCode::ExpectedOpeningParenthesis,
            ExpectedClosingParenthesis => ErrorCode::ExpectedClosingParenthesis,
            ExpectedCommaBetweenArguments => ErrorCode::ExpectedCommaBetweenArguments,
            ExpectedColonInConditional => ErrorCode::ExpectedColonInConditional,
            InvalidNumber => ErrorCode::InvalidNumber,
            MaxDepthExceeded { .. } => ErrorCode::StackOverflow,
        };
        Error {
            code,
            message: err.kind.to_string(),
            span: Some(err.span),
            token: err.token,
            expression: None,
        }
    }
}

impl From<ExecutionError> for Error {
    fn from(err: ExecutionError) -> Self {
        let (code, token) = match &err.kind {
            ExecutionErrorKind::Runtime(runtime) => match runtime {
                RuntimeError::UndefinedVariable { name } => {
                    (ErrorCode::UndefinedVariable, Some(name.clone()))
                }
                RuntimeError::UndefinedFunction { name } => {
                    (ErrorCode::UndefinedFunction, Some(format!("@{}", name)))
                }
                RuntimeError::NullPropertyAccess { property, .. } => {
                    (ErrorCode::NullPropertyAccess, Some(property.clone()))
                }
                RuntimeError::InvalidUnaryOperand { op, .. } => {
                    (ErrorCode::InvalidUnaryOperand, Some(op.to_string()))
                }
                RuntimeError::UnsupportedOperator { op } => {
                    (ErrorCode::UnsupportedOperator, Some(op.clone()))
                }
                RuntimeError::HostFunction { name, .. } => {
                    (ErrorCode::HostFunction, Some(format!("@{}", name)))
                }
            },
            ExecutionErrorKind::ResourceExceeded(resource) => match resource {
                ResourceExceededError::StackOverflow { .. } => (ErrorCode::StackOverflow, None),
                ResourceExceededError::Timeout { .. } => (ErrorCode::EvaluationTimeout, None),
            },
        };
        Error {
            code,
            message: err.kind.to_string(),
            span: Some(err.span),
            token,
            expression: None,
        }
    }
}
