//! Runtime evaluation errors.
//!
//! # Error Categories
//!
//! - **Runtime errors**: failures caused by the expression or its data, such
//!   as an unbound variable, a member read through `null`, or a host function
//!   reporting an error.
//!
//! - **Resource exceeded errors**: the evaluation ran out of its budget
//!   (nesting depth or time). Any partial result is discarded.

use core::fmt;

use thiserror::Error;

use crate::parser::Span;

/// Runtime evaluation error, located at the node that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionError {
    pub kind: ExecutionErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionErrorKind {
    Runtime(RuntimeError),
    ResourceExceeded(ResourceExceededError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("Undefined function '@{name}'")]
    UndefinedFunction { name: String },

    #[error("Cannot read property '{property}' of {base}")]
    NullPropertyAccess {
        property: String,
        base: &'static str,
    },

    #[error("Operator '{op}' expects a number, got {found}")]
    InvalidUnaryOperand { op: &'static str, found: &'static str },

    #[error("Unsupported operator '{op}'")]
    UnsupportedOperator { op: String },

    /// A host function returned an error or panicked.
    #[error("Function '@{name}' failed: {message}")]
    HostFunction { name: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceExceededError {
    #[error("Evaluation stack overflow: depth {depth} exceeds maximum of {max_depth}")]
    StackOverflow { depth: usize, max_depth: usize },

    #[error("Evaluation exceeded the time limit of {limit_ms} ms")]
    Timeout { limit_ms: u128 },
}

impl ExecutionError {
    pub fn new(kind: impl Into<ExecutionErrorKind>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            span,
        }
    }
}

impl fmt::Display for ExecutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionErrorKind::Runtime(e) => write!(f, "{}", e),
            ExecutionErrorKind::ResourceExceeded(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.span)
    }
}

// Convenient conversions for error construction
impl From<RuntimeError> for ExecutionErrorKind {
    fn from(e: RuntimeError) -> Self {
        ExecutionErrorKind::Runtime(e)
    }
}

impl From<ResourceExceededError> for ExecutionErrorKind {
    fn from(e: ResourceExceededError) -> Self {
        ExecutionErrorKind::ResourceExceeded(e)
    }
}

impl std::error::Error for ExecutionError {}
