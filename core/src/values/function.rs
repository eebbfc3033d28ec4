//! Host functions callable from expressions as `@name(...)`.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::Value;

/// Message used when a host function fails without saying why.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Trait for functions the host exposes to expressions.
///
/// Functions receive their arguments already evaluated, left to right.
/// Arity and argument types are the function's own business: report
/// mismatches by returning a [`FunctionError`].
///
/// Any `Fn(&[Value]) -> Result<Value, FunctionError>` closure that is
/// `Send + Sync` implements this trait.
pub trait Function: Send + Sync {
    fn call(&self, args: &[Value]) -> Result<Value, FunctionError>;
}

impl<F> Function for F
where
    F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync,
{
    fn call(&self, args: &[Value]) -> Result<Value, FunctionError> {
        self(args)
    }
}

/// Shared handle to a registered function.
pub type HostFunction = Arc<dyn Function>;

/// Type alias for plain function pointers, as used by the standard library.
pub type NativeFn = fn(&[Value]) -> Result<Value, FunctionError>;

/// Error raised by a host function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FunctionError {
    message: String,
}

impl FunctionError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            Self::unknown()
        } else {
            Self { message }
        }
    }

    pub fn unknown() -> Self {
        Self {
            message: UNKNOWN_ERROR.to_string(),
        }
    }

    /// Arity mismatch helper.
    pub fn arity(function: &str, expected: impl fmt::Display, found: usize) -> Self {
        Self::new(format!(
            "{}() expects {} argument(s), got {}",
            function, expected, found
        ))
    }

    /// Argument type mismatch helper.
    pub fn argument_type(function: &str, index: usize, expected: &str, found: &Value) -> Self {
        Self::new(format!(
            "{}() argument {} must be a {}, got {}",
            function,
            index + 1,
            expected,
            found.type_name()
        ))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for FunctionError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for FunctionError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
