//! Tree-walking evaluator for parsed expressions.
//!
//! The evaluator interprets a [`Program`] against a [`Context`] and produces a
//! [`Value`]. Function calls are resolved by name through a [`FunctionLookup`]
//! at the moment they are evaluated, so functions registered after an
//! expression was compiled are still visible to it.
//!
//! ## Design Principles
//!
//! - **Never panic**: adversarial inputs produce errors, and a panicking host
//!   function is reported as a failed call.
//! - **Stack-safe**: depth tracking bounds recursion on deeply nested trees.
//! - **Bounded**: an optional deadline is checked before every node and after
//!   every host call.
//!
//! ## Example
//!
//! ```
//! use safeval_core::{Context, Registry, Value, evaluator, lexer, parser};
//!
//! let program = parser::parse(&lexer::tokenize("a + 1").unwrap()).unwrap();
//! let context = Context::new().with("a", 41);
//! let result = evaluator::eval(&program, &context, &Registry::new()).unwrap();
//! assert_eq!(result, Value::from(42));
//! ```

mod error;
mod eval;
mod operators;

#[cfg(test)]
mod eval_test;

use std::time::Duration;

pub use error::{ExecutionError, ExecutionErrorKind, ResourceExceededError, RuntimeError};
pub use eval::Evaluator;

use crate::parser::{DEFAULT_MAX_DEPTH, Program};
use crate::registry::FunctionLookup;
use crate::values::{Context, Value};

/// Limits applied to a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Maximum nesting depth of nodes being evaluated at once.
    pub max_depth: usize,
    /// Wall-clock budget for the whole evaluation. `None` means unlimited.
    pub timeout: Option<Duration>,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            timeout: None,
        }
    }
}

/// Evaluate a program with default limits (no timeout).
pub fn eval(
    program: &Program,
    context: &Context,
    functions: &dyn FunctionLookup,
) -> Result<Value, ExecutionError> {
    eval_with_options(program, context, functions, EvaluatorOptions::default())
}

/// Evaluate a program with explicit limits.
pub fn eval_with_options(
    program: &Program,
    context: &Context,
    functions: &dyn FunctionLookup,
    options: EvaluatorOptions,
) -> Result<Value, ExecutionError> {
    Evaluator::new(options, context, functions).eval(program)
}
