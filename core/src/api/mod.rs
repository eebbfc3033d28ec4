//! Public API for the Safeval expression language.
//!
//! An [`Engine`] owns the policy ([`EngineOptions`]), a shared function
//! [`Registry`](crate::Registry) and a cache of parsed programs. Expressions
//! are compiled once into a [`CompiledExpression`] and evaluated any number
//! of times against different contexts.
//!
//! # Example
//!
//! ```
//! use safeval_core::api::{Engine, EngineOptions, ErrorCode};
//! use safeval_core::{Context, Value};
//!
//! let engine = Engine::new(EngineOptions::default());
//!
//! let expr = engine.compile("score >= 90 ? 'A' : score >= 80 ? 'B' : 'C'").unwrap();
//! let grade = expr.evaluate(&Context::new().with("score", 85)).unwrap();
//! assert_eq!(grade, Value::from("B"));
//!
//! let err = engine.evaluate("constructor", &Context::new()).unwrap_err();
//! assert_eq!(err.code, ErrorCode::BlacklistedKeyword);
//! ```

pub mod blacklist;
pub mod builder;
mod cache;
pub mod engine;
pub mod error;
pub mod expression;
pub mod options;

#[cfg(test)]
mod engine_test;

pub use blacklist::{Blacklist, DEFAULT_BLACKLIST};
pub use builder::ExpressionBuilder;
pub use engine::Engine;
pub use error::{Diagnostic, Error, ErrorCategory, ErrorCode, Severity};
pub use expression::CompiledExpression;
pub use options::{EngineOptions, EngineOptionsOverride};
