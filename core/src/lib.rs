//! Core of the Safeval expression language.
//!
//! Source text flows one way through the pipeline:
//!
//! ```text
//! &str --lexer--> Vec<Token> --parser--> Program --evaluator--> Value
//! ```
//!
//! The [`api`] module wraps the pipeline with policy (blacklist, strict mode),
//! soft timeouts and a compiled-program cache.

pub mod api;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod stdlib;
pub mod values;

pub use api::{
    Blacklist, CompiledExpression, Engine, EngineOptions, EngineOptionsOverride, Error,
    ErrorCode, ExpressionBuilder,
};
pub use registry::Registry;
pub use values::{Context, FunctionError, Value};
