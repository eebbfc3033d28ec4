//! Safeval - a sandboxed expression language for untrusted formulas
//!
//! # Overview
//!
//! Safeval evaluates one small expression (arithmetic, comparisons, logic,
//! conditionals, member access and calls to registered functions) against a
//! caller-supplied context. Expressions never reach host state the caller
//! did not hand them. Common use cases include:
//!
//! - Chart and dashboard formulas
//! - Conditional formatting rules
//! - Derived fields computed from trusted data
//!
//! # Quick Start
//!
//! ```
//! use safeval::{Context, Value};
//!
//! let context = Context::new().with("score", 85);
//! let grade = safeval::evaluate("score >= 90 ? 'A' : score >= 80 ? 'B' : 'C'", &context).unwrap();
//! assert_eq!(grade, Value::from("B"));
//! ```
//!
//! # Engines
//!
//! The free functions in this crate use a process-wide default [`Engine`].
//! Create engines directly to isolate options and registered functions:
//!
//! ```
//! use safeval::{Context, Engine, EngineOptions, FunctionError, Value};
//!
//! let engine = Engine::new(EngineOptions::default());
//! engine
//!     .register("clamp", |args: &[Value]| -> Result<Value, FunctionError> {
//!         let [x, lo, hi] = args else {
//!             return Err(FunctionError::arity("clamp", 3, args.len()));
//!         };
//!         Ok(Value::from(x.to_number().clamp(lo.to_number(), hi.to_number())))
//!     })
//!     .unwrap();
//!
//! let expr = engine.compile("@clamp(x, 0, 10)").unwrap();
//! assert_eq!(expr.evaluate(&Context::new().with("x", 12)).unwrap(), Value::from(10));
//! ```

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

// Re-export public API from safeval_core
pub use safeval_core::api::{
    Blacklist, CompiledExpression, DEFAULT_BLACKLIST, Diagnostic, Engine, EngineOptions,
    EngineOptionsOverride, Error, ErrorCategory, ErrorCode, ExpressionBuilder, Severity,
};

// Re-export commonly used types and values
pub use safeval_core::registry::{FunctionLookup, Registry};
pub use safeval_core::values::{self, Context, Function, FunctionError, HostFunction, NativeFn, Value};

mod error_renderer;
pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};

static DEFAULT_ENGINE: Lazy<RwLock<Engine>> = Lazy::new(|| RwLock::new(Engine::default()));

/// Tokenize, parse and evaluate `source` with the default engine.
pub fn evaluate(source: &str, context: &Context) -> Result<Value, Error> {
    // The lock is released before evaluation so host functions may use the
    // default engine themselves.
    let expr = compile(source)?;
    expr.evaluate(context)
}

/// Parse `source` once with the default engine.
pub fn compile(source: &str) -> Result<CompiledExpression, Error> {
    DEFAULT_ENGINE.read().compile(source)
}

/// Register a function with the default engine's registry.
pub fn register<F>(name: &str, function: F) -> Result<(), Error>
where
    F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
{
    DEFAULT_ENGINE.read().register(name, function)
}

/// Update the default engine's options.
pub fn configure(overrides: EngineOptionsOverride) {
    debug!(?overrides, "configuring default engine");
    DEFAULT_ENGINE.write().configure(overrides);
}

/// Start an expression session on the default engine.
pub fn create_expression(source: &str) -> ExpressionBuilder {
    DEFAULT_ENGINE.read().create_expression(source)
}

/// Snapshot of the default engine's current options.
pub fn options() -> EngineOptions {
    DEFAULT_ENGINE.read().options().clone()
}
