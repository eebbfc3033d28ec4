//! Compiled Safeval expressions.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{EngineOptions, Error, ErrorCode};
use crate::evaluator;
use crate::parser::Program;
use crate::registry::ScopedFunctions;
use crate::values::{Context, Value};

/// A parsed expression ready for execution.
///
/// The program is immutable and shared, so a compiled expression is cheap to
/// clone and can be evaluated any number of times, from any number of
/// threads, against different contexts.
///
/// Function calls are resolved when they are evaluated: session extensions
/// first, then the engine's registry as it is at that moment.
///
/// # Example
///
/// ```
/// use safeval_core::{Context, Engine, Value};
///
/// let engine = Engine::default();
/// let expr = engine.compile("price * qty").unwrap();
///
/// let context = Context::new().with("price", 2.5).with("qty", 4);
/// assert_eq!(expr.evaluate(&context).unwrap(), Value::from(10));
/// assert_eq!(expr.evaluate(&context).unwrap(), Value::from(10));
/// ```
#[derive(Clone)]
pub struct CompiledExpression {
    program: Arc<Program>,
    source: Arc<str>,
    functions: ScopedFunctions,
    options: EngineOptions,
}

static_assertions::assert_impl_all!(CompiledExpression: Send, Sync);

impl CompiledExpression {
    /// This is called internally by `Engine::compile()` and `ExpressionBuilder::compile()`.
    pub(crate) fn new(
        program: Arc<Program>,
        source: &str,
        functions: ScopedFunctions,
        options: EngineOptions,
    ) -> Self {
        Self {
            program,
            source: Arc::from(source),
            functions,
            options,
        }
    }

    /// Evaluate against `context`.
    pub fn evaluate(&self, context: &Context) -> Result<Value, Error> {
        debug!(source = %self.source, variables = context.len(), "evaluating expression");
        evaluator::eval_with_options(
            &self.program,
            context,
            &self.functions,
            self.options.evaluator_options(),
        )
        .map_err(|e| {
            let error = Error::from(e).with_expression(&self.source);
            if error.code == ErrorCode::EvaluationTimeout {
                warn!(source = %self.source, "evaluation timed out");
            }
            error
        })
    }

    /// Evaluate against an empty context.
    pub fn evaluate_empty(&self) -> Result<Value, Error> {
        self.evaluate(&Context::new())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// The options this expression was compiled with.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}

impl fmt::Debug for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledExpression")
            .field("source", &self.source)
            .field("extensions", &self.functions.extensions.len())
            .finish()
    }
}
