//! The Safeval evaluation engine.

use std::sync::Arc;

use tracing::{debug, warn};

use super::cache::ProgramCache;
use super::{CompiledExpression, EngineOptions, EngineOptionsOverride, Error, ExpressionBuilder};
use crate::lexer::{is_function_name, tokenize};
use crate::parser::{Program, parse_with_max_depth};
use crate::registry::{Registry, ScopedFunctions};
use crate::values::{Context, FunctionError, HostFunction, Value};

/// The Safeval compilation and execution engine.
///
/// The engine manages:
/// - Function registry (shared with every expression it compiles)
/// - Policy and limits (EngineOptions)
/// - Cache of parsed programs
///
/// # Example
///
/// ```
/// use safeval_core::{Context, Engine, FunctionError, Value};
///
/// let engine = Engine::default();
/// engine
///     .register("sum", |args: &[Value]| -> Result<Value, FunctionError> {
///         Ok(Value::from(args.iter().map(Value::to_number).sum::<f64>()))
///     })
///     .unwrap();
///
/// let result = engine.evaluate("@sum(1, 2, x)", &Context::new().with("x", 3)).unwrap();
/// assert_eq!(result, Value::from(6));
/// ```
pub struct Engine {
    options: EngineOptions,
    registry: Registry,
    cache: Arc<ProgramCache>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Engine {
    /// Create an engine whose registry holds the standard math functions.
    pub fn new(options: EngineOptions) -> Self {
        Self::with_registry(options, Registry::with_stdlib())
    }

    /// Create an engine around an existing registry, which stays shared.
    pub fn with_registry(options: EngineOptions, registry: Registry) -> Self {
        Self {
            options,
            registry,
            cache: Arc::default(),
        }
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Access the function registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Update the fields of the options that `overrides` sets.
    ///
    /// Already compiled expressions keep the options they were compiled with.
    pub fn configure(&mut self, overrides: EngineOptionsOverride) {
        let options = self.options.override_with(&overrides);
        if options.blacklist != self.options.blacklist
            || options.cache_capacity < self.options.cache_capacity
        {
            self.cache.clear();
        }
        debug!(?options, "engine reconfigured");
        self.options = options;
    }

    /// Register a function, replacing any function with the same name.
    pub fn register<F>(&self, name: &str, function: F) -> Result<(), Error>
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        self.register_function(name, Arc::new(function))
    }

    pub fn register_function(&self, name: &str, function: HostFunction) -> Result<(), Error> {
        if !is_function_name(name) {
            return Err(Error::invalid_function_name(name));
        }
        self.registry.register_function(name, function);
        Ok(())
    }

    /// Parse an expression once for repeated evaluation.
    pub fn compile(&self, source: &str) -> Result<CompiledExpression, Error> {
        let program = compile_program(source, &self.options, &self.cache)?;
        Ok(CompiledExpression::new(
            program,
            source,
            ScopedFunctions::new(self.registry.clone(), Default::default()),
            self.options.clone(),
        ))
    }

    /// Compile and evaluate in one step.
    pub fn evaluate(&self, source: &str, context: &Context) -> Result<Value, Error> {
        self.compile(source)?.evaluate(context)
    }

    /// Start a session for one expression with its own options and functions.
    pub fn create_expression(&self, source: &str) -> ExpressionBuilder {
        ExpressionBuilder::new(
            source,
            self.registry.clone(),
            self.options.clone(),
            self.cache.clone(),
        )
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of parsed programs currently cached.
    pub fn cached_programs(&self) -> usize {
        self.cache.len()
    }
}

/// Check policy, then tokenize and parse `source`, going through the cache.
pub(super) fn compile_program(
    source: &str,
    options: &EngineOptions,
    cache: &ProgramCache,
) -> Result<Arc<Program>, Error> {
    // Runs before the cache so a changed blacklist applies immediately.
    if let Some((word, span)) = options.blacklist.find_in(source) {
        warn!(word, "expression rejected by blacklist");
        return Err(Error::blacklisted(word, span).with_expression(source));
    }

    if let Some(program) = cache.get(source, options.max_depth) {
        debug!(source, "program cache hit");
        return Ok(program);
    }

    let tokens = tokenize(source).map_err(|e| Error::from(e).with_expression(source))?;
    let program = parse_with_max_depth(&tokens, options.max_depth)
        .map_err(|e| Error::from(e).with_expression(source))?;
    debug!(source, tokens = tokens.len(), nodes = program.node_count(), "compiled expression");

    let program = Arc::new(program);
    cache.insert(source, options.max_depth, program.clone(), options.cache_capacity);
    Ok(program)
}
