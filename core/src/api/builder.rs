//! Per-expression sessions.

use std::sync::Arc;

use hashbrown::HashMap;
use tracing::{debug, warn};

use super::{CompiledExpression, EngineOptions, EngineOptionsOverride, Error, engine};
use crate::api::cache::ProgramCache;
use crate::lexer::is_function_name;
use crate::registry::{Registry, ScopedFunctions};
use crate::values::{Context, FunctionError, HostFunction, Value};

/// Builds one expression with its own options and session-local functions.
///
/// Extensions are resolved before the engine's registry and are only visible
/// to expressions compiled from this builder. In strict mode an extension may
/// not shadow a registered function or use a blacklisted name.
///
/// # Example
///
/// ```
/// use safeval_core::{Context, Engine, EngineOptionsOverride, FunctionError, Value};
///
/// let engine = Engine::default();
/// let value = engine
///     .create_expression("@double(x)")
///     .configure(EngineOptionsOverride::default().max_timeout_ms(50))
///     .function("double", |args: &[Value]| -> Result<Value, FunctionError> {
///         Ok(Value::from(args[0].to_number() * 2.0))
///     })
///     .evaluate(&Context::new().with("x", 21))
///     .unwrap();
/// assert_eq!(value, Value::from(42));
/// ```
pub struct ExpressionBuilder {
    source: String,
    registry: Registry,
    options: EngineOptions,
    extensions: HashMap<String, HostFunction>,
    cache: Arc<ProgramCache>,
}

impl ExpressionBuilder {
    pub(crate) fn new(
        source: &str,
        registry: Registry,
        options: EngineOptions,
        cache: Arc<ProgramCache>,
    ) -> Self {
        Self {
            source: source.to_string(),
            registry,
            options,
            extensions: HashMap::new(),
            cache,
        }
    }

    /// Override options for this expression only.
    pub fn configure(mut self, overrides: EngineOptionsOverride) -> Self {
        self.options = self.options.override_with(&overrides);
        self
    }

    /// Add session-local functions. Later entries replace earlier ones.
    pub fn extend<I, N>(mut self, functions: I) -> Self
    where
        I: IntoIterator<Item = (N, HostFunction)>,
        N: Into<String>,
    {
        self.extensions
            .extend(functions.into_iter().map(|(name, f)| (name.into(), f)));
        self
    }

    /// Add one session-local function.
    pub fn function<F>(self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        let function: HostFunction = Arc::new(function);
        self.extend([(name.into(), function)])
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Validate the extensions and parse the expression.
    pub fn compile(&self) -> Result<CompiledExpression, Error> {
        self.check_extensions()
            .map_err(|e| e.with_expression(&self.source))?;
        let program = engine::compile_program(&self.source, &self.options, &self.cache)?;
        let functions = ScopedFunctions::new(self.registry.clone(), self.extensions.clone());
        Ok(CompiledExpression::new(
            program,
            &self.source,
            functions,
            self.options.clone(),
        ))
    }

    /// Compile and evaluate in one step.
    pub fn evaluate(&self, context: &Context) -> Result<Value, Error> {
        self.compile()?.evaluate(context)
    }

    fn check_extensions(&self) -> Result<(), Error> {
        let mut names: Vec<&str> = self.extensions.keys().map(String::as_str).collect();
        names.sort_unstable();

        for name in names {
            if !is_function_name(name) {
                return Err(Error::invalid_function_name(name));
            }
            if !self.options.strict_mode {
                continue;
            }
            if self.options.blacklist.contains(name) {
                warn!(name, "strict mode rejected blacklisted extension");
                return Err(Error::strict_mode(name, "the name is blacklisted"));
            }
            if self.registry.contains(name) {
                warn!(name, "strict mode rejected shadowing extension");
                return Err(Error::strict_mode(
                    name,
                    "a function with this name is already registered",
                ));
            }
        }
        debug!(count = self.extensions.len(), "extensions accepted");
        Ok(())
    }
}
