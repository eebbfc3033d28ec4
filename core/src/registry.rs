//! Named host functions available to `@name(...)` calls.
//!
//! A [`Registry`] is a cheap, cloneable handle: clones share the same table,
//! so functions registered through one handle are visible through all of
//! them, including to programs compiled earlier. Use [`Registry::snapshot`]
//! for an independent copy.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::stdlib;
use crate::values::{FunctionError, HostFunction, Value};

/// Looks up a function by name at call time.
pub trait FunctionLookup {
    fn resolve(&self, name: &str) -> Option<HostFunction>;
}

#[derive(Clone, Default)]
pub struct Registry {
    functions: Arc<RwLock<HashMap<String, HostFunction>>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with the standard math functions.
    pub fn with_stdlib() -> Self {
        let registry = Self::new();
        stdlib::register_stdlib(&registry);
        registry
    }

    /// Insert or replace `name`.
    pub fn register<F>(&self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        self.register_function(name, Arc::new(function));
    }

    /// Insert or replace `name` with an already shared function.
    pub fn register_function(&self, name: impl Into<String>, function: HostFunction) {
        let name = name.into();
        debug!(name = %name, "registering function");
        self.functions.write().insert(name, function);
    }

    /// Register many functions at once.
    pub fn extend<I, N>(&self, functions: I)
    where
        I: IntoIterator<Item = (N, HostFunction)>,
        N: Into<String>,
    {
        let mut table = self.functions.write();
        for (name, function) in functions {
            table.insert(name.into(), function);
        }
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.functions.write().remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An independent copy of the current table.
    pub fn snapshot(&self) -> Registry {
        let table = self.functions.read().clone();
        Registry {
            functions: Arc::new(RwLock::new(table)),
        }
    }

    /// Whether both handles share one table.
    pub fn ptr_eq(&self, other: &Registry) -> bool {
        Arc::ptr_eq(&self.functions, &other.functions)
    }
}

impl FunctionLookup for Registry {
    fn resolve(&self, name: &str) -> Option<HostFunction> {
        // Clone the handle out so the lock is not held while the function runs.
        let function = self.functions.read().get(name).cloned();
        trace!(name, found = function.is_some(), "resolving function");
        function
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("functions", &self.names())
            .finish()
    }
}

/// Session-local functions layered over a shared registry.
#[derive(Clone, Default)]
pub struct ScopedFunctions {
    pub registry: Registry,
    pub extensions: Arc<HashMap<String, HostFunction>>,
}

impl ScopedFunctions {
    pub fn new(registry: Registry, extensions: HashMap<String, HostFunction>) -> Self {
        Self {
            registry,
            extensions: Arc::new(extensions),
        }
    }
}

impl FunctionLookup for ScopedFunctions {
    fn resolve(&self, name: &str) -> Option<HostFunction> {
        match self.extensions.get(name) {
            Some(function) => Some(function.clone()),
            None => self.registry.resolve(name),
        }
    }
}
