use std::collections::BTreeMap;

use super::Value;

/// Variable bindings for one evaluation.
///
/// The evaluator only reads from a context. The bindings are held as a
/// single object value so that `$` can refer to all of them at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    root: Value,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            root: Value::Object(BTreeMap::new()),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        match &mut self.root {
            Value::Object(bindings) => bindings.insert(name.into(), value.into()),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.root.as_object().and_then(|bindings| bindings.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.root.as_object().map_or(0, |bindings| bindings.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.root
            .as_object()
            .into_iter()
            .flat_map(|bindings| bindings.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// All bindings as one object value.
    pub fn as_value(&self) -> &Value {
        &self.root
    }
}

impl<K, V> FromIterator<(K, V)> for Context
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            root: Value::object(iter),
        }
    }
}

impl From<BTreeMap<String, Value>> for Context {
    fn from(bindings: BTreeMap<String, Value>) -> Self {
        Self {
            root: Value::Object(bindings),
        }
    }
}

impl TryFrom<Value> for Context {
    type Error = Value;

    /// Only objects can serve as a context; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(bindings) => Ok(Self::from(bindings)),
            other => Err(other),
        }
    }
}
