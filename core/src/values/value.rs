//! Runtime values.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A dynamically-typed value.
///
/// `Undefined` is the absent marker produced by reading a missing key; it
/// never comes from a literal. Equality is strict: values of different
/// variants are never equal and `NaN` is not equal to itself.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn object<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn array<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// `null` or absent.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Falsy values are `false`, `0`, `NaN`, `""`, `null` and absent.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Strict, non-coercing equality.
    pub fn strict_eq(&self, other: &Value) -> bool {
        self == other
    }

    /// Numeric coercion used by arithmetic and relational operators.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(true) => 1.0,
            Value::Bool(false) | Value::Null => 0.0,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    parse_numeric(trimmed)
                }
            }
            Value::Undefined | Value::Array(_) | Value::Object(_) => f64::NAN,
        }
    }

    /// Read `key` from this value.
    ///
    /// Objects are keyed by the string form of `key`. Arrays and strings take
    /// integral indexes and expose `length`. Everything else, and any missing
    /// key, yields `Undefined`. Callers reject `null` bases before this.
    pub fn member(&self, key: &Value) -> Cow<'_, Value> {
        match self {
            Value::Object(entries) => {
                let found = match key {
                    Value::String(name) => entries.get(name.as_str()),
                    other => entries.get(other.to_string().as_str()),
                };
                found.map_or(Cow::Owned(Value::Undefined), Cow::Borrowed)
            }
            Value::Array(items) => {
                if is_length(key) {
                    return Cow::Owned(Value::Number(items.len() as f64));
                }
                index_of(key)
                    .and_then(|i| items.get(i))
                    .map_or(Cow::Owned(Value::Undefined), Cow::Borrowed)
            }
            Value::String(s) => {
                if is_length(key) {
                    return Cow::Owned(Value::Number(s.chars().count() as f64));
                }
                let ch = index_of(key).and_then(|i| s.chars().nth(i));
                Cow::Owned(ch.map_or(Value::Undefined, |c| Value::String(c.to_string())))
            }
            _ => Cow::Owned(Value::Undefined),
        }
    }
}

/// Decimal text or `Infinity`, with an optional sign. `f64::from_str` also
/// takes `inf` and `nan`, which are not numbers here.
fn parse_numeric(text: &str) -> f64 {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    if unsigned.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    text.parse().unwrap_or(f64::NAN)
}

fn is_length(key: &Value) -> bool {
    key.as_str() == Some("length")
}

/// Non-negative integral index, from a number or a canonical decimal string.
fn index_of(key: &Value) -> Option<usize> {
    match key {
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n <= usize::MAX as f64 => {
            Some(*n as usize)
        }
        Value::String(s) => {
            let canonical = s == "0" || (!s.starts_with('0') && !s.starts_with('+'));
            if canonical { s.parse().ok() } else { None }
        }
        _ => None,
    }
}

/// Formats a number the way it reads in source: `3` rather than `3.0`.
pub(crate) fn format_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        // Covers -0 as well.
        f.write_str("0")
    } else {
        write!(f, "{}", n)
    }
}

/// The string form used by `+` concatenation.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => format_number(*n, f),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    // Nullish elements print as empty.
                    if !item.is_nullish() {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Value::Object(entries)
    }
}
