//! Math Package
//!
//! Functions: abs, ceil, floor, round, sqrt, pow, max, min
//!
//! All arguments must be numbers. `round` rounds halves up, so `round(-2.5)`
//! is `-2`. `max` and `min` take any number of arguments.

use crate::registry::Registry;
use crate::values::{FunctionError, NativeFn, Value};

// ============================================================================
// Argument helpers
// ============================================================================

fn expect_arity(name: &str, args: &[Value], expected: usize) -> Result<(), FunctionError> {
    if args.len() != expected {
        return Err(FunctionError::arity(name, expected, args.len()));
    }
    Ok(())
}

fn number_arg(name: &str, args: &[Value], index: usize) -> Result<f64, FunctionError> {
    match &args[index] {
        Value::Number(n) => Ok(*n),
        other => Err(FunctionError::argument_type(name, index, "number", other)),
    }
}

fn unary(name: &str, args: &[Value], op: fn(f64) -> f64) -> Result<Value, FunctionError> {
    expect_arity(name, args, 1)?;
    Ok(Value::Number(op(number_arg(name, args, 0)?)))
}

fn numbers(name: &str, args: &[Value]) -> Result<Vec<f64>, FunctionError> {
    (0..args.len()).map(|i| number_arg(name, args, i)).collect()
}

// ============================================================================
// Basic Operations
// ============================================================================

/// Absolute value
fn math_abs(args: &[Value]) -> Result<Value, FunctionError> {
    unary("abs", args, f64::abs)
}

/// Square root (NaN for negative input)
fn math_sqrt(args: &[Value]) -> Result<Value, FunctionError> {
    unary("sqrt", args, f64::sqrt)
}

/// Power function - base^exp
fn math_pow(args: &[Value]) -> Result<Value, FunctionError> {
    expect_arity("pow", args, 2)?;
    let base = number_arg("pow", args, 0)?;
    let exp = number_arg("pow", args, 1)?;
    Ok(Value::Number(base.powf(exp)))
}

// ============================================================================
// Rounding Functions
// ============================================================================

/// Floor function - largest integer <= x
fn math_floor(args: &[Value]) -> Result<Value, FunctionError> {
    unary("floor", args, f64::floor)
}

/// Ceiling function - smallest integer >= x
fn math_ceil(args: &[Value]) -> Result<Value, FunctionError> {
    unary("ceil", args, f64::ceil)
}

/// Round half up
fn math_round(args: &[Value]) -> Result<Value, FunctionError> {
    unary("round", args, |x| {
        if x.is_finite() { (x + 0.5).floor() } else { x }
    })
}

// ============================================================================
// Aggregates
// ============================================================================

/// Largest argument; `-Infinity` when called without arguments.
fn math_max(args: &[Value]) -> Result<Value, FunctionError> {
    let values = numbers("max", args)?;
    let result = values.into_iter().fold(f64::NEG_INFINITY, |acc, x| {
        if acc.is_nan() || x.is_nan() { f64::NAN } else { acc.max(x) }
    });
    Ok(Value::Number(result))
}

/// Smallest argument; `Infinity` when called without arguments.
fn math_min(args: &[Value]) -> Result<Value, FunctionError> {
    let values = numbers("min", args)?;
    let result = values.into_iter().fold(f64::INFINITY, |acc, x| {
        if acc.is_nan() || x.is_nan() { f64::NAN } else { acc.min(x) }
    });
    Ok(Value::Number(result))
}

const FUNCTIONS: [(&str, NativeFn); 8] = [
    ("abs", math_abs),
    ("ceil", math_ceil),
    ("floor", math_floor),
    ("round", math_round),
    ("sqrt", math_sqrt),
    ("pow", math_pow),
    ("max", math_max),
    ("min", math_min),
];

/// Register the math functions into `registry`, replacing same-named entries.
pub fn register_math(registry: &Registry) {
    for (name, function) in FUNCTIONS {
        registry.register(name, function);
    }
}
