//! Shared helpers for the integration tests.
//!
//! `test_case!` declares one test that evaluates `input` on a fresh default
//! engine and checks either the resulting value or the error code.

#![allow(dead_code, unused_macros)]

use safeval::{Context, Engine, Value};

macro_rules! test_case {
    (
        name: $name:ident,
        input: $input:expr,
        $(context: $context:expr,)?
        value: $value:expr $(,)?
    ) => {
        #[test]
        fn $name() {
            let context: safeval::Context = test_case!(@context $($context)?);
            let result = $crate::cases::evaluate($input, &context);
            pretty_assertions::assert_eq!(result, Ok(safeval::Value::from($value)));
        }
    };
    (
        name: $name:ident,
        input: $input:expr,
        $(context: $context:expr,)?
        error: $code:ident $(,)?
    ) => {
        #[test]
        fn $name() {
            let context: safeval::Context = test_case!(@context $($context)?);
            let result = $crate::cases::evaluate($input, &context);
            pretty_assertions::assert_eq!(result, Err(safeval::ErrorCode::$code));
        }
    };
    (@context) => {
        safeval::Context::new()
    };
    (@context $context:expr) => {
        $context
    };
}

/// Evaluate on an isolated engine, keeping only the error code.
pub fn evaluate(source: &str, context: &Context) -> Result<Value, safeval::ErrorCode> {
    engine().evaluate(source, context).map_err(|e| e.code)
}

/// A default engine with a few extra functions used across the tests.
pub fn engine() -> Engine {
    let engine = Engine::default();
    engine.register("sum", sum).expect("valid name");
    engine
        .register("boom", |_: &[Value]| -> Result<Value, safeval::FunctionError> {
            Err(safeval::FunctionError::new("boom() must never be called"))
        })
        .expect("valid name");
    engine
}

pub fn sum(args: &[Value]) -> Result<Value, safeval::FunctionError> {
    Ok(Value::from(args.iter().map(Value::to_number).sum::<f64>()))
}

/// The nested data most member-access tests read from.
pub fn orders() -> Context {
    Context::new()
        .with(
            "a",
            Value::object([(
                "b",
                Value::array([Value::object([("c", Value::from(42))])]),
            )]),
        )
        .with(
            "order",
            Value::object([
                ("id", Value::from("A-17")),
                ("total", Value::from(120.5)),
                ("lines", Value::array([1, 2, 3])),
                ("customer", Value::Null),
            ]),
        )
}
