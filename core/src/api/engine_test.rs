use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;
use crate::registry::Registry;
use crate::test_utils::init_test_logging;
use crate::values::{Context, FunctionError, HostFunction, Value};

fn sum(args: &[Value]) -> Result<Value, FunctionError> {
    Ok(Value::from(args.iter().map(Value::to_number).sum::<f64>()))
}

fn constant(value: f64) -> HostFunction {
    Arc::new(move |_: &[Value]| -> Result<Value, FunctionError> { Ok(Value::from(value)) })
}

#[test]
fn test_evaluate_simple() {
    init_test_logging();

    let engine = Engine::default();
    let context = Context::new().with("a", 2).with("b", "x");
    assert_eq!(engine.evaluate("2 + 3 * 4", &context).unwrap(), Value::from(14));
    assert_eq!(engine.evaluate("(2 + 3) * 4", &context).unwrap(), Value::from(20));
    assert_eq!(engine.evaluate("a + b", &context).unwrap(), Value::from("2x"));
    assert_eq!(engine.evaluate("@max(a, 7)", &context).unwrap(), Value::from(7));
}

#[test]
fn test_compile_once_evaluate_many() {
    let engine = Engine::default();
    let expr = engine.compile("a.b[0].c * factor").unwrap();

    let data = Value::object([(
        "b",
        Value::array([Value::object([("c", Value::from(42))])]),
    )]);
    let first = Context::new().with("a", data.clone()).with("factor", 1);
    let second = Context::new().with("a", data).with("factor", 2);

    assert_eq!(expr.evaluate(&first).unwrap(), Value::from(42));
    assert_eq!(expr.evaluate(&first).unwrap(), Value::from(42));
    assert_eq!(expr.evaluate(&second).unwrap(), Value::from(84));
    assert_eq!(expr.source(), "a.b[0].c * factor");
}

#[test]
fn test_register_and_call() {
    let engine = Engine::default();
    engine.register("sum", sum).unwrap();
    assert_eq!(
        engine.evaluate("@sum(1,2,3)", &Context::new()).unwrap(),
        Value::from(6)
    );
}

#[test]
fn test_reregistering_changes_compiled_expressions() {
    let engine = Engine::default();
    engine.register_function("k", constant(1.0)).unwrap();
    let expr = engine.compile("@k()").unwrap();
    assert_eq!(expr.evaluate_empty().unwrap(), Value::from(1));

    engine.register_function("k", constant(2.0)).unwrap();
    assert_eq!(expr.evaluate_empty().unwrap(), Value::from(2));
}

#[test]
fn test_register_invalid_name() {
    let engine = Engine::default();
    let err = engine.register("not-valid", sum).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidFunctionName);
    assert!(!engine.registry().contains("not-valid"));
}

#[test]
fn test_engines_can_share_a_registry() {
    let registry = Registry::new();
    let first = Engine::with_registry(EngineOptions::default(), registry.clone());
    let second = Engine::with_registry(EngineOptions::default(), registry);

    first.register("sum", sum).unwrap();
    assert_eq!(
        second.evaluate("@sum(2, 2)", &Context::new()).unwrap(),
        Value::from(4)
    );
    assert_eq!(
        second.evaluate("@abs(1)", &Context::new()).unwrap_err().code,
        ErrorCode::UndefinedFunction
    );
}

#[test]
fn test_blacklist_rejects_before_parsing() {
    let engine = Engine::default();
    let err = engine.evaluate("constructor", &Context::new()).unwrap_err();
    assert_eq!(err.code, ErrorCode::BlacklistedKeyword);
    assert_eq!(err.token.as_deref(), Some("constructor"));
    assert_eq!(err.expression.as_deref(), Some("constructor"));

    // Even text that would not parse is rejected by the blacklist first.
    let err = engine.evaluate("this ===", &Context::new()).unwrap_err();
    assert_eq!(err.code, ErrorCode::BlacklistedKeyword);
}

#[test]
fn test_configure_blacklist() {
    let mut engine = Engine::default();
    let context = Context::new().with("constructor", 1).with("secret", 2);

    engine.configure(EngineOptionsOverride::default().blacklist(Blacklist::empty()));
    assert_eq!(engine.evaluate("constructor", &context).unwrap(), Value::from(1));

    engine.configure(EngineOptionsOverride::default().blacklist(["secret"].into_iter().collect()));
    assert_eq!(
        engine.evaluate("secret", &context).unwrap_err().code,
        ErrorCode::BlacklistedKeyword
    );
    assert_eq!(engine.evaluate("constructor", &context).unwrap(), Value::from(1));
}

#[test]
fn test_cache() {
    let mut engine = Engine::default();
    let first = engine.compile("1 + 1").unwrap();
    let second = engine.compile("1 + 1").unwrap();
    assert!(std::ptr::eq(first.program(), second.program()));
    assert_eq!(engine.cached_programs(), 1);

    // Failed compilations are not cached.
    assert!(engine.compile("1 +").is_err());
    assert_eq!(engine.cached_programs(), 1);

    engine.configure(EngineOptionsOverride::default().blacklist(Blacklist::empty()));
    assert_eq!(engine.cached_programs(), 0);

    engine.compile("2").unwrap();
    engine.clear_cache();
    assert_eq!(engine.cached_programs(), 0);

    engine.configure(EngineOptionsOverride::default().cache_capacity(0));
    engine.compile("3").unwrap();
    assert_eq!(engine.cached_programs(), 0);
}

#[test]
fn test_compile_errors_carry_source() {
    let engine = Engine::default();

    let err = engine.compile("a.").unwrap_err();
    assert_eq!(err.code, ErrorCode::ExpectedPropertyName);
    assert_eq!(err.expression.as_deref(), Some("a."));

    let err = engine.compile("'open").unwrap_err();
    assert_eq!(err.code, ErrorCode::UnterminatedString);
    assert_eq!(err.snippet(), Some("'open"));

    assert_eq!(engine.compile("").unwrap_err().code, ErrorCode::EmptyExpression);
    assert_eq!(engine.compile("  \t").unwrap_err().code, ErrorCode::EmptyExpression);
}

#[test]
fn test_runtime_errors() {
    let engine = Engine::default();
    let context = Context::new().with("x", Value::Null).with("y", Value::object([("k", 1)]));

    let err = engine.evaluate("missingVar", &context).unwrap_err();
    assert_eq!(err.code, ErrorCode::UndefinedVariable);
    assert_eq!(err.snippet(), Some("missingVar"));

    assert_eq!(
        engine.evaluate("x.y", &context).unwrap_err().code,
        ErrorCode::NullPropertyAccess
    );
    assert_eq!(engine.evaluate("y.z", &context).unwrap(), Value::Undefined);
    assert_eq!(
        engine.evaluate("@nothing()", &context).unwrap_err().code,
        ErrorCode::UndefinedFunction
    );
    assert_eq!(
        engine.evaluate("-'a'", &context).unwrap_err().code,
        ErrorCode::InvalidUnaryOperand
    );
    assert_eq!(
        engine.evaluate("@sqrt('a')", &context).unwrap_err().code,
        ErrorCode::HostFunction
    );
}

#[test]
fn test_depth_limits() {
    let mut engine = Engine::default();
    engine.configure(EngineOptionsOverride::default().max_depth(16));

    let deep = format!("{}1{}", "(".repeat(40), ")".repeat(40));
    assert_eq!(
        engine.evaluate(&deep, &Context::new()).unwrap_err().code,
        ErrorCode::StackOverflow
    );

    let shallow = format!("{}1{}", "(".repeat(4), ")".repeat(4));
    assert_eq!(engine.evaluate(&shallow, &Context::new()).unwrap(), Value::from(1));

    // Whatever compiles under the limit also evaluates under it.
    let widest = format!("1{}", "+1".repeat(15));
    let compiled = engine.compile(&widest).unwrap();
    assert_eq!(compiled.program().height(), 16);
    assert_eq!(compiled.evaluate(&Context::new()).unwrap(), Value::from(16));

    let too_wide = format!("1{}", "+1".repeat(16));
    assert_eq!(
        engine.compile(&too_wide).unwrap_err().code,
        ErrorCode::StackOverflow
    );
}

#[test]
fn test_timeout() {
    let engine = Engine::new(EngineOptions {
        max_timeout_ms: 10,
        ..EngineOptions::default()
    });
    engine
        .register("slow", |_: &[Value]| -> Result<Value, FunctionError> {
            thread::sleep(Duration::from_millis(40));
            Ok(Value::from(1))
        })
        .unwrap();

    let err = engine.evaluate("@slow() + 1", &Context::new()).unwrap_err();
    assert_eq!(err.code, ErrorCode::EvaluationTimeout);

    // Disabled timeout.
    let expr = engine
        .create_expression("@slow() + 1")
        .configure(EngineOptionsOverride::default().max_timeout_ms(0))
        .compile()
        .unwrap();
    assert_eq!(expr.evaluate_empty().unwrap(), Value::from(2));
}

#[test]
fn test_reconfigure_does_not_affect_compiled() {
    let mut engine = Engine::default();
    let expr = engine.compile("1").unwrap();
    engine.configure(EngineOptionsOverride::default().max_timeout_ms(5));
    assert_eq!(expr.options().max_timeout_ms, 1000);
    assert_eq!(engine.options().max_timeout_ms, 5);
}

#[test]
fn test_builder_extensions() {
    let engine = Engine::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let expr = engine
        .create_expression("@twice(n) + @abs(-1)")
        .function("twice", move |args: &[Value]| -> Result<Value, FunctionError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::from(args[0].to_number() * 2.0))
        })
        .compile()
        .unwrap();

    assert_eq!(
        expr.evaluate(&Context::new().with("n", 4)).unwrap(),
        Value::from(9)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Extensions stay local to the session.
    assert!(!engine.registry().contains("twice"));
    assert_eq!(
        engine.evaluate("@twice(1)", &Context::new()).unwrap_err().code,
        ErrorCode::UndefinedFunction
    );
}

#[test]
fn test_strict_mode_rejects_shadowing() {
    let engine = Engine::default();
    let err = engine
        .create_expression("@abs(-1)")
        .extend([("abs", constant(0.0))])
        .compile()
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StrictModeViolation);
    assert_eq!(err.token.as_deref(), Some("abs"));
    assert_eq!(err.expression.as_deref(), Some("@abs(-1)"));
}

#[test]
fn test_strict_mode_rejects_blacklisted_names() {
    let engine = Engine::default();
    let err = engine
        .create_expression("1")
        .extend([("eval", constant(0.0))])
        .compile()
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StrictModeViolation);
}

#[test]
fn test_non_strict_allows_shadowing() {
    let engine = Engine::default();
    let value = engine
        .create_expression("@abs(-1)")
        .configure(EngineOptionsOverride::default().strict_mode(false))
        .extend([("abs", constant(0.0))])
        .evaluate(&Context::new())
        .unwrap();
    assert_eq!(value, Value::from(0));

    // The shared registry is untouched.
    assert_eq!(engine.evaluate("@abs(-1)", &Context::new()).unwrap(), Value::from(1));
}

#[test]
fn test_invalid_extension_name_in_any_mode() {
    let engine = Engine::default();
    for strict in [true, false] {
        let err = engine
            .create_expression("1")
            .configure(EngineOptionsOverride::default().strict_mode(strict))
            .extend([("9lives", constant(0.0))])
            .compile()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFunctionName);
    }
}

#[test]
fn test_builder_options_are_local() {
    let engine = Engine::default();
    let value = engine
        .create_expression("constructor")
        .configure(EngineOptionsOverride::default().blacklist(Blacklist::empty()))
        .evaluate(&Context::new().with("constructor", true))
        .unwrap();
    assert_eq!(value, Value::Bool(true));
    assert!(engine.compile("constructor").is_err());
}

#[test]
fn test_concurrent_evaluation() {
    let engine = Engine::default();
    engine.register("sum", sum).unwrap();
    let expr = engine.compile("@sum(x, x) * 2").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let expr = expr.clone();
            thread::spawn(move || {
                (0..50)
                    .map(|_| expr.evaluate(&Context::new().with("x", i)).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let results = handle.join().unwrap();
        assert!(results.iter().all(|v| *v == Value::from(i * 4)));
    }
}
