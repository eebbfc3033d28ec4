use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;
use crate::lexer::tokenize;
use crate::parser::{Span, parse};
use crate::registry::Registry;
use crate::test_utils::init_test_logging;
use crate::values::FunctionError;

fn run_with(
    source: &str,
    context: &Context,
    registry: &Registry,
    options: EvaluatorOptions,
) -> Result<Value, ExecutionError> {
    let tokens = tokenize(source).unwrap();
    let program = parse(&tokens).unwrap();
    eval_with_options(&program, context, registry, options)
}

fn run(source: &str, context: &Context) -> Result<Value, ExecutionError> {
    run_with(
        source,
        context,
        &Registry::with_stdlib(),
        EvaluatorOptions::default(),
    )
}

fn ok(source: &str) -> Value {
    run(source, &sample_context()).unwrap()
}

fn err(source: &str) -> ExecutionError {
    run(source, &sample_context()).unwrap_err()
}

fn sample_context() -> Context {
    Context::new()
        .with("a", 5)
        .with("b", 3)
        .with("name", "chart")
        .with("empty", "")
        .with("nothing", Value::Null)
        .with("items", vec![10, 20, 30])
        .with(
            "user",
            Value::object([
                ("name", Value::from("Ada")),
                ("tags", Value::array(["x", "y"])),
                ("profile", Value::object([("age", Value::from(36))])),
            ]),
        )
}

#[test]
fn test_arithmetic() {
    init_test_logging();

    assert_eq!(ok("1 + 2 * 3"), Value::from(7));
    assert_eq!(ok("(1 + 2) * 3"), Value::from(9));
    assert_eq!(ok("a - b"), Value::from(2));
    assert_eq!(ok("a % b"), Value::from(2));
    assert_eq!(ok("a / 2"), Value::from(2.5));
    assert_eq!(ok("-a + 1"), Value::from(-4));
    assert_eq!(ok("1 / 0"), Value::Number(f64::INFINITY));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(ok("name + '-' + a"), Value::from("chart-5"));
    assert_eq!(ok("'n=' + nothing"), Value::from("n=null"));
    assert_eq!(ok("items + ''"), Value::from("10,20,30"));
}

#[test]
fn test_comparisons() {
    assert_eq!(ok("a > b"), Value::Bool(true));
    assert_eq!(ok("a >= 5 && b <= 3"), Value::Bool(true));
    assert_eq!(ok("a == 5"), Value::Bool(true));
    assert_eq!(ok("a === '5'"), Value::Bool(false));
    assert_eq!(ok("a != '5'"), Value::Bool(true));
    assert_eq!(ok("name == 'chart'"), Value::Bool(true));
    assert_eq!(ok("nothing == null"), Value::Bool(true));
}

#[test]
fn test_logical_operators_return_deciding_operand() {
    assert_eq!(ok("a && name"), Value::from("chart"));
    assert_eq!(ok("empty || 'fallback'"), Value::from("fallback"));
    assert_eq!(ok("nothing && a"), Value::Null);
    assert_eq!(ok("a || b"), Value::from(5));
    assert_eq!(ok("!empty"), Value::Bool(true));
    assert_eq!(ok("!!name"), Value::Bool(true));
}

#[test]
fn test_short_circuit_skips_right_operand() {
    let registry = Registry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    registry.register("boom", move |_: &[Value]| -> Result<Value, FunctionError> {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(FunctionError::new("boom"))
    });

    let context = Context::new();
    let options = EvaluatorOptions::default();
    for source in ["false && @boom()", "true || @boom()", "true ? 1 : @boom()"] {
        let result = run_with(source, &context, &registry, options).unwrap();
        assert!(!result.is_undefined(), "{source}");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert!(run_with("true && @boom()", &context, &registry, options).is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_conditional() {
    assert_eq!(ok("a > b ? 'big' : 'small'"), Value::from("big"));
    assert_eq!(ok("empty ? 1 : 2"), Value::from(2));
    assert_eq!(
        ok("a > 10 ? 'A' : a > 4 ? 'B' : 'C'"),
        Value::from("B")
    );
}

#[test]
fn test_member_access() {
    assert_eq!(ok("user.name"), Value::from("Ada"));
    assert_eq!(ok("user['name']"), Value::from("Ada"));
    assert_eq!(ok("user.profile.age + 1"), Value::from(37));
    assert_eq!(ok("user.tags[1]"), Value::from("y"));
    assert_eq!(ok("items[0] + items[2]"), Value::from(40));
    assert_eq!(ok("items.length"), Value::from(3));
    assert_eq!(ok("name.length"), Value::from(5));
    assert_eq!(ok("name[0]"), Value::from("c"));
}

#[test]
fn test_missing_members_are_undefined() {
    assert_eq!(ok("user.missing"), Value::Undefined);
    assert_eq!(ok("items[9]"), Value::Undefined);
    assert_eq!(ok("a.b"), Value::Undefined);
    assert_eq!(ok("user.missing === null"), Value::Bool(false));
}

#[test]
fn test_root_reference() {
    assert_eq!(ok("$.a + $['b']"), Value::from(8));
    assert_eq!(ok("$.user.name"), Value::from("Ada"));
    assert_eq!(ok("$.missing"), Value::Undefined);
}

#[test]
fn test_literals() {
    assert_eq!(ok("true"), Value::Bool(true));
    assert_eq!(ok("null"), Value::Null);
    assert_eq!(ok("'it\\'s'"), Value::from("it's"));
    assert_eq!(ok("\"a\\\"b\""), Value::from("a\"b"));
    assert_eq!(ok("-2.5"), Value::from(-2.5));
}

#[test]
fn test_stdlib_calls() {
    assert_eq!(ok("@abs(-3)"), Value::from(3));
    assert_eq!(ok("@max(a, b, 9)"), Value::from(9));
    assert_eq!(ok("@round(@sqrt(a * a + 1))"), Value::from(5));
}

#[test]
fn test_undefined_variable() {
    let error = err("a + missing");
    assert_eq!(
        error.kind,
        ExecutionErrorKind::Runtime(RuntimeError::UndefinedVariable {
            name: "missing".to_string()
        })
    );
    assert_eq!(error.span, Span(4..11));
}

#[test]
fn test_undefined_function() {
    let error = err("@nope(1)");
    assert_eq!(
        error.kind,
        ExecutionErrorKind::Runtime(RuntimeError::UndefinedFunction {
            name: "nope".to_string()
        })
    );
    assert_eq!(error.to_string(), "Undefined function '@nope' at 0..8");
}

#[test]
fn test_undefined_function_skips_arguments() {
    // The callee is resolved before any argument is evaluated.
    let error = err("@nope(missing)");
    assert!(matches!(
        error.kind,
        ExecutionErrorKind::Runtime(RuntimeError::UndefinedFunction { .. })
    ));
}

#[test]
fn test_null_property_access() {
    let error = err("nothing.value");
    assert_eq!(
        error.kind,
        ExecutionErrorKind::Runtime(RuntimeError::NullPropertyAccess {
            property: "value".to_string(),
            base: "null",
        })
    );

    let error = err("user.missing[0]");
    assert_eq!(
        error.kind,
        ExecutionErrorKind::Runtime(RuntimeError::NullPropertyAccess {
            property: "0".to_string(),
            base: "undefined",
        })
    );
}

#[test]
fn test_negating_non_number() {
    let error = err("-name");
    assert_eq!(
        error.kind,
        ExecutionErrorKind::Runtime(RuntimeError::InvalidUnaryOperand {
            op: "-",
            found: "string",
        })
    );
}

#[test]
fn test_host_function_errors() {
    let registry = Registry::new();
    registry.register("fail", |_: &[Value]| -> Result<Value, FunctionError> {
        Err(FunctionError::new("bad input"))
    });
    registry.register("silent", |_: &[Value]| -> Result<Value, FunctionError> {
        Err(FunctionError::new(""))
    });
    registry.register("panics", |_: &[Value]| -> Result<Value, FunctionError> {
        panic!("host bug")
    });

    let context = Context::new();
    let options = EvaluatorOptions::default();
    let message = |source: &str| match run_with(source, &context, &registry, options)
        .unwrap_err()
        .kind
    {
        ExecutionErrorKind::Runtime(RuntimeError::HostFunction { message, .. }) => message,
        other => panic!("unexpected error: {other:?}"),
    };

    assert_eq!(message("@fail()"), "bad input");
    assert_eq!(message("@silent()"), "unknown error");
    assert_eq!(message("@panics()"), "unknown error");
}

#[test]
fn test_arguments_are_passed_in_order() {
    let registry = Registry::new();
    registry.register("join", |args: &[Value]| -> Result<Value, FunctionError> {
        let parts: Vec<String> = args.iter().map(|v| v.to_string()).collect();
        Ok(Value::from(parts.join("|")))
    });

    let context = Context::new().with("x", 2);
    let result = run_with(
        "@join(x, 'b', x * 2, null)",
        &context,
        &registry,
        EvaluatorOptions::default(),
    )
    .unwrap();
    assert_eq!(result, Value::from("2|b|4|null"));
}

#[test]
fn test_functions_resolved_at_call_time() {
    let registry = Registry::new();
    let tokens = tokenize("@late(1)").unwrap();
    let program = parse(&tokens).unwrap();
    let context = Context::new();

    assert!(eval(&program, &context, &registry).is_err());

    registry.register("late", |args: &[Value]| -> Result<Value, FunctionError> {
        Ok(args[0].clone())
    });
    assert_eq!(eval(&program, &context, &registry).unwrap(), Value::from(1));
}

#[test]
fn test_stack_overflow() {
    let options = EvaluatorOptions {
        max_depth: 4,
        timeout: None,
    };
    let context = Context::new();
    let registry = Registry::new();

    assert_eq!(
        run_with("1 + 2", &context, &registry, options).unwrap(),
        Value::from(3)
    );

    let error = run_with("-(-(-(-(1))))", &context, &registry, options).unwrap_err();
    assert_eq!(
        error.kind,
        ExecutionErrorKind::ResourceExceeded(ResourceExceededError::StackOverflow {
            depth: 4,
            max_depth: 4,
        })
    );
}

#[test]
fn test_timeout_after_slow_host_function() {
    let registry = Registry::new();
    registry.register("slow", |_: &[Value]| -> Result<Value, FunctionError> {
        std::thread::sleep(Duration::from_millis(30));
        Ok(Value::Null)
    });

    let options = EvaluatorOptions {
        max_depth: 64,
        timeout: Some(Duration::from_millis(5)),
    };
    let error = run_with("@slow()", &Context::new(), &registry, options).unwrap_err();
    assert_eq!(
        error.kind,
        ExecutionErrorKind::ResourceExceeded(ResourceExceededError::Timeout { limit_ms: 5 })
    );
}

#[test]
fn test_generous_timeout_does_not_fire() {
    let options = EvaluatorOptions {
        max_depth: 64,
        timeout: Some(Duration::from_secs(5)),
    };
    let result = run_with("1 + 2 * 3", &Context::new(), &Registry::new(), options).unwrap();
    assert_eq!(result, Value::from(7));
}

#[test]
fn test_postfix_unary_is_unsupported() {
    use crate::parser::{Expr, Literal, Node, Program, UnaryOp};

    // The parser only builds prefix operators, so build the tree by hand.
    let program = Program {
        root: Node::new(
            Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(Node::new(Expr::Literal(Literal::Bool(true)), Span(0..4))),
                prefix: false,
            },
            Span(0..5),
        ),
    };
    let error = eval(&program, &Context::new(), &Registry::new()).unwrap_err();
    assert_eq!(
        error.kind,
        ExecutionErrorKind::Runtime(RuntimeError::UnsupportedOperator {
            op: "postfix !".to_string()
        })
    );
    assert_eq!(error.span, Span(0..5));
}
