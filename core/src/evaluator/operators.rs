//! Binary and comparison operator implementations.

use crate::parser::{BinaryOp, ComparisonOp};
use crate::values::Value;

/// Evaluate an arithmetic operator.
///
/// `+` adds when both sides are numbers and otherwise concatenates the
/// string forms of both sides. The other operators coerce to numbers and
/// follow IEEE 754 (division by zero gives a signed infinity).
pub(super) fn eval_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Value::Number(l + r),
            _ => Value::String(format!("{}{}", left, right)),
        },
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        // Sign follows the dividend.
        BinaryOp::Rem => Value::Number(left.to_number() % right.to_number()),
    }
}

/// Evaluate a comparison.
///
/// Equality is strict. Ordering compares two strings lexicographically and
/// anything else numerically; comparisons involving `NaN` are false.
pub(super) fn eval_comparison(op: ComparisonOp, left: &Value, right: &Value) -> bool {
    let ordering = match op {
        ComparisonOp::Eq => return left.strict_eq(right),
        ComparisonOp::Neq => return !left.strict_eq(right),
        _ => match (left, right) {
            (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
            _ => left.to_number().partial_cmp(&right.to_number()),
        },
    };

    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        ComparisonOp::Lt => ordering.is_lt(),
        ComparisonOp::Gt => ordering.is_gt(),
        ComparisonOp::Le => ordering.is_le(),
        ComparisonOp::Ge => ordering.is_ge(),
        ComparisonOp::Eq | ComparisonOp::Neq => unreachable!("handled above"),
    }
}
