//! Core evaluation logic.

use std::borrow::Cow;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{
    evaluator::{
        EvaluatorOptions, ExecutionError, ExecutionErrorKind,
        ResourceExceededError::*,
        RuntimeError::{self, *},
        operators,
    },
    parser::{BoolOp, Expr, Literal, Node, Program, UnaryOp},
    registry::FunctionLookup,
    values::{Context, FunctionError, UNKNOWN_ERROR, Value},
};

/// Evaluator for parsed expressions.
///
/// Values read from the context are borrowed for as long as possible and only
/// cloned when they become part of a computed result.
pub struct Evaluator<'a> {
    options: EvaluatorOptions,
    context: &'a Context,
    functions: &'a dyn FunctionLookup,
    deadline: Option<Instant>,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    /// Create a new evaluator with the given options.
    pub fn new(
        options: EvaluatorOptions,
        context: &'a Context,
        functions: &'a dyn FunctionLookup,
    ) -> Self {
        Self {
            options,
            context,
            functions,
            deadline: None,
            depth: 0,
        }
    }

    /// Evaluate a program. The timeout, if any, starts now.
    pub fn eval(&mut self, program: &Program) -> Result<Value, ExecutionError> {
        self.deadline = self.options.timeout.map(|timeout| Instant::now() + timeout);
        self.depth = 0;
        let result = self.eval_node(&program.root).map(Cow::into_owned);
        if let Err(error) = &result {
            debug!(%error, "evaluation failed");
        }
        result
    }

    fn error<T>(&self, node: &Node, kind: impl Into<ExecutionErrorKind>) -> Result<T, ExecutionError> {
        Err(ExecutionError::new(kind, node.span.clone()))
    }

    fn check_deadline(&self, node: &Node) -> Result<(), ExecutionError> {
        let (Some(deadline), Some(timeout)) = (self.deadline, self.options.timeout) else {
            return Ok(());
        };
        if Instant::now() >= deadline {
            return self.error(
                node,
                Timeout {
                    limit_ms: timeout.as_millis(),
                },
            );
        }
        Ok(())
    }

    /// Evaluate an expression node.
    fn eval_node(&mut self, node: &Node) -> Result<Cow<'a, Value>, ExecutionError> {
        // Check depth before recursing
        if self.depth >= self.options.max_depth {
            return self.error(
                node,
                StackOverflow {
                    depth: self.depth,
                    max_depth: self.options.max_depth,
                },
            );
        }
        self.check_deadline(node)?;

        self.depth += 1;
        let result = self.eval_node_inner(node);
        self.depth -= 1;

        result
    }

    /// Inner evaluation logic (no depth tracking).
    fn eval_node_inner(&mut self, node: &Node) -> Result<Cow<'a, Value>, ExecutionError> {
        match &node.expr {
            Expr::Literal(literal) => Ok(Cow::Owned(match literal {
                Literal::Number(n) => Value::Number(*n),
                Literal::Str(s) => Value::String(s.clone()),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Null => Value::Null,
            })),

            Expr::Ident(name) => match self.context.get(name) {
                Some(value) => Ok(Cow::Borrowed(value)),
                None => self.error(node, UndefinedVariable { name: name.clone() }),
            },

            Expr::Root => Ok(Cow::Borrowed(self.context.as_value())),

            Expr::Member {
                object,
                property,
                computed,
            } => {
                let base = self.eval_node(object)?;
                if base.is_nullish() {
                    return self.error(
                        node,
                        NullPropertyAccess {
                            property: property_label(property),
                            base: base.type_name(),
                        },
                    );
                }

                let key = match (&property.expr, *computed) {
                    (Expr::Ident(name), false) => Value::String(name.clone()),
                    _ => self.eval_node(property)?.into_owned(),
                };

                let value = match base {
                    Cow::Borrowed(base) => base.member(&key),
                    Cow::Owned(base) => {
                        let member = base.member(&key).into_owned();
                        Cow::Owned(member)
                    }
                };
                Ok(value)
            }

            Expr::Call { callee, args } => {
                let Some(function) = self.functions.resolve(callee) else {
                    return self.error(
                        node,
                        UndefinedFunction {
                            name: callee.clone(),
                        },
                    );
                };

                let mut values: SmallVec<[Value; 4]> = SmallVec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_node(arg)?.into_owned());
                }

                trace!(function = %callee, argc = values.len(), "calling host function");
                let outcome = catch_unwind(AssertUnwindSafe(|| function.call(&values)))
                    .unwrap_or_else(|_| Err(FunctionError::unknown()));
                // A slow host function is only detected once it returns.
                self.check_deadline(node)?;

                match outcome {
                    Ok(value) => Ok(Cow::Owned(value)),
                    Err(error) => self.error(node, host_function_error(callee, error)),
                }
            }

            Expr::Binary { op, left, right } => {
                let left_val = self.eval_node(left)?;
                let right_val = self.eval_node(right)?;
                Ok(Cow::Owned(operators::eval_binary(*op, &left_val, &right_val)))
            }

            Expr::Boolean { op, left, right } => {
                let left_val = self.eval_node(left)?;

                // Short-circuit: the deciding operand is the result.
                match op {
                    BoolOp::And if !left_val.is_truthy() => Ok(left_val),
                    BoolOp::Or if left_val.is_truthy() => Ok(left_val),
                    _ => self.eval_node(right),
                }
            }

            Expr::Comparison { op, left, right } => {
                let left_val = self.eval_node(left)?;
                let right_val = self.eval_node(right)?;
                Ok(Cow::Owned(Value::Bool(operators::eval_comparison(
                    *op, &left_val, &right_val,
                ))))
            }

            Expr::Unary { op, expr, prefix } => {
                if !prefix {
                    return self.error(
                        node,
                        UnsupportedOperator {
                            op: format!("postfix {}", op.as_str()),
                        },
                    );
                }

                let operand = self.eval_node(expr)?;
                match op {
                    UnaryOp::Not => Ok(Cow::Owned(Value::Bool(!operand.is_truthy()))),
                    UnaryOp::Neg => match operand.as_number() {
                        Some(n) => Ok(Cow::Owned(Value::Number(-n))),
                        None => self.error(
                            node,
                            InvalidUnaryOperand {
                                op: op.as_str(),
                                found: operand.type_name(),
                            },
                        ),
                    },
                }
            }

            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                // Only the selected branch is evaluated.
                if self.eval_node(test)?.is_truthy() {
                    self.eval_node(consequent)
                } else {
                    self.eval_node(alternate)
                }
            }
        }
    }
}

/// Describe a member property for error messages without evaluating it.
fn property_label(property: &Node) -> String {
    match &property.expr {
        Expr::Ident(name) => name.clone(),
        Expr::Literal(Literal::Str(s)) => s.clone(),
        Expr::Literal(Literal::Number(n)) => Value::Number(*n).to_string(),
        other => format!("<{}>", other.kind_name()),
    }
}

fn host_function_error(name: &str, error: FunctionError) -> RuntimeError {
    let message = match error.message() {
        "" => UNKNOWN_ERROR.to_string(),
        message => message.to_string(),
    };
    HostFunction {
        name: name.to_string(),
        message,
    }
}
