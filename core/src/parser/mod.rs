pub mod error;
mod parsed_expr;
pub mod parser;
mod syntax;

pub use error::{ParseError, ParseErrorKind};
pub use parsed_expr::{Expr, Literal, Node, Program};
pub use parser::{DEFAULT_MAX_DEPTH, parse, parse_with_max_depth};
pub use syntax::{BinaryOp, BoolOp, ComparisonOp, InfixOp, Span, UnaryOp, precedence};
