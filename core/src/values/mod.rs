pub mod context;
pub mod function;
pub mod value;

pub use context::Context;
pub use function::{Function, FunctionError, HostFunction, NativeFn, UNKNOWN_ERROR};
pub use value::Value;
