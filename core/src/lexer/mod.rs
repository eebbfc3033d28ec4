mod error;
pub mod lexer;
mod token;

pub use error::{LexError, LexErrorKind};
pub use lexer::{Lexer, is_function_name, tokenize};
pub use token::{Token, TokenKind};
