// Common syntax structures shared by tokens, the parsed tree and errors.

use core::fmt;
use core::ops::Range;

use serde::Serialize;

/// Byte range of a construct in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }
    pub fn at(pos: usize) -> Self {
        Self(pos..pos)
    }
    pub fn combine(a: &Span, b: &Span) -> Span {
        Span::new(a.0.start, b.0.end)
    }
    pub fn start(&self) -> usize {
        self.0.start
    }
    pub fn end(&self) -> usize {
        self.0.end
    }
    pub fn str_of<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.0.start..self.0.end).unwrap_or("")
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.0.start, self.0.end)
    }
}

/// Precedence tiers, lowest to highest.
pub mod precedence {
    pub const TERNARY: u8 = 1;
    pub const OR: u8 = 2;
    pub const AND: u8 = 3;
    pub const EQUALITY: u8 = 4;
    pub const RELATIONAL: u8 = 5;
    pub const ADDITIVE: u8 = 6;
    pub const MULTIPLICATIVE: u8 = 7;
    pub const UNARY: u8 = 8;
    pub const MEMBER: u8 = 9;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => precedence::ADDITIVE,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => precedence::MULTIPLICATIVE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

/// Short-circuiting logical operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn precedence(self) -> u8 {
        match self {
            BoolOp::And => precedence::AND,
            BoolOp::Or => precedence::OR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoolOp::And => "&&",
            BoolOp::Or => "||",
        }
    }
}

/// Equality is strict: `==` and `===` both parse to `Eq`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl ComparisonOp {
    pub fn precedence(self) -> u8 {
        match self {
            ComparisonOp::Eq | ComparisonOp::Neq => precedence::EQUALITY,
            _ => precedence::RELATIONAL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "===",
            ComparisonOp::Neq => "!==",
            ComparisonOp::Lt => "<",
            ComparisonOp::Gt => ">",
            ComparisonOp::Le => "<=",
            ComparisonOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Any operator that can appear between two operands.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InfixOp {
    Binary(BinaryOp),
    Bool(BoolOp),
    Comparison(ComparisonOp),
}

impl InfixOp {
    /// Maps operator token text to an infix operator.
    pub fn from_text(text: &str) -> Option<Self> {
        let op = match text {
            "+" => InfixOp::Binary(BinaryOp::Add),
            "-" => InfixOp::Binary(BinaryOp::Sub),
            "*" => InfixOp::Binary(BinaryOp::Mul),
            "/" => InfixOp::Binary(BinaryOp::Div),
            "%" => InfixOp::Binary(BinaryOp::Rem),
            "&&" => InfixOp::Bool(BoolOp::And),
            "||" => InfixOp::Bool(BoolOp::Or),
            "===" | "==" => InfixOp::Comparison(ComparisonOp::Eq),
            "!==" | "!=" => InfixOp::Comparison(ComparisonOp::Neq),
            "<" => InfixOp::Comparison(ComparisonOp::Lt),
            ">" => InfixOp::Comparison(ComparisonOp::Gt),
            "<=" => InfixOp::Comparison(ComparisonOp::Le),
            ">=" => InfixOp::Comparison(ComparisonOp::Ge),
            _ => return None,
        };
        Some(op)
    }

    pub fn precedence(self) -> u8 {
        match self {
            InfixOp::Binary(op) => op.precedence(),
            InfixOp::Bool(op) => op.precedence(),
            InfixOp::Comparison(op) => op.precedence(),
        }
    }
}
