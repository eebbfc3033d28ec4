use core::fmt;

use crate::parser::Span;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    String,
    Number,
    Boolean,
    Null,
    Identifier,
    Operator,
    /// `@name`; the token text holds the name without the `@`.
    Function,
    Dot,
    BracketLeft,
    BracketRight,
    ParenLeft,
    ParenRight,
    Comma,
    Question,
    Colon,
    Dollar,
}

impl TokenKind {
    /// Whether a token of this kind can be the last token of an operand.
    ///
    /// Decides if a `-` directly before a digit belongs to a number literal.
    pub fn ends_operand(self) -> bool {
        matches!(
            self,
            TokenKind::String
                | TokenKind::Number
                | TokenKind::Boolean
                | TokenKind::Null
                | TokenKind::Identifier
                | TokenKind::BracketRight
                | TokenKind::ParenRight
                | TokenKind::Dollar
        )
    }

    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
            TokenKind::Identifier => "identifier",
            TokenKind::Operator => "operator",
            TokenKind::Function => "function",
            TokenKind::Dot => "'.'",
            TokenKind::BracketLeft => "'['",
            TokenKind::BracketRight => "']'",
            TokenKind::ParenLeft => "'('",
            TokenKind::ParenRight => "')'",
            TokenKind::Comma => "','",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Dollar => "'$'",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A typed slice of source text.
///
/// `text` is the cooked value: string literals are unescaped and function
/// tokens drop the leading `@`. `span` always covers the raw source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_operator(&self, text: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == text
    }
}
