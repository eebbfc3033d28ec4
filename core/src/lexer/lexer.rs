//! Single-pass tokenizer.

use tracing::trace;

use super::{LexError, LexErrorKind, Token, TokenKind};
use crate::parser::Span;

/// Number of characters shown on each side of an unexpected character.
const CONTEXT_RADIUS: usize = 8;

/// Operators, longest first so that `===` wins over `==` and `=`.
const OPERATORS: [&str; 16] = [
    "===", "!==", "&&", "||", ">=", "<=", "==", "!=", ">", "<", "+", "-", "*", "/", "%", "!",
];

/// Split `source` into tokens.
///
/// Whitespace (space, tab, CR, LF) is skipped and never produces a token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(source).run()?;
    trace!(count = tokens.len(), "tokenized expression");
    Ok(tokens)
}

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    pub fn run(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(ch) = self.current() {
            match ch {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '"' | '\'' => self.read_string(ch)?,
                '0'..='9' => self.read_number(),
                '-' if self.starts_negative_number() => self.read_number(),
                'a'..='z' | 'A'..='Z' | '_' => self.read_word(),
                '@' => self.read_function()?,
                '.' => self.single(TokenKind::Dot),
                '[' => self.single(TokenKind::BracketLeft),
                ']' => self.single(TokenKind::BracketRight),
                '(' => self.single(TokenKind::ParenLeft),
                ')' => self.single(TokenKind::ParenRight),
                ',' => self.single(TokenKind::Comma),
                '?' => self.single(TokenKind::Question),
                ':' => self.single(TokenKind::Colon),
                '$' => self.single(TokenKind::Dollar),
                _ => self.read_operator(ch)?,
            }
        }
        Ok(self.tokens)
    }

    fn current(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>, start: usize) {
        self.tokens
            .push(Token::new(kind, text, Span::new(start, self.pos)));
    }

    fn single(&mut self, kind: TokenKind) {
        let start = self.pos;
        if let Some(ch) = self.advance() {
            self.push(kind, ch, start);
        }
    }

    /// A `-` starts a number only when a digit follows and the previous
    /// token cannot end an operand. Whitespace plays no part in this.
    fn starts_negative_number(&self) -> bool {
        let digit_follows = self.peek(1).is_some_and(|c| c.is_ascii_digit());
        let after_operand = self
            .tokens
            .last()
            .is_some_and(|token| token.kind.ends_operand());
        digit_follows && !after_operand
    }

    fn read_string(&mut self, quote: char) -> Result<(), LexError> {
        let start = self.pos;
        self.advance();
        let mut value = String::new();

        loop {
            match self.advance() {
                None => {
                    return Err(LexError::new(
                        LexErrorKind::UnterminatedString,
                        Span::new(start, self.pos),
                    ));
                }
                Some(ch) if ch == quote => break,
                // The escaped character is taken literally.
                Some('\\') => match self.advance() {
                    Some(escaped) => value.push(escaped),
                    None => {
                        return Err(LexError::new(
                            LexErrorKind::UnterminatedString,
                            Span::new(start, self.pos),
                        ));
                    }
                },
                Some(ch) => value.push(ch),
            }
        }

        self.push(TokenKind::String, value, start);
        Ok(())
    }

    fn read_number(&mut self) {
        let start = self.pos;
        if self.current() == Some('-') {
            self.advance();
        }
        self.skip_digits();
        if self.current() == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.skip_digits();
        }
        let text = &self.source[start..self.pos];
        self.push(TokenKind::Number, text, start);
    }

    fn skip_digits(&mut self) {
        while self.current().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn read_word(&mut self) {
        let start = self.pos;
        while self
            .current()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        let text = &self.source[start..self.pos];
        let kind = match text {
            "true" | "false" => TokenKind::Boolean,
            "null" => TokenKind::Null,
            _ => TokenKind::Identifier,
        };
        self.push(kind, text, start);
    }

    fn read_function(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        if !self
            .peek(1)
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        {
            return Err(self.unexpected('@'));
        }
        self.advance();
        let name_start = self.pos;
        while self
            .current()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        let name = &self.source[name_start..self.pos];
        self.push(TokenKind::Function, name, start);
        Ok(())
    }

    fn read_operator(&mut self, ch: char) -> Result<(), LexError> {
        let start = self.pos;
        let rest = &self.source[self.pos..];

        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            self.pos += op.len();
            self.push(TokenKind::Operator, *op, start);
            return Ok(());
        }

        // Lone halves of operators we do know about.
        if matches!(ch, '=' | '&' | '|') {
            self.advance();
            return Err(LexError::new(
                LexErrorKind::UnknownOperator { op: ch.to_string() },
                Span::new(start, self.pos),
            ));
        }

        Err(self.unexpected(ch))
    }

    fn unexpected(&self, ch: char) -> LexError {
        LexError::new(
            LexErrorKind::UnexpectedCharacter {
                ch,
                context: context_window(self.source, self.pos),
            },
            Span::new(self.pos, self.pos + ch.len_utf8()),
        )
    }
}

/// A few characters on either side of `pos`, for error messages.
fn context_window(source: &str, pos: usize) -> String {
    let before: Vec<char> = source[..pos].chars().rev().take(CONTEXT_RADIUS).collect();
    let after = source[pos..].chars().take(CONTEXT_RADIUS + 1);
    before.into_iter().rev().chain(after).collect()
}

/// Whether `name` can be written after `@` in a call.
pub fn is_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
