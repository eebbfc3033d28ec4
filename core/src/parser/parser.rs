//! Recursive-descent parser with precedence climbing.
//!
//! Precedence, lowest to highest:
//!
//! | tier | operators                 |
//! |------|---------------------------|
//! | 1    | `? :` (right-associative) |
//! | 2    | `\|\|`                    |
//! | 3    | `&&`                      |
//! | 4    | `===` `!==` `==` `!=`     |
//! | 5    | `<` `<=` `>` `>=`         |
//! | 6    | `+` `-`                   |
//! | 7    | `*` `/` `%`               |
//! | 8    | prefix `!` `-`            |
//! | 9    | `.name` `[expr]`          |

use tracing::trace;

use crate::lexer::{Token, TokenKind};
use crate::parser::{
    Expr, InfixOp, Literal, Node, ParseError, ParseErrorKind, Program, Span, UnaryOp, precedence,
};

/// Default nesting limit, deep enough for any hand-written formula.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parse a token sequence into a [`Program`].
pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    parse_with_max_depth(tokens, DEFAULT_MAX_DEPTH)
}

/// Parse a token sequence, failing once nesting exceeds `max_depth`.
///
/// Nesting counts both parser recursion and the height of the resulting tree,
/// so a long flat chain such as `1 + 1 + ... + 1` is bounded too. Any program
/// this accepts fits within the same `max_depth` at evaluation time.
pub fn parse_with_max_depth(tokens: &[Token], max_depth: usize) -> Result<Program, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::new(ParseErrorKind::EmptyExpression, Span::at(0)));
    }

    let mut parser = Parser::new(tokens, max_depth);
    let root = parser.parse_expression(0)?;

    // Everything must be consumed.
    if let Some(token) = parser.peek() {
        return Err(ParseError::at_token(
            ParseErrorKind::UnexpectedToken {
                expected: "end of input".to_string(),
            },
            token,
        ));
    }

    trace!(tokens = tokens.len(), "parsed expression");
    Ok(Program { root })
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token], max_depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Span just past the last token, used for errors at end of input.
    fn end_span(&self) -> Span {
        let end = self.tokens.last().map_or(0, |t| t.span.end());
        Span::at(end)
    }

    fn end_of_input(&self, expected: &str) -> ParseError {
        ParseError::new(
            ParseErrorKind::UnexpectedEndOfInput {
                expected: expected.to_string(),
            },
            self.end_span(),
        )
    }

    /// Consume a token of `kind`, or fail with `kind_on_error` (at the
    /// offending token, or at end of input).
    fn expect(
        &mut self,
        kind: TokenKind,
        kind_on_error: ParseErrorKind,
    ) -> Result<&'t Token, ParseError> {
        match self.peek() {
            Some(token) if token.is(kind) => {
                self.pos += 1;
                Ok(token)
            }
            Some(token) => Err(ParseError::at_token(kind_on_error, token)),
            None => Err(ParseError::new(kind_on_error, self.end_span())),
        }
    }

    fn with_depth<T>(
        &mut self,
        span: Span,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::new(
                ParseErrorKind::MaxDepthExceeded {
                    max_depth: self.max_depth,
                },
                span,
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Reject a node whose subtree is taller than `max_depth`.
    fn bounded(&self, node: Node) -> Result<Node, ParseError> {
        if node.height() > self.max_depth {
            return Err(ParseError::new(
                ParseErrorKind::MaxDepthExceeded {
                    max_depth: self.max_depth,
                },
                node.span,
            ));
        }
        Ok(node)
    }

    fn current_span(&self) -> Span {
        self.peek().map_or_else(|| self.end_span(), |t| t.span.clone())
    }

    /// Extend a left operand with every operator binding tighter than `min_precedence`.
    fn parse_expression(&mut self, min_precedence: u8) -> Result<Node, ParseError> {
        let span = self.current_span();
        self.with_depth(span, |p| p.parse_expression_inner(min_precedence))
    }

    fn parse_expression_inner(&mut self, min_precedence: u8) -> Result<Node, ParseError> {
        let mut left = self.parse_unary()?;

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Question => {
                    if precedence::TERNARY <= min_precedence {
                        break;
                    }
                    self.pos += 1;
                    left = self.parse_conditional(left)?;
                }
                TokenKind::Operator => {
                    let Some(op) = InfixOp::from_text(&token.text) else {
                        return Err(ParseError::at_token(
                            ParseErrorKind::UnexpectedToken {
                                expected: "binary operator".to_string(),
                            },
                            token,
                        ));
                    };
                    let op_precedence = op.precedence();
                    if op_precedence <= min_precedence {
                        break;
                    }
                    self.pos += 1;
                    // Left-associative: the right side only takes tighter operators.
                    let right = self.parse_expression(op_precedence)?;
                    let span = Span::combine(&left.span, &right.span);
                    let (left_box, right_box) = (Box::new(left), Box::new(right));
                    let expr = match op {
                        InfixOp::Binary(op) => Expr::Binary {
                            op,
                            left: left_box,
                            right: right_box,
                        },
                        InfixOp::Bool(op) => Expr::Boolean {
                            op,
                            left: left_box,
                            right: right_box,
                        },
                        InfixOp::Comparison(op) => Expr::Comparison {
                            op,
                            left: left_box,
                            right: right_box,
                        },
                    };
                    left = self.bounded(Node::new(expr, span))?;
                }
                _ => break,
            }
        }

        Ok(left)
    }

    /// Both branches restart at the lowest precedence, which makes
    /// `a ? b : c ? d : e` group as `a ? b : (c ? d : e)`.
    fn parse_conditional(&mut self, test: Node) -> Result<Node, ParseError> {
        let consequent = self.parse_expression(0)?;
        self.expect(TokenKind::Colon, ParseErrorKind::ExpectedColonInConditional)?;
        let alternate = self.parse_expression(0)?;
        let span = Span::combine(&test.span, &alternate.span);
        self.bounded(Node::new(
            Expr::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
            span,
        ))
    }

    fn parse_unary(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.peek() else {
            return Err(self.end_of_input("expression"));
        };

        let op = match token.kind {
            TokenKind::Operator if token.text == "!" => UnaryOp::Not,
            TokenKind::Operator if token.text == "-" => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        self.pos += 1;

        let operand_span = self.current_span();
        let operand = self.with_depth(operand_span, |p| p.parse_unary())?;
        let span = Span::combine(&token.span, &operand.span);
        self.bounded(Node::new(
            Expr::Unary {
                op,
                expr: Box::new(operand),
                prefix: true,
            },
            span,
        ))
    }

    /// A primary followed by any chain of `.name` and `[expr]`.
    fn parse_postfix(&mut self) -> Result<Node, ParseError> {
        let mut node = self.parse_primary()?;

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Dot => {
                    self.pos += 1;
                    let name =
                        self.expect(TokenKind::Identifier, ParseErrorKind::ExpectedPropertyName)?;
                    let property = Node::new(Expr::Ident(name.text.clone()), name.span.clone());
                    let span = Span::combine(&node.span, &name.span);
                    node = self.bounded(Node::new(
                        Expr::Member {
                            object: Box::new(node),
                            property: Box::new(property),
                            computed: false,
                        },
                        span,
                    ))?;
                }
                TokenKind::BracketLeft => {
                    self.pos += 1;
                    let property = self.parse_expression(0)?;
                    let close = self.expect(
                        TokenKind::BracketRight,
                        ParseErrorKind::ExpectedClosingBracket,
                    )?;
                    let span = Span::combine(&node.span, &close.span);
                    node = self.bounded(Node::new(
                        Expr::Member {
                            object: Box::new(node),
                            property: Box::new(property),
                            computed: true,
                        },
                        span,
                    ))?;
                }
                _ => break,
            }
        }

        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<Node, ParseError> {
        let Some(token) = self.advance() else {
            return Err(self.end_of_input("expression"));
        };
        let span = token.span.clone();

        let expr = match token.kind {
            TokenKind::Number => {
                let value = token
                    .text
                    .parse::<f64>()
                    .map_err(|_| ParseError::at_token(ParseErrorKind::InvalidNumber, token))?;
                Expr::Literal(Literal::Number(value))
            }
            TokenKind::String => Expr::Literal(Literal::Str(token.text.clone())),
            TokenKind::Boolean => Expr::Literal(Literal::Bool(token.text == "true")),
            TokenKind::Null => Expr::Literal(Literal::Null),
            TokenKind::Identifier => Expr::Ident(token.text.clone()),
            TokenKind::Dollar => Expr::Root,
            TokenKind::ParenLeft => {
                let inner = self.parse_expression(0)?;
                let close = self.expect(
                    TokenKind::ParenRight,
                    ParseErrorKind::ExpectedClosingParenthesis,
                )?;
                // Keep the inner expression; only widen its span.
                return Ok(Node::new(inner.expr, Span::combine(&span, &close.span)));
            }
            TokenKind::Function => return self.parse_call(token),
            _ => {
                return Err(ParseError::at_token(
                    ParseErrorKind::UnexpectedToken {
                        expected: "expression".to_string(),
                    },
                    token,
                ));
            }
        };

        Ok(Node::new(expr, span))
    }

    fn parse_call(&mut self, callee: &'t Token) -> Result<Node, ParseError> {
        self.expect(
            TokenKind::ParenLeft,
            ParseErrorKind::ExpectedOpeningParenthesis,
        )?;

        let mut args = Vec::new();
        if let Some(close) = self.peek().filter(|t| t.is(TokenKind::ParenRight)) {
            self.pos += 1;
            return Ok(Node::new(
                Expr::Call {
                    callee: callee.text.clone(),
                    args,
                },
                Span::combine(&callee.span, &close.span),
            ));
        }

        loop {
            args.push(self.parse_expression(0)?);
            match self.advance() {
                Some(token) if token.is(TokenKind::Comma) => continue,
                Some(token) if token.is(TokenKind::ParenRight) => {
                    return self.bounded(Node::new(
                        Expr::Call {
                            callee: callee.text.clone(),
                            args,
                        },
                        Span::combine(&callee.span, &token.span),
                    ));
                }
                Some(token) => {
                    return Err(ParseError::at_token(
                        ParseErrorKind::ExpectedCommaBetweenArguments,
                        token,
                    ));
                }
                None => {
                    return Err(ParseError::new(
                        ParseErrorKind::ExpectedClosingParenthesis,
                        self.end_span(),
                    ));
                }
            }
        }
    }
}
