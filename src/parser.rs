//! Recursive-descent parser with a single token of lookahead.
//!
//! Grammar, from lowest to highest precedence:
//!
//! ```text
//! constraint := term_low REL term_low EOF
//! objective  := term_low EOF
//! term_low   := term_high (('+' | '-') term_high)*
//! term_high  := factor (MUL factor)*
//! factor     := '-' factor | '(' term_low ')' | primary
//! primary    := IDENTIFIER | INTEGER
//! ```
//!
//! Binary levels are driven by the [`LEVELS`] table: each entry lists the
//! operators accepted at that level, and the next entry (or [`Parser::factor`]
//! after the last one) parses the operands. All binary levels are
//! left-associative. The first error aborts the parse; no partial tree is returned.

use std::fmt::{Display, Formatter};

use log::debug;

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::lexer::{LexError, LexOptions, Lexer};
use crate::token::{Token, TokenKind};

/// Maximum nesting of unary minus and parentheses.
pub const MAX_DEPTH: usize = 256;

/// One binary precedence level.
pub struct Level {
    pub name: &'static str,
    pub ops: &'static [(TokenKind, BinaryOp)],
}

/// Binary precedence levels, lowest first.
pub static LEVELS: [Level; 2] = [
    Level {
        name: "additive",
        ops: &[(TokenKind::Plus, BinaryOp::Add), (TokenKind::Minus, BinaryOp::Sub)],
    },
    // Multiplication is reserved: the lexer has no token for it yet.
    Level {
        name: "multiplicative",
        ops: &[],
    },
];

/// Operators allowed between the two sides of a constraint.
pub static RELATIONAL: [(TokenKind, BinaryOp); 6] = [
    (TokenKind::Less, BinaryOp::Lt),
    (TokenKind::Greater, BinaryOp::Gt),
    (TokenKind::LessEqual, BinaryOp::Le),
    (TokenKind::GreaterEqual, BinaryOp::Ge),
    (TokenKind::Equal, BinaryOp::Eq),
    (TokenKind::NotEqual, BinaryOp::Ne),
];

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParseError {
    Lex(LexError),
    Expected {
        expected: TokenKind,
        found: TokenKind,
        offset: usize,
    },
    ExpectedOneOf {
        expected: Vec<TokenKind>,
        found: TokenKind,
        offset: usize,
    },
    ExpectedPrimary {
        found: TokenKind,
        offset: usize,
    },
    TooDeep {
        offset: usize,
    },
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError::Lex(e)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Lex(e) => write!(f, "{}", e),
            ParseError::Expected {
                expected,
                found,
                offset,
            } => write!(f, "Expected {} but got {} at {}", expected, found, offset),
            ParseError::ExpectedOneOf {
                expected,
                found,
                offset,
            } => {
                write!(f, "Expected one of ")?;
                for (i, kind) in expected.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", kind)?;
                }
                write!(f, " but got {} at {}", found, offset)
            }
            ParseError::ExpectedPrimary { found, offset } => {
                write!(f, "Expected identifier or number but got {} at {}", found, offset)
            }
            ParseError::TooDeep { offset } => {
                write!(f, "Expression nested deeper than {} at {}", MAX_DEPTH, offset)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Lex(e) => Some(e),
            _ => None,
        }
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Lookahead token, or the error the lexer produced in its place.
    current: Result<Token<'a>, LexError>,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, LexOptions::default())
    }

    pub fn with_options(source: &'a str, options: LexOptions) -> Self {
        let mut lexer = Lexer::with_options(source, options);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            depth: 0,
        }
    }

    fn peek(&self) -> Result<Token<'a>, ParseError> {
        self.current.clone().map_err(ParseError::Lex)
    }

    fn advance(&mut self) -> Result<Token<'a>, ParseError> {
        let token = self.peek()?;
        self.current = self.lexer.next_token();
        Ok(token)
    }

    fn take(&mut self, kind: TokenKind) -> Result<Token<'a>, ParseError> {
        let token = self.peek()?;
        if !token.is(kind) {
            return Err(ParseError::Expected {
                expected: kind,
                found: token.kind,
                offset: token.offset,
            });
        }
        self.advance()
    }

    /// Consumes the lookahead if it is one of `ops`.
    fn accept_op(&mut self, ops: &[(TokenKind, BinaryOp)]) -> Result<Option<BinaryOp>, ParseError> {
        let token = self.peek()?;
        match ops.iter().find(|(kind, _)| token.is(*kind)) {
            Some(&(_, op)) => {
                self.advance()?;
                Ok(Some(op))
            }
            None => Ok(None),
        }
    }

    fn expect_op(&mut self, ops: &[(TokenKind, BinaryOp)]) -> Result<BinaryOp, ParseError> {
        match self.accept_op(ops)? {
            Some(op) => Ok(op),
            None => {
                let token = self.peek()?;
                Err(ParseError::ExpectedOneOf {
                    expected: ops.iter().map(|&(kind, _)| kind).collect(),
                    found: token.kind,
                    offset: token.offset,
                })
            }
        }
    }

    fn primary(&mut self) -> Result<Node<'a>, ParseError> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::Literal => {
                self.advance()?;
                Ok(Node::literal(token.text))
            }
            TokenKind::Constant => {
                self.advance()?;
                Ok(Node::constant(token.text))
            }
            found => Err(ParseError::ExpectedPrimary {
                found,
                offset: token.offset,
            }),
        }
    }

    /// Unary minus, parenthesized term, or primary, tried in that order.
    pub fn factor(&mut self) -> Result<Node<'a>, ParseError> {
        let token = self.peek()?;

        let nested = UnaryOp::from_token(token.kind).is_some() || token.is(TokenKind::LParen);
        if !nested {
            return self.primary();
        }

        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep { offset: token.offset });
        }
        self.depth += 1;
        let result = self.nested_factor(token);
        self.depth -= 1;
        result
    }

    fn nested_factor(&mut self, token: Token<'a>) -> Result<Node<'a>, ParseError> {
        self.advance()?;
        if let Some(op) = UnaryOp::from_token(token.kind) {
            let value = self.factor()?;
            return Ok(Node::unary(op, value));
        }
        let inner = self.term()?;
        self.take(TokenKind::RParen)?;
        Ok(inner)
    }

    fn parse_at_level(&mut self, level: usize) -> Result<Node<'a>, ParseError> {
        let Some(current) = LEVELS.get(level) else {
            return self.factor();
        };

        let mut left = self.parse_at_level(level + 1)?;
        while let Some(op) = self.accept_op(current.ops)? {
            let right = self.parse_at_level(level + 1)?;
            debug!("parse: {} {:?}", current.name, op);
            left = Node::binary(op, left, right);
        }
        Ok(left)
    }

    /// Parses an arithmetic term at the lowest binary precedence.
    pub fn term(&mut self) -> Result<Node<'a>, ParseError> {
        self.parse_at_level(0)
    }

    /// Parses a whole objective: a single term followed by end of input.
    pub fn objective(&mut self) -> Result<Node<'a>, ParseError> {
        let node = self.term()?;
        self.take(TokenKind::Eof)?;
        debug!("objective: {}", node);
        Ok(node)
    }

    /// Parses a whole constraint: two terms joined by one comparison.
    pub fn constraint(&mut self) -> Result<Node<'a>, ParseError> {
        let left = self.term()?;
        let op = self.expect_op(&RELATIONAL)?;
        let right = self.term()?;
        self.take(TokenKind::Eof)?;
        let node = Node::binary(op, left, right);
        debug!("constraint: {}", node);
        Ok(node)
    }
}

pub fn parse_objective(source: &str, options: LexOptions) -> Result<Node<'_>, ParseError> {
    Parser::with_options(source, options).objective()
}

pub fn parse_constraint(source: &str, options: LexOptions) -> Result<Node<'_>, ParseError> {
    Parser::with_options(source, options).constraint()
}
