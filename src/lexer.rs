//! Tokenizer for the constraint mini-language.
//!
//! The lexer reads one token per call and keeps nothing but its position in
//! the source. Once the input is exhausted it keeps returning [`TokenKind::Eof`].
//!
//! | Input             | Token                          |
//! |-------------------|--------------------------------|
//! | `+ - ( )`         | single-character operators     |
//! | `< > <= >=`       | comparisons                    |
//! | `==`, `!=`        | equality (see [`LexOptions`])  |
//! | `[A-Za-z][A-Za-z0-9]*` | [`TokenKind::Literal`]    |
//! | `[0-9]+`          | [`TokenKind::Constant`]        |

use std::fmt::{Display, Formatter};

use log::debug;

use crate::token::{Token, TokenKind};

/// Lexical options.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LexOptions {
    /// Lex `!=` as [`TokenKind::NotEqual`] instead of [`TokenKind::Equal`].
    ///
    /// Off by default: the established dialect reads `!=` as equality.
    pub distinct_not_equal: bool,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum LexError {
    /// No token starts with this character.
    UnexpectedChar { found: char, offset: usize },
    /// A two-character operator was not completed.
    ExpectedChar {
        expected: char,
        found: Option<char>,
        offset: usize,
    },
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LexError::UnexpectedChar { found, offset } => {
                write!(f, "Unexpected character {:?} at {}", found, offset)
            }
            LexError::ExpectedChar {
                expected,
                found: Some(found),
                offset,
            } => write!(f, "Expected {:?} but got {:?} at {}", expected, found, offset),
            LexError::ExpectedChar {
                expected,
                found: None,
                offset,
            } => write!(f, "Expected {:?} but got end of input at {}", expected, offset),
        }
    }
}

impl std::error::Error for LexError {}

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    options: LexOptions,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, LexOptions::default())
    }

    pub fn with_options(source: &'a str, options: LexOptions) -> Self {
        Self {
            source,
            pos: 0,
            options,
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + offset).copied()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset..).and_then(|s| s.chars().next())
    }

    fn consume(&mut self, kind: TokenKind, len: usize) -> Token<'a> {
        let token = Token::new(kind, &self.source[self.pos..self.pos + len], self.pos);
        self.pos += len;
        debug!("lex: {:?} {:?} at {}", token.kind, token.text, token.offset);
        token
    }

    fn expect(&self, expected: u8, offset: usize) -> Result<(), LexError> {
        if self.peek(offset) == Some(expected) {
            Ok(())
        } else {
            Err(LexError::ExpectedChar {
                expected: expected as char,
                found: self.char_at(offset),
                offset: self.pos + offset,
            })
        }
    }

    /// Length of the longest run of bytes satisfying `first` then `rest`.
    fn scan(&self, first: fn(&u8) -> bool, rest: fn(&u8) -> bool) -> usize {
        let bytes = &self.source.as_bytes()[self.pos..];
        match bytes.first() {
            Some(b) if first(b) => 1 + bytes[1..].iter().take_while(|b| rest(b)).count(),
            _ => 0,
        }
    }

    /// Skips spaces, tabs, line breaks, form feeds and vertical tabs.
    fn skip_whitespace(&mut self) {
        while self.peek(0).is_some_and(|c| c.is_ascii_whitespace() || c == b'\x0b') {
            self.pos += 1;
        }
    }

    /// Reads the next token.
    pub fn next_token(&mut self) -> Result<Token<'a>, LexError> {
        self.skip_whitespace();

        let Some(c) = self.peek(0) else {
            return Ok(Token::new(TokenKind::Eof, "", self.pos));
        };

        let token = match c {
            b'+' => self.consume(TokenKind::Plus, 1),
            b'-' => self.consume(TokenKind::Minus, 1),
            b'(' => self.consume(TokenKind::LParen, 1),
            b')' => self.consume(TokenKind::RParen, 1),
            b'>' if self.peek(1) == Some(b'=') => self.consume(TokenKind::GreaterEqual, 2),
            b'>' => self.consume(TokenKind::Greater, 1),
            b'<' if self.peek(1) == Some(b'=') => self.consume(TokenKind::LessEqual, 2),
            b'<' => self.consume(TokenKind::Less, 1),
            b'=' => {
                self.expect(b'=', 1)?;
                self.consume(TokenKind::Equal, 2)
            }
            b'!' => {
                self.expect(b'=', 1)?;
                let kind = if self.options.distinct_not_equal {
                    TokenKind::NotEqual
                } else {
                    TokenKind::Equal
                };
                self.consume(kind, 2)
            }
            _ => {
                let len = self.scan(u8::is_ascii_digit, u8::is_ascii_digit);
                if len > 0 {
                    return Ok(self.consume(TokenKind::Constant, len));
                }
                let len = self.scan(u8::is_ascii_alphabetic, u8::is_ascii_alphanumeric);
                if len > 0 {
                    return Ok(self.consume(TokenKind::Literal, len));
                }
                return Err(LexError::UnexpectedChar {
                    // `c` is a byte, the offending character may be wider
                    found: self.char_at(0).unwrap_or(c as char),
                    offset: self.pos,
                });
            }
        };

        Ok(token)
    }
}

/// Tokenizes the whole source, including the trailing [`TokenKind::Eof`].
pub fn tokenize(source: &str, options: LexOptions) -> Result<Vec<Token<'_>>, LexError> {
    let mut lexer = Lexer::with_options(source, options);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        tokens.push(token);
        if token.is(TokenKind::Eof) {
            return Ok(tokens);
        }
    }
}
