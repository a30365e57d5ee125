use std::fmt::{Display, Formatter};

/// Kind of a lexical token.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    Eof,
    Equal,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    NotEqual,
    Plus,
    Minus,
    Literal,
    Constant,
    LParen,
    RParen,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::Eof => "end of input",
            TokenKind::Equal => "'=='",
            TokenKind::Less => "'<'",
            TokenKind::Greater => "'>'",
            TokenKind::LessEqual => "'<='",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::NotEqual => "'!='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Literal => "identifier",
            TokenKind::Constant => "number",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
        };
        write!(f, "{}", s)
    }
}

/// A token together with the slice of source text it was read from.
///
/// `offset` is the byte position of `text` in the source text.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: usize,
}

impl<'a> Token<'a> {
    pub const fn new(kind: TokenKind, text: &'a str, offset: usize) -> Self {
        Self { kind, text, offset }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Literal | TokenKind::Constant => write!(f, "{} '{}'", self.kind, self.text),
            _ => write!(f, "{}", self.kind),
        }
    }
}
