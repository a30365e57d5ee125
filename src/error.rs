//! Crate-wide error type.
//!
//! Each stage has its own error; [`Error`] wraps whichever stage failed first.

use std::fmt::{Display, Formatter};

use crate::emitter::EmitError;
use crate::lexer::LexError;
use crate::parser::ParseError;

/// The optimizer could not produce a model.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SolveError {
    Unsat,
    Unknown(String),
}

impl Display for SolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::Unsat => write!(f, "unsat"),
            SolveError::Unknown(reason) => write!(f, "unknown: {}", reason),
        }
    }
}

impl std::error::Error for SolveError {}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    Lex(LexError),
    Parse(ParseError),
    Emit(EmitError),
    Solve(SolveError),
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Lex(e) => Error::Lex(e),
            e => Error::Parse(e),
        }
    }
}

impl From<EmitError> for Error {
    fn from(e: EmitError) -> Self {
        Error::Emit(e)
    }
}

impl From<SolveError> for Error {
    fn from(e: SolveError) -> Self {
        Error::Solve(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Lex(e) => write!(f, "{}", e),
            Error::Parse(e) => write!(f, "{}", e),
            Error::Emit(e) => write!(f, "{}", e),
            Error::Solve(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Lex(e) => Some(e),
            Error::Parse(e) => Some(e),
            Error::Emit(e) => Some(e),
            Error::Solve(e) => Some(e),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
