//! Plain-text problem files.
//!
//! # Format
//!
//! ```text
//! # comment
//! var <name>...      # declare decision variables
//! st <constraint>    # add a hard constraint
//! min <objective>    # set the objective (exactly once)
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Directives may appear
//! in any order; constraints keep the order of their `st` lines.

use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, BufReader, Read};

use log::debug;

use crate::solve::Input;

#[derive(Debug)]
pub enum ProblemError {
    Io(io::Error),
    /// Malformed line, 1-based.
    Syntax { line: usize, message: String },
}

impl From<io::Error> for ProblemError {
    fn from(e: io::Error) -> Self {
        ProblemError::Io(e)
    }
}

impl Display for ProblemError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ProblemError::Io(e) => write!(f, "I/O error: {}", e),
            ProblemError::Syntax { line, message } => write!(f, "Syntax error on line {}: {}", line, message),
        }
    }
}

impl std::error::Error for ProblemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProblemError::Io(e) => Some(e),
            ProblemError::Syntax { .. } => None,
        }
    }
}

fn syntax(line: usize, message: impl Into<String>) -> ProblemError {
    ProblemError::Syntax {
        line,
        message: message.into(),
    }
}

pub fn parse_problem<R: Read>(reader: R) -> Result<Input, ProblemError> {
    let mut variables = Vec::new();
    let mut constraints = Vec::new();
    let mut objective = None;

    for (i, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let number = i + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (directive, rest) = match line.split_once(char::is_whitespace) {
            Some((directive, rest)) => (directive, rest.trim()),
            None => (line, ""),
        };

        match directive {
            "var" => {
                if rest.is_empty() {
                    return Err(syntax(number, "'var' needs at least one name"));
                }
                variables.extend(rest.split_whitespace().map(str::to_string));
            }
            "st" => {
                if rest.is_empty() {
                    return Err(syntax(number, "'st' needs a constraint"));
                }
                constraints.push(rest.to_string());
            }
            "min" => {
                if objective.is_some() {
                    return Err(syntax(number, "duplicate 'min'"));
                }
                if rest.is_empty() {
                    return Err(syntax(number, "'min' needs an objective"));
                }
                objective = Some(rest.to_string());
            }
            other => return Err(syntax(number, format!("unknown directive '{}'", other))),
        }
    }

    let Some(objective) = objective else {
        return Err(syntax(0, "missing 'min'"));
    };

    debug!(
        "parsed problem with {} variables and {} constraints",
        variables.len(),
        constraints.len()
    );

    Ok(Input {
        objective,
        variables,
        constraints,
    })
}

pub fn parse_problem_str(text: &str) -> Result<Input, ProblemError> {
    parse_problem(text.as_bytes())
}

/// Writes the problem back in the file format.
impl Display for Input {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.variables.is_empty() {
            writeln!(f, "var {}", self.variables.join(" "))?;
        }
        for constraint in &self.constraints {
            writeln!(f, "st {}", constraint)?;
        }
        writeln!(f, "min {}", self.objective)
    }
}
