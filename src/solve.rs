//! End-to-end driver: text in, assignment out.
//!
//! [`solve`] declares one decision variable per name, compiles every
//! constraint and the objective, and asks the session for a model minimizing
//! the objective. Processing stops at the first error.

use std::collections::BTreeMap;

use log::{debug, info};
use num_bigint::BigInt;

use crate::emitter::{Emitter, SymbolTable};
use crate::error::{Error, Result, SolveError};
use crate::lexer::LexOptions;
use crate::parser::Parser;
use crate::search::CheckResult;
use crate::session::{Session, SessionConfig};

/// A problem: variables, hard constraints, and an objective to minimize.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Input {
    pub objective: String,
    pub variables: Vec<String>,
    pub constraints: Vec<String>,
}

/// Result record of [`solve`].
///
/// On success `message` is empty and `assignment` has one entry per declared
/// variable. On failure `assignment` is empty and `message` describes the
/// first error.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Output {
    pub success: bool,
    pub message: String,
    pub assignment: BTreeMap<String, bool>,
    /// Minimal objective value, on success.
    pub objective: Option<BigInt>,
}

impl Output {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            ..Default::default()
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SolveConfig {
    pub session: SessionConfig,
    pub lex: LexOptions,
}

/// A minimizing assignment.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Solution {
    pub assignment: BTreeMap<String, bool>,
    pub objective: BigInt,
}

pub fn solve(input: &Input) -> Output {
    solve_with_config(input, &SolveConfig::default())
}

pub fn solve_with_config(input: &Input, config: &SolveConfig) -> Output {
    match try_solve(input, config) {
        Ok(solution) => Output {
            success: true,
            message: String::new(),
            assignment: solution.assignment,
            objective: Some(solution.objective),
        },
        Err(e) => e.into(),
    }
}

/// Like [`solve_with_config`], but keeps the error structured.
pub fn try_solve(input: &Input, config: &SolveConfig) -> Result<Solution> {
    let session = Session::new(config.session);

    let mut symbols = SymbolTable::new();
    for name in &input.variables {
        symbols
            .entry(name.clone())
            .or_insert_with(|| session.mk_bool_var(name));
    }

    let emitter = Emitter::new(&session, &symbols);

    for (i, text) in input.constraints.iter().enumerate() {
        let node = Parser::with_options(text, config.lex).constraint()?;
        let expr = emitter.emit(node)?;
        debug!("constraint #{}: {}", i, session.to_bracket_string(expr));
        session.add_constraint(expr);
    }

    let node = Parser::with_options(&input.objective, config.lex).objective()?;
    let objective = emitter.emit(node)?;
    debug!("objective: {}", session.to_bracket_string(objective));
    session.minimize(objective);

    let model = match session.check() {
        CheckResult::Sat(model) => model,
        CheckResult::Unsat => return Err(SolveError::Unsat.into()),
        CheckResult::Unknown(reason) => return Err(SolveError::Unknown(reason).into()),
    };

    let assignment = symbols
        .iter()
        .map(|(name, &var)| {
            let value = session.eval_bool(&model, var).unwrap_or(false);
            (name.clone(), value)
        })
        .collect();
    let objective = model.objective().cloned().unwrap_or_default();
    info!("solved: objective = {}", objective);

    Ok(Solution { assignment, objective })
}

impl From<Error> for Output {
    fn from(e: Error) -> Self {
        Output::failure(e.to_string())
    }
}
