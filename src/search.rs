//! Branch-and-bound decision procedure.
//!
//! The search walks the decision variables in creation order, trying `false`
//! before `true`. At every node the constraints and the objective are evaluated
//! over the partial assignment (see [`crate::eval`]):
//!
//! - a constraint that is already false prunes the branch;
//! - a linear constraint that no completion can satisfy prunes the branch;
//! - an objective whose lower bound cannot beat the best model found so far
//!   prunes the branch. The bound is the larger of the objective's interval
//!   and the [`Relaxation`] bound, which accounts for linear constraints;
//! - once all constraints hold and the objective is fixed, the remaining
//!   variables are irrelevant and are set to `false`.
//!
//! Before branching, every free variable is tried with both values; a value
//! that prunes immediately forces the opposite one. Values are maintained
//! incrementally by an [`Evaluator`].

use log::debug;
use num_bigint::BigInt;

use crate::eval::Evaluator;
use crate::interval::Truth;
use crate::linear::Relaxation;
use crate::node::Expr;
use crate::reference::ExprRef;

/// A complete assignment to the decision variables of a session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Model {
    values: Vec<bool>,
    objective: Option<BigInt>,
}

impl Model {
    pub(crate) fn new(values: Vec<bool>, objective: Option<BigInt>) -> Self {
        Self { values, objective }
    }

    /// Value of the variable with the given index.
    pub fn value(&self, index: usize) -> Option<bool> {
        self.values.get(index).copied()
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    /// Value of the minimized objective, if one was registered.
    pub fn objective(&self) -> Option<&BigInt> {
        self.objective.as_ref()
    }
}

/// Outcome of [`Session::check`][crate::session::Session::check].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum CheckResult {
    /// Satisfiable, with a model minimizing the objective.
    Sat(Model),
    Unsat,
    /// The search was stopped before it could decide.
    Unknown(String),
}

impl CheckResult {
    pub fn model(&self) -> Option<&Model> {
        match self {
            CheckResult::Sat(model) => Some(model),
            _ => None,
        }
    }
}

enum Status {
    Conflict,
    Open,
    /// All constraints hold; carries the (fixed) objective value.
    Satisfied(Option<BigInt>),
}

/// The decision limit was reached.
struct Exhausted;

pub(crate) struct Search<'a> {
    evaluator: Evaluator<'a>,
    relaxation: Relaxation,
    constraints: &'a [ExprRef],
    objective: Option<ExprRef>,
    best: Option<Model>,
    decisions: u64,
    limit: Option<u64>,
}

impl<'a> Search<'a> {
    pub(crate) fn new(
        nodes: &'a [Expr],
        num_vars: usize,
        constraints: &'a [ExprRef],
        objective: Option<ExprRef>,
        limit: Option<u64>,
    ) -> Self {
        let relaxation = Relaxation::new(nodes, constraints, objective);
        Self {
            evaluator: Evaluator::new(nodes, num_vars),
            relaxation,
            constraints,
            objective,
            best: None,
            decisions: 0,
            limit,
        }
    }

    pub(crate) fn decisions(&self) -> u64 {
        self.decisions
    }

    pub(crate) fn run(&mut self) -> CheckResult {
        match self.branch() {
            Err(Exhausted) => CheckResult::Unknown(format!(
                "decision limit of {} reached",
                self.limit.unwrap_or_default()
            )),
            Ok(()) => match self.best.take() {
                Some(model) => CheckResult::Sat(model),
                None => CheckResult::Unsat,
            },
        }
    }

    fn best_objective(&self) -> Option<&BigInt> {
        self.best.as_ref().and_then(|model| model.objective())
    }

    /// Without an objective the first model is final.
    fn is_done(&self) -> bool {
        self.objective.is_none() && self.best.is_some()
    }

    fn num_vars(&self) -> usize {
        self.evaluator.assignment().len()
    }

    fn is_free(&self, var: usize) -> bool {
        self.evaluator.assignment()[var].is_none()
    }

    fn assign(&mut self, var: usize, value: Option<bool>) {
        self.evaluator.set(var, value);
    }

    fn status(&self) -> Status {
        let values = self.evaluator.values();
        let mut open = false;

        for c in self.constraints {
            match values[c.index()].truth() {
                Truth::False => return Status::Conflict,
                Truth::Unknown => open = true,
                Truth::True => {}
            }
        }

        let Some(bound) = self.relaxation.bound(self.evaluator.assignment()) else {
            return Status::Conflict;
        };

        let objective = match self.objective {
            None => None,
            Some(objective) => {
                let Some(range) = values[objective.index()].interval() else {
                    return Status::Open;
                };
                let low = if self.relaxation.bounds_objective() && bound > range.low {
                    &bound
                } else {
                    &range.low
                };
                if let Some(best) = self.best_objective() {
                    if low >= best {
                        return Status::Conflict;
                    }
                }
                if !range.is_point() {
                    open = true;
                }
                Some(range.low.clone())
            }
        };

        if open {
            Status::Open
        } else {
            Status::Satisfied(objective)
        }
    }

    fn conflicts_with(&mut self, var: usize, value: bool) -> bool {
        self.assign(var, Some(value));
        let conflict = matches!(self.status(), Status::Conflict);
        self.assign(var, None);
        conflict
    }

    /// Assigns every free variable one of whose values leads to an immediate conflict.
    ///
    /// Returns the forced variables, or `None` if some variable conflicts both ways.
    fn propagate(&mut self) -> Option<Vec<usize>> {
        let mut trail = Vec::new();

        loop {
            let mut changed = false;

            for var in 0..self.num_vars() {
                if !self.is_free(var) {
                    continue;
                }

                let forced = match (self.conflicts_with(var, false), self.conflicts_with(var, true)) {
                    (true, true) => {
                        self.undo(&trail);
                        return None;
                    }
                    (true, false) => true,
                    (false, true) => false,
                    (false, false) => continue,
                };

                debug!("propagate: v{} = {}", var, forced);
                self.assign(var, Some(forced));
                trail.push(var);
                changed = true;
            }

            if !changed {
                return Some(trail);
            }
        }
    }

    fn undo(&mut self, trail: &[usize]) {
        for &var in trail {
            self.assign(var, None);
        }
    }

    fn record(&mut self, objective: Option<BigInt>) {
        let values = self.evaluator.assignment().iter().map(|v| v.unwrap_or(false)).collect();
        debug!("new model with objective {:?}", objective);
        self.best = Some(Model::new(values, objective));
    }

    fn branch(&mut self) -> Result<(), Exhausted> {
        match self.status() {
            Status::Conflict => return Ok(()),
            Status::Satisfied(objective) => {
                self.record(objective);
                return Ok(());
            }
            Status::Open => {}
        }

        let Some(trail) = self.propagate() else {
            return Ok(());
        };

        let result = self.decide();
        self.undo(&trail);
        result
    }

    fn decide(&mut self) -> Result<(), Exhausted> {
        match self.status() {
            Status::Conflict => return Ok(()),
            Status::Satisfied(objective) => {
                self.record(objective);
                return Ok(());
            }
            Status::Open => {}
        }

        // An open status always leaves some variable free.
        let Some(var) = (0..self.num_vars()).find(|&var| self.is_free(var)) else {
            return Ok(());
        };

        for value in [false, true] {
            if self.limit.is_some_and(|limit| self.decisions >= limit) {
                return Err(Exhausted);
            }
            self.decisions += 1;

            self.assign(var, Some(value));
            let result = self.branch();
            self.assign(var, None);
            result?;

            if self.is_done() {
                break;
            }
        }

        Ok(())
    }
}
