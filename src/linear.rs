//! Linear forms over decision variables and the relaxation bound used to
//! prune the search.
//!
//! Most expressions built from text are linear: sums and differences of
//! coerced variables `ite(x, 1, 0)` and constants, with `(* -1 e)` for
//! negation. [`linearize`] recovers `Σ cᵢ·xᵢ + k` for every integer node
//! where possible. Each linear constraint becomes one or two rows
//! `Σ aᵢ·xᵢ ≥ b`.
//!
//! [`Relaxation::bound`] gives a lower bound on the objective over all
//! completions of a partial assignment. Per row it solves the continuous
//! relaxation `min c·x` subject to that row alone and `0 ≤ x ≤ 1`, which is a
//! fractional knapsack. The bound is the maximum over rows. Constraints that
//! are not linear are left to interval evaluation.

use std::cmp::max;
use std::collections::BTreeMap;

use num_bigint::BigInt;

use crate::node::{ArithOp, CmpOp, Expr};
use crate::reference::ExprRef;

/// `Σ terms[i]·xᵢ + constant`, with no zero coefficients.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Linear {
    pub terms: BTreeMap<usize, BigInt>,
    pub constant: BigInt,
}

impl Linear {
    pub fn constant(value: BigInt) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant: value,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn coeff(&self, var: usize) -> Option<&BigInt> {
        self.terms.get(&var)
    }

    /// `self + factor * other`.
    pub fn add_scaled(&self, other: &Linear, factor: &BigInt) -> Linear {
        let zero = BigInt::default();
        let mut terms = self.terms.clone();
        for (&var, c) in &other.terms {
            let sum = terms.get(&var).unwrap_or(&zero) + c * factor;
            if sum == zero {
                terms.remove(&var);
            } else {
                terms.insert(var, sum);
            }
        }
        Linear {
            terms,
            constant: &self.constant + &other.constant * factor,
        }
    }

    pub fn scale(&self, factor: &BigInt) -> Linear {
        Linear::default().add_scaled(self, factor)
    }
}

/// Linear form of every integer node, `None` where a node is boolean or not linear.
pub fn linearize(nodes: &[Expr]) -> Vec<Option<Linear>> {
    let one = BigInt::from(1);
    let minus_one = BigInt::from(-1);
    let mut forms: Vec<Option<Linear>> = Vec::with_capacity(nodes.len());

    for expr in nodes {
        let form = match expr {
            Expr::Bool(_) | Expr::Cmp(..) => None,
            Expr::Int(n) => Some(Linear::constant(n.clone())),
            // e + (t - e)·x, linear only when t - e is a constant.
            Expr::Ite(c, t, e) => match (&nodes[c.index()], &forms[t.index()], &forms[e.index()]) {
                (Expr::Bool(var), Some(t), Some(e)) => {
                    let diff = t.add_scaled(e, &minus_one);
                    if diff.is_constant() {
                        let mut step = Linear::default();
                        if diff.constant != BigInt::default() {
                            step.terms.insert(var.index(), diff.constant);
                        }
                        Some(e.add_scaled(&step, &one))
                    } else {
                        None
                    }
                }
                _ => None,
            },
            Expr::Arith(op, a, b) => match (&forms[a.index()], &forms[b.index()]) {
                (Some(a), Some(b)) => match op {
                    ArithOp::Add => Some(a.add_scaled(b, &one)),
                    ArithOp::Sub => Some(a.add_scaled(b, &minus_one)),
                    ArithOp::Mul if a.is_constant() => Some(b.scale(&a.constant)),
                    ArithOp::Mul if b.is_constant() => Some(a.scale(&b.constant)),
                    ArithOp::Mul => None,
                },
                _ => None,
            },
        };
        forms.push(form);
    }

    forms
}

/// `Σ terms[i]·xᵢ ≥ bound`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Row {
    pub terms: Vec<(usize, BigInt)>,
    pub bound: BigInt,
}

impl Row {
    /// `sign · (lhs - rhs) ≥ offset`, folded into row form.
    fn new(diff: &Linear, sign: i32, offset: i32) -> Self {
        let sign = BigInt::from(sign);
        Row {
            terms: diff.terms.iter().map(|(&var, c)| (var, c * &sign)).collect(),
            bound: BigInt::from(offset) - &diff.constant * &sign,
        }
    }

    /// Rows equivalent to `lhs op rhs`. `!=` gives no rows.
    pub fn from_cmp(op: CmpOp, lhs: &Linear, rhs: &Linear) -> Vec<Row> {
        let diff = lhs.add_scaled(rhs, &BigInt::from(-1));
        match op {
            CmpOp::Ge => vec![Row::new(&diff, 1, 0)],
            CmpOp::Gt => vec![Row::new(&diff, 1, 1)],
            CmpOp::Le => vec![Row::new(&diff, -1, 0)],
            CmpOp::Lt => vec![Row::new(&diff, -1, 1)],
            CmpOp::Eq => vec![Row::new(&diff, 1, 0), Row::new(&diff, -1, 0)],
            CmpOp::Ne => vec![],
        }
    }

    /// Least increase of the objective over its unconstrained minimum that
    /// the continuous relaxation needs to satisfy this row, or `None` if the
    /// row cannot be satisfied at all.
    ///
    /// Each free variable starts at the value minimizing its objective
    /// coefficient. Variables are then moved towards satisfying the row in
    /// order of cost per unit gained, the last one possibly by a fraction.
    fn min_cost(&self, objective: &Linear, assignment: &[Option<bool>]) -> Option<BigInt> {
        let zero = BigInt::default();
        let mut need = self.bound.clone();
        // (cost, gain), both positive.
        let mut moves: Vec<(BigInt, BigInt)> = Vec::new();

        for (var, a) in &self.terms {
            let c = objective.coeff(*var).unwrap_or(&zero);
            match assignment[*var] {
                Some(true) => need -= a,
                Some(false) => {}
                None => {
                    let up = *c < zero || (*c == zero && *a > zero);
                    if up {
                        need -= a;
                        if *a < zero {
                            moves.push((-c, -a));
                        }
                    } else if *a > zero {
                        moves.push((c.clone(), a.clone()));
                    }
                }
            }
        }

        if need <= zero {
            return Some(zero);
        }

        moves.sort_by(|(c1, g1), (c2, g2)| (c1 * g2).cmp(&(c2 * g1)));

        let mut extra = zero;
        for (cost, gain) in moves {
            if gain >= need {
                // ceil(need · cost / gain)
                let part = &need * &cost;
                extra += (part + &gain - 1) / &gain;
                return Some(extra);
            }
            extra += cost;
            need -= gain;
        }
        None
    }
}

/// Linear rows of the constraints together with the linear objective.
#[derive(Debug, Clone, Default)]
pub struct Relaxation {
    objective: Option<Linear>,
    rows: Vec<Row>,
}

impl Relaxation {
    pub fn new(nodes: &[Expr], constraints: &[ExprRef], objective: Option<ExprRef>) -> Self {
        let forms = linearize(nodes);

        let mut rows = Vec::new();
        for c in constraints {
            if let Expr::Cmp(op, a, b) = &nodes[c.index()] {
                if let (Some(a), Some(b)) = (&forms[a.index()], &forms[b.index()]) {
                    rows.extend(Row::from_cmp(*op, a, b));
                }
            }
        }

        let objective = objective.and_then(|o| forms[o.index()].clone());
        Self { objective, rows }
    }

    /// Whether [`bound`][Relaxation::bound] bounds the objective, and not only feasibility.
    pub fn bounds_objective(&self) -> bool {
        self.objective.is_some()
    }

    /// Lower bound on the objective over all completions of `assignment`, or
    /// `None` if some linear constraint cannot be satisfied by any completion.
    ///
    /// Without a linear objective the bound is zero and only feasibility counts.
    pub fn bound(&self, assignment: &[Option<bool>]) -> Option<BigInt> {
        let zero = BigInt::default();
        let none = Linear::default();
        let objective = self.objective.as_ref().unwrap_or(&none);

        let mut base = objective.constant.clone();
        for (&var, c) in &objective.terms {
            match assignment[var] {
                Some(true) => base += c,
                Some(false) => {}
                None if *c < zero => base += c,
                None => {}
            }
        }

        let mut extra = zero;
        for row in &self.rows {
            extra = max(extra, row.min_cost(objective, assignment)?);
        }
        Some(base + extra)
    }
}
