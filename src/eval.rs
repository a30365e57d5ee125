//! Bottom-up evaluation of the expression storage under a (partial) assignment.
//!
//! Since children precede parents in storage, one forward pass over the nodes
//! computes every value. Unassigned variables evaluate to [`Truth::Unknown`],
//! which widens the affected integers to intervals. [`Evaluator`] keeps those
//! values current as the search assigns variables one at a time.

use num_bigint::BigInt;

use crate::interval::{Interval, Truth};
use crate::node::{ArithOp, Expr};
use crate::reference::ExprRef;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Value {
    Bool(Truth),
    Int(Interval),
}

impl Value {
    pub fn truth(&self) -> Truth {
        match self {
            Value::Bool(t) => *t,
            Value::Int(_) => Truth::Unknown,
        }
    }

    pub fn interval(&self) -> Option<&Interval> {
        match self {
            Value::Bool(_) => None,
            Value::Int(i) => Some(i),
        }
    }

    /// The exact value, if the assignment determines it.
    pub fn as_bool(&self) -> Option<bool> {
        self.truth().to_bool()
    }

    /// The exact value, if the assignment determines it.
    pub fn as_int(&self) -> Option<&BigInt> {
        self.interval().and_then(Interval::as_point)
    }

    fn join(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Value::Bool(a.join(*b)),
            (Value::Int(a), Value::Int(b)) => Value::Int(a.hull(b)),
            // Mixed sorts are rejected when the node is built.
            _ => Value::Bool(Truth::Unknown),
        }
    }
}

fn int_of(values: &[Value], node: ExprRef) -> Interval {
    match &values[node.index()] {
        Value::Int(i) => i.clone(),
        Value::Bool(t) => match t.to_bool() {
            Some(b) => Interval::constant(BigInt::from(b as u8)),
            None => Interval::new(BigInt::from(0), BigInt::from(1)),
        },
    }
}

fn node_value(expr: &Expr, values: &[Value], assignment: &[Option<bool>]) -> Value {
    match expr {
        Expr::Bool(var) => {
            let assigned = assignment.get(var.index()).copied().flatten();
            Value::Bool(assigned.map_or(Truth::Unknown, Truth::from_bool))
        }
        Expr::Int(n) => Value::Int(Interval::constant(n.clone())),
        Expr::Ite(c, t, e) => match values[c.index()].truth() {
            Truth::True => values[t.index()].clone(),
            Truth::False => values[e.index()].clone(),
            Truth::Unknown => values[t.index()].join(&values[e.index()]),
        },
        Expr::Arith(op, a, b) => {
            let a = int_of(values, *a);
            let b = int_of(values, *b);
            Value::Int(match op {
                ArithOp::Add => a.add(&b),
                ArithOp::Sub => a.sub(&b),
                ArithOp::Mul => a.mul(&b),
            })
        }
        Expr::Cmp(op, a, b) => {
            let a = int_of(values, *a);
            let b = int_of(values, *b);
            Value::Bool(a.compare(*op, &b))
        }
    }
}

/// Evaluates all `nodes` under `assignment` (indexed by variable).
///
/// Variables beyond the end of `assignment` are treated as unassigned.
pub fn evaluate(nodes: &[Expr], assignment: &[Option<bool>]) -> Vec<Value> {
    let mut values: Vec<Value> = Vec::with_capacity(nodes.len());
    for expr in nodes {
        let value = node_value(expr, &values, assignment);
        values.push(value);
    }
    values
}

/// Keeps the values of all nodes up to date while variables are assigned and
/// unassigned one at a time.
///
/// Changing a variable re-evaluates only the nodes downstream of it whose
/// inputs actually changed.
pub struct Evaluator<'a> {
    nodes: &'a [Expr],
    assignment: Vec<Option<bool>>,
    values: Vec<Value>,
    /// Storage index of each variable's node, if the variable occurs.
    var_nodes: Vec<Option<usize>>,
    changed: Vec<bool>,
    touched: Vec<usize>,
}

impl<'a> Evaluator<'a> {
    /// Starts with every variable unassigned.
    pub fn new(nodes: &'a [Expr], num_vars: usize) -> Self {
        let assignment = vec![None; num_vars];
        let values = evaluate(nodes, &assignment);

        let mut var_nodes = vec![None; num_vars];
        for (i, expr) in nodes.iter().enumerate() {
            if let Expr::Bool(var) = expr {
                if let Some(slot) = var_nodes.get_mut(var.index()) {
                    *slot = Some(i);
                }
            }
        }

        Self {
            nodes,
            assignment,
            values,
            var_nodes,
            changed: vec![false; nodes.len()],
            touched: Vec::new(),
        }
    }

    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn set(&mut self, var: usize, value: Option<bool>) {
        if self.assignment[var] == value {
            return;
        }
        self.assignment[var] = value;

        let Some(start) = self.var_nodes[var] else {
            return;
        };

        for i in start..self.nodes.len() {
            let expr = &self.nodes[i];
            if i != start && !expr.children().any(|c| self.changed[c.index()]) {
                continue;
            }
            let value = node_value(expr, &self.values, &self.assignment);
            if value != self.values[i] {
                self.values[i] = value;
                self.changed[i] = true;
                self.touched.push(i);
            }
        }

        for i in self.touched.drain(..) {
            self.changed[i] = false;
        }
    }
}
