//! Optimization session: the manager that owns all expressions.
//!
//! All operations go through a [`Session`]: it creates boolean decision
//! variables, builds integer and comparison expressions over them, collects
//! hard constraints and an objective, and finally runs the decision procedure.
//!
//! ```
//! use spa_solver::node::CmpOp;
//! use spa_solver::search::CheckResult;
//! use spa_solver::session::Session;
//!
//! let session = Session::default();
//! let a = session.mk_bool_var("a");
//! let b = session.mk_bool_var("b");
//! let sum = session.mk_add(session.mk_bool_to_int(a), session.mk_bool_to_int(b));
//! session.add_constraint(session.mk_cmp(CmpOp::Ge, sum, session.mk_int(1)));
//! session.minimize(sum);
//!
//! let CheckResult::Sat(model) = session.check() else { panic!() };
//! assert_eq!(model.objective().map(|v| v.to_string()), Some("1".to_string()));
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use log::{debug, info, warn};
use num_bigint::{BigInt, ParseBigIntError};

use crate::eval::{evaluate, Value};
use crate::node::{ArithOp, CmpOp, Expr};
use crate::reference::ExprRef;
use crate::search::{CheckResult, Model, Search};
use crate::storage::Storage;
use crate::types::{Sort, Var};

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SessionConfig {
    /// Maximum number of branching decisions before the search gives up
    /// with [`CheckResult::Unknown`]. Unlimited if `None`.
    pub decision_limit: Option<u64>,
}

pub struct Session {
    config: SessionConfig,
    storage: RefCell<Storage>,
    names: RefCell<Vec<String>>,
    by_name: RefCell<HashMap<String, ExprRef>>,
    constraints: RefCell<Vec<ExprRef>>,
    objective: Cell<Option<ExprRef>>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            storage: RefCell::new(Storage::new()),
            names: RefCell::new(Vec::new()),
            by_name: RefCell::new(HashMap::new()),
            constraints: RefCell::new(Vec::new()),
            objective: Cell::new(None),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new(SessionConfig::default())
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("nodes", &self.storage.borrow().num_nodes())
            .field("variables", &self.names.borrow().len())
            .field("constraints", &self.constraints.borrow().len())
            .field("objective", &self.objective.get())
            .finish()
    }
}

impl Session {
    pub fn num_vars(&self) -> usize {
        self.names.borrow().len()
    }

    /// Names of all decision variables, in creation order.
    pub fn var_names(&self) -> Vec<String> {
        self.names.borrow().clone()
    }

    pub fn sort(&self, node: ExprRef) -> Sort {
        self.storage.borrow().sort(node)
    }

    pub fn objective(&self) -> Option<ExprRef> {
        self.objective.get()
    }

    fn put(&self, expr: Expr) -> ExprRef {
        self.storage.borrow_mut().put(expr)
    }

    fn assert_sort(&self, node: ExprRef, sort: Sort) {
        let actual = self.sort(node);
        assert_eq!(actual, sort, "Expected {} expression but {} is {}", sort, node, actual);
    }
}

impl Session {
    /// Returns the boolean decision variable named `name`, creating it on first use.
    pub fn mk_bool_var(&self, name: &str) -> ExprRef {
        if let Some(&existing) = self.by_name.borrow().get(name) {
            return existing;
        }

        let var = Var::new(self.names.borrow().len() as u32);
        let node = self.put(Expr::Bool(var));
        debug!("mk_bool_var({}) = {} ({})", name, node, var);
        self.names.borrow_mut().push(name.to_string());
        self.by_name.borrow_mut().insert(name.to_string(), node);
        node
    }

    pub fn mk_int(&self, value: impl Into<BigInt>) -> ExprRef {
        self.put(Expr::Int(value.into()))
    }

    /// Parses a decimal integer, optionally signed.
    pub fn mk_int_str(&self, text: &str) -> Result<ExprRef, ParseBigIntError> {
        let value: BigInt = text.parse()?;
        Ok(self.mk_int(value))
    }

    pub fn mk_ite(&self, cond: ExprRef, then: ExprRef, else_: ExprRef) -> ExprRef {
        self.assert_sort(cond, Sort::Bool);
        self.assert_sort(else_, self.sort(then));
        self.put(Expr::Ite(cond, then, else_))
    }

    /// Coerces a boolean into the integers: `true` is 1, `false` is 0.
    pub fn mk_bool_to_int(&self, node: ExprRef) -> ExprRef {
        let one = self.mk_int(1);
        let zero = self.mk_int(0);
        self.mk_ite(node, one, zero)
    }

    pub fn mk_arith(&self, op: ArithOp, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        self.assert_sort(lhs, Sort::Int);
        self.assert_sort(rhs, Sort::Int);
        self.put(Expr::Arith(op, lhs, rhs))
    }

    pub fn mk_add(&self, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        self.mk_arith(ArithOp::Add, lhs, rhs)
    }

    pub fn mk_sub(&self, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        self.mk_arith(ArithOp::Sub, lhs, rhs)
    }

    pub fn mk_mul(&self, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        self.mk_arith(ArithOp::Mul, lhs, rhs)
    }

    pub fn mk_cmp(&self, op: CmpOp, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        self.assert_sort(lhs, Sort::Int);
        self.assert_sort(rhs, Sort::Int);
        self.put(Expr::Cmp(op, lhs, rhs))
    }
}

impl Session {
    /// Adds a boolean expression as a hard constraint.
    pub fn add_constraint(&self, node: ExprRef) {
        self.assert_sort(node, Sort::Bool);
        debug!("add_constraint({})", node);
        self.constraints.borrow_mut().push(node);
    }

    /// Registers the integer expression to minimize, replacing any previous one.
    pub fn minimize(&self, node: ExprRef) {
        self.assert_sort(node, Sort::Int);
        if let Some(previous) = self.objective.replace(Some(node)) {
            warn!("minimize: objective {} replaced by {}", previous, node);
        }
    }

    /// Runs the decision procedure over the current constraints and objective.
    pub fn check(&self) -> CheckResult {
        let storage = self.storage.borrow();
        let constraints = self.constraints.borrow();
        let mut search = Search::new(
            storage.nodes(),
            self.num_vars(),
            &constraints,
            self.objective.get(),
            self.config.decision_limit,
        );
        let result = search.run();
        info!(
            "check: {} variables, {} constraints, {} nodes, {} decisions -> {}",
            self.num_vars(),
            constraints.len(),
            storage.num_nodes(),
            search.decisions(),
            match &result {
                CheckResult::Sat(_) => "sat",
                CheckResult::Unsat => "unsat",
                CheckResult::Unknown(_) => "unknown",
            }
        );
        result
    }

    /// Evaluates `node` under the complete assignment of `model`.
    pub fn eval(&self, model: &Model, node: ExprRef) -> Value {
        let assignment: Vec<Option<bool>> = model.values().iter().map(|&v| Some(v)).collect();
        let storage = self.storage.borrow();
        // Nodes created after `node` cannot influence it.
        let prefix = &storage.nodes()[..=node.index()];
        evaluate(prefix, &assignment).swap_remove(node.index())
    }

    pub fn eval_bool(&self, model: &Model, node: ExprRef) -> Option<bool> {
        self.eval(model, node).as_bool()
    }

    pub fn eval_int(&self, model: &Model, node: ExprRef) -> Option<BigInt> {
        self.eval(model, node).as_int().cloned()
    }
}

impl Session {
    /// Renders `node` in SMT-LIB-like prefix notation, e.g. `(>= (ite a 1 0) 1)`.
    pub fn to_bracket_string(&self, node: ExprRef) -> String {
        enum Item {
            Node(ExprRef),
            Text(&'static str),
        }

        let storage = self.storage.borrow();
        let names = self.names.borrow();
        let mut out = String::new();
        let mut stack = vec![Item::Node(node)];

        while let Some(item) = stack.pop() {
            let node = match item {
                Item::Text(text) => {
                    out.push_str(text);
                    continue;
                }
                Item::Node(node) => node,
            };

            let expr = storage.value(node);
            let head = match expr {
                Expr::Bool(var) => {
                    out.push_str(&names[var.index()]);
                    continue;
                }
                Expr::Int(value) => {
                    out.push_str(&value.to_string());
                    continue;
                }
                Expr::Ite(..) => "ite",
                Expr::Arith(op, ..) => op.symbol(),
                Expr::Cmp(op, ..) => op.symbol(),
            };

            out.push('(');
            out.push_str(head);
            stack.push(Item::Text(")"));
            let children: Vec<ExprRef> = expr.children().collect();
            for &child in children.iter().rev() {
                stack.push(Item::Node(child));
                stack.push(Item::Text(" "));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_bool_var_by_name() {
        let session = Session::default();
        let a = session.mk_bool_var("a");
        let b = session.mk_bool_var("b");
        assert_ne!(a, b);
        assert_eq!(session.mk_bool_var("a"), a);
        assert_eq!(session.num_vars(), 2);
        assert_eq!(session.var_names(), vec!["a", "b"]);
        assert_eq!(session.sort(a), Sort::Bool);
    }

    #[test]
    fn test_hash_consing() {
        let session = Session::default();
        let a = session.mk_bool_var("a");
        let x = session.mk_bool_to_int(a);
        let y = session.mk_bool_to_int(a);
        assert_eq!(x, y);
        assert_eq!(session.mk_int(5), session.mk_int(5));
    }

    #[test]
    fn test_int_str() {
        let session = Session::default();
        let n = session.mk_int_str("123456789012345678901234567890").unwrap();
        assert_eq!(session.to_bracket_string(n), "123456789012345678901234567890");
        assert!(session.mk_int_str("").is_err());
        assert!(session.mk_int_str("12a").is_err());
    }

    #[test]
    fn test_bracket_string() {
        let session = Session::default();
        let x = session.mk_bool_to_int(session.mk_bool_var("x"));
        let y = session.mk_bool_to_int(session.mk_bool_var("y"));
        let e = session.mk_sub(session.mk_add(x, y), session.mk_int(3));
        assert_eq!(session.to_bracket_string(e), "(- (+ (ite x 1 0) (ite y 1 0)) 3)");
        let c = session.mk_cmp(CmpOp::Ne, session.mk_mul(session.mk_int(-1), x), y);
        assert_eq!(session.to_bracket_string(c), "(distinct (* -1 (ite x 1 0)) (ite y 1 0))");
    }

    #[test]
    #[should_panic(expected = "Expected Int expression")]
    fn test_add_bool_panics() {
        let session = Session::default();
        let a = session.mk_bool_var("a");
        session.mk_add(a, a);
    }

    #[test]
    fn test_check_minimizes() {
        let session = Session::default();
        let a = session.mk_bool_var("a");
        let b = session.mk_bool_var("b");
        let sum = session.mk_add(session.mk_bool_to_int(a), session.mk_bool_to_int(b));
        session.add_constraint(session.mk_cmp(CmpOp::Ge, sum, session.mk_int(1)));
        session.minimize(sum);

        let result = session.check();
        let model = result.model().unwrap();
        assert_eq!(model.objective(), Some(&BigInt::from(1)));
        assert_eq!(session.eval_int(model, sum), Some(BigInt::from(1)));
        let a = session.eval_bool(model, a).unwrap();
        let b = session.eval_bool(model, b).unwrap();
        assert!(a ^ b);
    }

    #[test]
    fn test_check_maximize_by_negation() {
        let session = Session::default();
        let names = ["a", "b", "c"];
        let ints: Vec<_> = names
            .iter()
            .map(|n| session.mk_bool_to_int(session.mk_bool_var(n)))
            .collect();
        // At most two of three.
        let sum = session.mk_add(session.mk_add(ints[0], ints[1]), ints[2]);
        session.add_constraint(session.mk_cmp(CmpOp::Le, sum, session.mk_int(2)));
        session.minimize(session.mk_mul(session.mk_int(-1), sum));

        let model = session.check().model().cloned().unwrap();
        assert_eq!(model.objective(), Some(&BigInt::from(-2)));
        assert_eq!(model.values().iter().filter(|&&v| v).count(), 2);
    }

    #[test]
    fn test_check_unsat() {
        let session = Session::default();
        let a = session.mk_bool_to_int(session.mk_bool_var("a"));
        session.add_constraint(session.mk_cmp(CmpOp::Ge, a, session.mk_int(2)));
        session.minimize(a);
        assert_eq!(session.check(), CheckResult::Unsat);
    }

    #[test]
    fn test_check_without_objective() {
        let session = Session::default();
        let a = session.mk_bool_var("a");
        let b = session.mk_bool_var("b");
        let ai = session.mk_bool_to_int(a);
        let bi = session.mk_bool_to_int(b);
        session.add_constraint(session.mk_cmp(CmpOp::Eq, ai, session.mk_int(1)));
        session.add_constraint(session.mk_cmp(CmpOp::Lt, bi, ai));

        let result = session.check();
        let model = result.model().unwrap();
        assert_eq!(model.objective(), None);
        assert_eq!(session.eval_bool(model, a), Some(true));
        assert_eq!(session.eval_bool(model, b), Some(false));
    }

    #[test]
    fn test_exactly_one_of_many() {
        let session = Session::default();
        let n = 12;
        let ints: Vec<_> = (0..n)
            .map(|i| session.mk_bool_to_int(session.mk_bool_var(&format!("x{}", i))))
            .collect();
        let sum = ints[1..].iter().fold(ints[0], |acc, &x| session.mk_add(acc, x));
        session.add_constraint(session.mk_cmp(CmpOp::Eq, sum, session.mk_int(1)));
        // Prefer the last variable: cost is its negated position.
        let cost = ints
            .iter()
            .enumerate()
            .map(|(i, &x)| session.mk_mul(session.mk_int(-(i as i64)), x))
            .reduce(|acc, x| session.mk_add(acc, x))
            .unwrap();
        session.minimize(cost);

        let model = session.check().model().cloned().unwrap();
        assert_eq!(model.objective(), Some(&BigInt::from(-(n as i64 - 1))));
        assert_eq!(model.value(n - 1), Some(true));
        assert_eq!(model.values().iter().filter(|&&v| v).count(), 1);
    }

    #[test]
    fn test_decision_limit() {
        let session = Session::new(SessionConfig {
            decision_limit: Some(0),
        });
        let a = session.mk_bool_to_int(session.mk_bool_var("a"));
        let b = session.mk_bool_to_int(session.mk_bool_var("b"));
        // Neither value of a single variable decides this on its own.
        session.add_constraint(session.mk_cmp(CmpOp::Eq, a, b));
        assert!(matches!(session.check(), CheckResult::Unknown(_)));
    }

    #[test]
    fn test_minimize_replaces() {
        let session = Session::default();
        let a = session.mk_bool_to_int(session.mk_bool_var("a"));
        session.minimize(a);
        let neg = session.mk_mul(session.mk_int(-1), a);
        session.minimize(neg);
        assert_eq!(session.objective(), Some(neg));
        let model = session.check().model().cloned().unwrap();
        assert_eq!(model.objective(), Some(&BigInt::from(-1)));
    }
}
