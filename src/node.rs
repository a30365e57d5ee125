use std::cmp::Ordering;

use num_bigint::BigInt;

use crate::reference::ExprRef;
use crate::types::{Sort, Var};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
}

impl ArithOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    /// Operator name in SMT-LIB notation.
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "=",
            CmpOp::Ne => "distinct",
        }
    }

    /// Whether `lhs op rhs` holds, given `lhs.cmp(rhs)`.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Le => ordering != Ordering::Greater,
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Ge => ordering != Ordering::Less,
            CmpOp::Eq => ordering == Ordering::Equal,
            CmpOp::Ne => ordering != Ordering::Equal,
        }
    }
}

/// A node of the expression graph.
///
/// Children are referenced by handle and always have smaller indices than
/// their parent, so the storage is topologically sorted by construction.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Expr {
    /// Boolean decision variable.
    Bool(Var),
    /// Integer constant.
    Int(BigInt),
    /// If-then-else over a boolean condition.
    Ite(ExprRef, ExprRef, ExprRef),
    Arith(ArithOp, ExprRef, ExprRef),
    Cmp(CmpOp, ExprRef, ExprRef),
}

impl Expr {
    /// Sort of the node, given the sort of its children.
    pub fn sort(&self, child: impl Fn(ExprRef) -> Sort) -> Sort {
        match self {
            Expr::Bool(_) | Expr::Cmp(..) => Sort::Bool,
            Expr::Int(_) | Expr::Arith(..) => Sort::Int,
            Expr::Ite(_, then, _) => child(*then),
        }
    }

    /// Child handles, left to right.
    pub fn children(&self) -> impl Iterator<Item = ExprRef> {
        let slots = match *self {
            Expr::Bool(_) | Expr::Int(_) => [None, None, None],
            Expr::Ite(c, t, e) => [Some(c), Some(t), Some(e)],
            Expr::Arith(_, a, b) | Expr::Cmp(_, a, b) => [Some(a), Some(b), None],
        };
        slots.into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmp_holds() {
        assert!(CmpOp::Lt.holds(Ordering::Less));
        assert!(!CmpOp::Lt.holds(Ordering::Equal));
        assert!(CmpOp::Le.holds(Ordering::Equal));
        assert!(CmpOp::Ge.holds(Ordering::Greater));
        assert!(!CmpOp::Gt.holds(Ordering::Equal));
        assert!(CmpOp::Eq.holds(Ordering::Equal));
        assert!(CmpOp::Ne.holds(Ordering::Less));
        assert!(!CmpOp::Ne.holds(Ordering::Equal));
    }

    #[test]
    fn test_sort() {
        let int = |_| Sort::Int;
        assert_eq!(Expr::Bool(Var::new(0)).sort(int), Sort::Bool);
        assert_eq!(Expr::Int(BigInt::from(3)).sort(int), Sort::Int);
        let r = ExprRef::new(0);
        assert_eq!(Expr::Cmp(CmpOp::Eq, r, r).sort(int), Sort::Bool);
        assert_eq!(Expr::Ite(r, r, r).sort(int), Sort::Int);
        assert_eq!(Expr::Ite(r, r, r).sort(|_| Sort::Bool), Sort::Bool);
    }

    #[test]
    fn test_children() {
        let (a, b, c) = (ExprRef::new(0), ExprRef::new(1), ExprRef::new(2));
        assert_eq!(Expr::Int(BigInt::from(1)).children().count(), 0);
        assert_eq!(Expr::Arith(ArithOp::Sub, b, a).children().collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(Expr::Ite(c, a, b).children().collect::<Vec<_>>(), vec![c, a, b]);
    }
}
