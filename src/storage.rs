//! Hash-consed expression storage.
//!
//! Nodes are appended in creation order and never removed, so a node's
//! children always precede it. Putting a node that already exists returns the
//! existing handle.

use std::collections::HashMap;

use crate::node::Expr;
use crate::reference::ExprRef;
use crate::types::Sort;

#[derive(Debug, Default)]
pub struct Storage {
    nodes: Vec<Expr>,
    sorts: Vec<Sort>,
    index: HashMap<Expr, ExprRef>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[Expr] {
        &self.nodes
    }

    pub fn value(&self, node: ExprRef) -> &Expr {
        &self.nodes[node.index()]
    }

    pub fn sort(&self, node: ExprRef) -> Sort {
        self.sorts[node.index()]
    }

    pub fn put(&mut self, expr: Expr) -> ExprRef {
        if let Some(&existing) = self.index.get(&expr) {
            return existing;
        }

        for child in expr.children() {
            assert!(
                child.index() < self.nodes.len(),
                "Child {} does not belong to this storage",
                child
            );
        }

        let sort = expr.sort(|child| self.sort(child));
        let node = ExprRef::new(self.nodes.len() as u32);
        self.nodes.push(expr.clone());
        self.sorts.push(sort);
        self.index.insert(expr, node);
        node
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;
    use crate::node::ArithOp;
    use crate::types::Var;

    #[test]
    fn test_put_dedup() {
        let mut storage = Storage::new();
        let x = storage.put(Expr::Bool(Var::new(0)));
        let one = storage.put(Expr::Int(BigInt::from(1)));
        let zero = storage.put(Expr::Int(BigInt::from(0)));
        let a = storage.put(Expr::Ite(x, one, zero));
        let b = storage.put(Expr::Ite(x, one, zero));
        assert_eq!(a, b);
        assert_eq!(storage.num_nodes(), 4);
        assert_eq!(storage.put(Expr::Int(BigInt::from(1))), one);
    }

    #[test]
    fn test_sorts() {
        let mut storage = Storage::new();
        let x = storage.put(Expr::Bool(Var::new(0)));
        let one = storage.put(Expr::Int(BigInt::from(1)));
        let sum = storage.put(Expr::Arith(ArithOp::Add, one, one));
        assert_eq!(storage.sort(x), Sort::Bool);
        assert_eq!(storage.sort(sum), Sort::Int);
        assert_eq!(storage.value(sum), &Expr::Arith(ArithOp::Add, one, one));
    }

    #[test]
    #[should_panic(expected = "does not belong to this storage")]
    fn test_foreign_child() {
        let mut storage = Storage::new();
        storage.put(Expr::Ite(ExprRef::new(3), ExprRef::new(4), ExprRef::new(5)));
    }
}
