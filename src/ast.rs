use std::fmt::{Display, Formatter};

use crate::token::TokenKind;

/// Binary operators: arithmetic and comparison.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        !matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UnaryOp {
    Neg,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
        }
    }

    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        }
    }
}

/// Syntax tree of a single objective or constraint.
///
/// Every node owns its children. Names and numbers borrow from the source text;
/// they are resolved only when the tree is emitted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Node<'a> {
    Binary {
        op: BinaryOp,
        left: Box<Node<'a>>,
        right: Box<Node<'a>>,
    },
    Unary {
        op: UnaryOp,
        value: Box<Node<'a>>,
    },
    /// Reference to a decision variable.
    Literal(&'a str),
    /// Decimal integer, digits only.
    Constant(&'a str),
}

impl<'a> Node<'a> {
    pub fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, value: Self) -> Self {
        Node::Unary {
            op,
            value: Box::new(value),
        }
    }

    pub fn literal(name: &'a str) -> Self {
        Node::Literal(name)
    }

    pub fn constant(value: &'a str) -> Self {
        Node::Constant(value)
    }

    /// Splits the left spine of nested binary nodes into the leftmost operand
    /// and the `(op, right)` pairs applied to it, innermost first.
    ///
    /// `((x + y) - 3) >= z` yields `x` and `[(+, y), (-, 3), (>=, z)]`. Long
    /// sums parse into deep left spines; walking them here keeps callers from
    /// recursing once per term.
    pub fn left_chain(&self) -> (&Node<'a>, Vec<(BinaryOp, &Node<'a>)>) {
        let mut rest = Vec::new();
        let mut node = self;
        while let Node::Binary { op, left, right } = node {
            rest.push((*op, right.as_ref()));
            node = left.as_ref();
        }
        rest.reverse();
        (node, rest)
    }

    /// Moves the children out, leaving leaves in their place.
    fn take_children(&mut self, out: &mut Vec<Node<'a>>) {
        match self {
            Node::Binary { left, right, .. } => {
                out.push(std::mem::replace(left.as_mut(), Node::Constant("")));
                out.push(std::mem::replace(right.as_mut(), Node::Constant("")));
            }
            Node::Unary { value, .. } => out.push(std::mem::replace(value.as_mut(), Node::Constant(""))),
            Node::Literal(_) | Node::Constant(_) => {}
        }
    }
}

/// Drops the tree with an explicit stack instead of recursing per node.
impl Drop for Node<'_> {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.take_children(&mut stack);
        while let Some(mut node) = stack.pop() {
            node.take_children(&mut stack);
        }
    }
}

/// Fully parenthesized infix form, e.g. `((x + y) - 3)`.
impl Display for Node<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Binary { .. } => {
                let (first, rest) = self.left_chain();
                for _ in 0..rest.len() {
                    write!(f, "(")?;
                }
                write!(f, "{}", first)?;
                for (op, right) in rest {
                    write!(f, " {} {})", op.symbol(), right)?;
                }
                Ok(())
            }
            Node::Unary { op, value } => write!(f, "({}{})", op.symbol(), value),
            Node::Literal(name) => write!(f, "{}", name),
            Node::Constant(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let sum = Node::binary(BinaryOp::Add, Node::literal("x"), Node::literal("y"));
        let node = Node::binary(BinaryOp::Ge, Node::unary(UnaryOp::Neg, sum), Node::constant("1"));
        assert_eq!(node.to_string(), "((-(x + y)) >= 1)");
    }

    #[test]
    fn test_left_chain() {
        let sum = Node::binary(
            BinaryOp::Sub,
            Node::binary(BinaryOp::Add, Node::literal("x"), Node::literal("y")),
            Node::constant("3"),
        );
        let node = Node::binary(BinaryOp::Ge, sum, Node::unary(UnaryOp::Neg, Node::literal("z")));
        let (first, rest) = node.left_chain();
        assert_eq!(first, &Node::literal("x"));
        let ops: Vec<BinaryOp> = rest.iter().map(|&(op, _)| op).collect();
        assert_eq!(ops, vec![BinaryOp::Add, BinaryOp::Sub, BinaryOp::Ge]);
        assert_eq!(rest[2].1.to_string(), "(-z)");

        let leaf = Node::constant("7");
        let (first, rest) = leaf.left_chain();
        assert_eq!(first, &leaf);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_long_chain_display_and_drop() {
        let mut node = Node::literal("a");
        for _ in 0..200_000 {
            node = Node::binary(BinaryOp::Add, node, Node::literal("a"));
        }
        let text = node.to_string();
        assert!(text.starts_with("(((a + a) + a)"));
        assert!(text.ends_with(" + a)"));
        drop(node);
    }

    #[test]
    fn test_ops() {
        assert!(BinaryOp::Ge.is_comparison());
        assert!(!BinaryOp::Sub.is_comparison());
        assert_eq!(UnaryOp::from_token(TokenKind::Minus), Some(UnaryOp::Neg));
        assert_eq!(UnaryOp::from_token(TokenKind::Plus), None);
    }
}
