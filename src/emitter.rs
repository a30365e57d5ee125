//! Lowering of syntax trees into optimizer expressions.
//!
//! The emitter consumes a [`Node`] and builds the equivalent expression through
//! an [`ExprBuilder`]. Variable references are resolved against a
//! [`SymbolTable`]; each boolean variable is coerced to `0`/`1` so it can be
//! mixed with constants in linear arithmetic. Operands are emitted left to
//! right, and the first failure aborts the whole translation.
//!
//! Chains of binary operators are lowered in a loop along their left spine,
//! so recursion only follows parentheses and unary minus.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use log::debug;

use crate::ast::{BinaryOp, Node, UnaryOp};
use crate::node::{ArithOp, CmpOp};
use crate::reference::ExprRef;
use crate::session::Session;
use crate::types::Sort;

/// Expression-building primitives the emitter needs from an optimizer.
pub trait ExprBuilder {
    type Expr: Copy;

    /// Integer constant from its decimal text, or `None` if it is not representable.
    fn int_const(&self, text: &str) -> Option<Self::Expr>;
    fn int(&self, value: i64) -> Self::Expr;
    /// `1` if `value` holds, `0` otherwise.
    fn bool_to_int(&self, value: Self::Expr) -> Self::Expr;
    fn arith(&self, op: ArithOp, lhs: Self::Expr, rhs: Self::Expr) -> Self::Expr;
    fn compare(&self, op: CmpOp, lhs: Self::Expr, rhs: Self::Expr) -> Self::Expr;
}

impl ExprBuilder for Session {
    type Expr = ExprRef;

    fn int_const(&self, text: &str) -> Option<ExprRef> {
        self.mk_int_str(text).ok()
    }

    fn int(&self, value: i64) -> ExprRef {
        self.mk_int(value)
    }

    fn bool_to_int(&self, value: ExprRef) -> ExprRef {
        self.mk_bool_to_int(value)
    }

    fn arith(&self, op: ArithOp, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        self.mk_arith(op, lhs, rhs)
    }

    fn compare(&self, op: CmpOp, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        self.mk_cmp(op, lhs, rhs)
    }
}

/// Variable name to decision-variable handle.
pub type SymbolTable<E = ExprRef> = HashMap<String, E>;

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum EmitError {
    UnknownVariable(String),
    InvalidConstant(String),
    /// An operator got an operand of the wrong sort, e.g. a comparison inside a sum.
    SortMismatch {
        op: &'static str,
        expected: Sort,
        found: Sort,
    },
}

impl Display for EmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EmitError::UnknownVariable(name) => write!(f, "No variable '{}'", name),
            EmitError::InvalidConstant(text) => write!(f, "Invalid integer constant '{}'", text),
            EmitError::SortMismatch { op, expected, found } => {
                write!(f, "Operator '{}' expects {} operands but got {}", op, expected, found)
            }
        }
    }
}

impl std::error::Error for EmitError {}

pub struct Emitter<'e, B: ExprBuilder> {
    builder: &'e B,
    symbols: &'e SymbolTable<B::Expr>,
}

impl<'e, B: ExprBuilder> Emitter<'e, B> {
    pub fn new(builder: &'e B, symbols: &'e SymbolTable<B::Expr>) -> Self {
        Self { builder, symbols }
    }

    /// Lowers `node` into a builder expression, consuming the tree.
    pub fn emit(&self, node: Node<'_>) -> Result<B::Expr, EmitError> {
        let (expr, _) = self.lower(&node)?;
        Ok(expr)
    }

    fn lower(&self, node: &Node<'_>) -> Result<(B::Expr, Sort), EmitError> {
        match node {
            Node::Binary { .. } => {
                let (first, rest) = node.left_chain();
                // `first` is never binary, so this recursion stops right away.
                let mut acc = self.lower(first)?;
                for (op, right) in rest {
                    let right = self.lower(right)?;
                    acc = self.binary(op, acc, right)?;
                }
                Ok(acc)
            }
            Node::Unary { op, value } => {
                let value = self.int_operand(op.symbol(), self.lower(value)?)?;
                let expr = match op {
                    UnaryOp::Neg => self.builder.arith(ArithOp::Mul, self.builder.int(-1), value),
                };
                Ok((expr, Sort::Int))
            }
            Node::Literal(name) => {
                let Some(&var) = self.symbols.get(*name) else {
                    return Err(EmitError::UnknownVariable(name.to_string()));
                };
                Ok((self.builder.bool_to_int(var), Sort::Int))
            }
            Node::Constant(text) => {
                let expr = self
                    .builder
                    .int_const(text)
                    .ok_or_else(|| EmitError::InvalidConstant(text.to_string()))?;
                Ok((expr, Sort::Int))
            }
        }
    }

    fn int_operand(&self, op: &'static str, (expr, sort): (B::Expr, Sort)) -> Result<B::Expr, EmitError> {
        if sort != Sort::Int {
            return Err(EmitError::SortMismatch {
                op,
                expected: Sort::Int,
                found: sort,
            });
        }
        Ok(expr)
    }

    fn binary(
        &self,
        op: BinaryOp,
        left: (B::Expr, Sort),
        right: (B::Expr, Sort),
    ) -> Result<(B::Expr, Sort), EmitError> {
        debug!("emit: {:?}", op);
        let left = self.int_operand(op.symbol(), left)?;
        let right = self.int_operand(op.symbol(), right)?;
        let expr = match op {
            BinaryOp::Add => self.builder.arith(ArithOp::Add, left, right),
            BinaryOp::Sub => self.builder.arith(ArithOp::Sub, left, right),
            BinaryOp::Mul => self.builder.arith(ArithOp::Mul, left, right),
            BinaryOp::Lt => self.builder.compare(CmpOp::Lt, left, right),
            BinaryOp::Le => self.builder.compare(CmpOp::Le, left, right),
            BinaryOp::Gt => self.builder.compare(CmpOp::Gt, left, right),
            BinaryOp::Ge => self.builder.compare(CmpOp::Ge, left, right),
            BinaryOp::Eq => self.builder.compare(CmpOp::Eq, left, right),
            BinaryOp::Ne => self.builder.compare(CmpOp::Ne, left, right),
        };
        let sort = if op.is_comparison() { Sort::Bool } else { Sort::Int };
        Ok((expr, sort))
    }
}
