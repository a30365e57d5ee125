//! # spa-solver: small pseudo-boolean optimization from text
//!
//! **`spa-solver`** reads a linear objective and a list of linear constraints
//! over boolean decision variables, written as plain infix text, and finds an
//! assignment that satisfies every constraint while minimizing the objective.
//!
//! ```text
//! variables:   a, b, c
//! constraints: a + b >= 1
//!              b + c >= 1
//! objective:   a + b + c        =>   b = true, objective = 1
//! ```
//!
//! ## Pipeline
//!
//! Each string goes through the same stages:
//!
//! 1. **[`lexer`]** splits the text into [`Token`][crate::token::Token]s.
//! 2. **[`parser`]** builds a [`Node`][crate::ast::Node] tree by precedence climbing.
//! 3. **[`emitter`]** lowers the tree into expressions of an
//!    [`ExprBuilder`][crate::emitter::ExprBuilder], coercing every variable
//!    reference to `ite(var, 1, 0)`.
//! 4. **[`session`]** holds the hash-consed expressions, the constraints and the
//!    objective, and runs the branch-and-bound [`search`].
//!
//! The [`solve`] module wires these stages together:
//!
//! ```rust
//! use spa_solver::solve::{solve, Input};
//!
//! let input = Input {
//!     objective: "a + b + c".to_string(),
//!     variables: vec!["a".to_string(), "b".to_string(), "c".to_string()],
//!     constraints: vec!["a + b >= 1".to_string(), "b + c >= 1".to_string()],
//! };
//! let output = solve(&input);
//!
//! assert!(output.success);
//! assert_eq!(output.assignment["b"], true);
//! assert_eq!(output.objective.map(|v| v.to_string()), Some("1".to_string()));
//! ```
//!
//! ## Grammar
//!
//! ```text
//! objective  := term EOF
//! constraint := term relop term EOF
//! term       := factor (('+' | '-') factor)*
//! factor     := '-' factor | '(' term ')' | identifier | number
//! relop      := '<' | '>' | '<=' | '>=' | '==' | '!='
//! ```
//!
//! By default `!=` reads as equality; see [`LexOptions`][crate::lexer::LexOptions].

pub mod ast;
pub mod emitter;
pub mod error;
pub mod eval;
pub mod interval;
pub mod lexer;
pub mod linear;
pub mod node;
pub mod parser;
pub mod problem;
pub mod reference;
pub mod search;
pub mod session;
pub mod solve;
pub mod storage;
pub mod token;
pub mod types;
