//! Small newtypes shared by the expression storage and the search.
use std::fmt;

/// A boolean decision variable (0-indexed, in creation order).
///
/// Variables are numbered densely so that assignments can be stored in plain
/// vectors indexed by [`Var::index`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    pub fn new(id: u32) -> Self {
        Var(id)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Sort (type) of an expression.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Sort {
    Bool,
    Int,
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::Int => write!(f, "Int"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var() {
        let v0 = Var::new(0);
        let v1 = Var::new(1);
        assert_eq!(v1.index(), 1);
        assert!(v0 < v1);
        assert_eq!(v1.to_string(), "v1");
    }
}
