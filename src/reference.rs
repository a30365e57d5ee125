use std::fmt::{Display, Formatter};

/// Handle to an expression stored in a [`Session`][crate::session::Session].
///
/// Handles are plain indices: cheap to copy, compare and hash. Structurally
/// equal expressions built in the same session share one handle. A handle is
/// meaningless outside the session that created it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ExprRef(u32);

impl ExprRef {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the index of the referenced node in the session storage.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for ExprRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref() {
        let r = ExprRef::new(7);
        assert_eq!(r.index(), 7);
        assert_eq!(r.to_string(), "@7");
        assert!(ExprRef::new(1) < ExprRef::new(2));
    }
}
