//! Interval and three-valued domains used to evaluate partial assignments.
//!
//! Every integer expression built from 0/1-coerced variables and constants is
//! bounded, so intervals here are always finite and non-empty.

use std::cmp::{max, min};
use std::fmt;

use num_bigint::BigInt;

use crate::node::CmpOp;

/// Three-valued truth: known true, known false, or not yet decided.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Truth {
    False,
    True,
    Unknown,
}

impl Truth {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Truth::True
        } else {
            Truth::False
        }
    }

    pub fn to_bool(self) -> Option<bool> {
        match self {
            Truth::False => Some(false),
            Truth::True => Some(true),
            Truth::Unknown => None,
        }
    }

    /// Least upper bound: the truth value covering both `self` and `other`.
    pub fn join(self, other: Self) -> Self {
        if self == other {
            self
        } else {
            Truth::Unknown
        }
    }
}

impl std::ops::Not for Truth {
    type Output = Truth;

    fn not(self) -> Self::Output {
        match self {
            Truth::False => Truth::True,
            Truth::True => Truth::False,
            Truth::Unknown => Truth::Unknown,
        }
    }
}

/// Closed interval `[low, high]` of integers.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Interval {
    pub low: BigInt,
    pub high: BigInt,
}

impl Interval {
    pub fn new(low: BigInt, high: BigInt) -> Self {
        assert!(low <= high, "Empty interval [{}, {}]", low, high);
        Self { low, high }
    }

    pub fn constant(value: BigInt) -> Self {
        Self {
            low: value.clone(),
            high: value,
        }
    }

    pub fn is_point(&self) -> bool {
        self.low == self.high
    }

    pub fn as_point(&self) -> Option<&BigInt> {
        if self.is_point() {
            Some(&self.low)
        } else {
            None
        }
    }

    /// Smallest interval containing both `self` and `other`.
    pub fn hull(&self, other: &Interval) -> Interval {
        Interval {
            low: min(&self.low, &other.low).clone(),
            high: max(&self.high, &other.high).clone(),
        }
    }

    pub fn add(&self, other: &Interval) -> Interval {
        Interval {
            low: &self.low + &other.low,
            high: &self.high + &other.high,
        }
    }

    pub fn sub(&self, other: &Interval) -> Interval {
        Interval {
            low: &self.low - &other.high,
            high: &self.high - &other.low,
        }
    }

    pub fn mul(&self, other: &Interval) -> Interval {
        let products = [
            &self.low * &other.low,
            &self.low * &other.high,
            &self.high * &other.low,
            &self.high * &other.high,
        ];
        let low = products.iter().min().cloned().unwrap_or_default();
        let high = products.iter().max().cloned().unwrap_or_default();
        Interval { low, high }
    }

    /// Truth of `self op other` for every pair of values drawn from the intervals.
    pub fn compare(&self, op: CmpOp, other: &Interval) -> Truth {
        if let (Some(a), Some(b)) = (self.as_point(), other.as_point()) {
            return Truth::from_bool(op.holds(a.cmp(b)));
        }

        match op {
            CmpOp::Lt => {
                if self.high < other.low {
                    Truth::True
                } else if self.low >= other.high {
                    Truth::False
                } else {
                    Truth::Unknown
                }
            }
            CmpOp::Le => {
                if self.high <= other.low {
                    Truth::True
                } else if self.low > other.high {
                    Truth::False
                } else {
                    Truth::Unknown
                }
            }
            CmpOp::Gt => other.compare(CmpOp::Lt, self),
            CmpOp::Ge => other.compare(CmpOp::Le, self),
            CmpOp::Eq => {
                if self.high < other.low || other.high < self.low {
                    Truth::False
                } else if self.is_point() && other.is_point() {
                    Truth::True
                } else {
                    Truth::Unknown
                }
            }
            CmpOp::Ne => !self.compare(CmpOp::Eq, other),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}
