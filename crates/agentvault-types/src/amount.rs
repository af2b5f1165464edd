//! Asset amounts with checked arithmetic
//!
//! Amounts are plain non-negative integers in the asset's smallest unit.
//! All arithmetic is checked; overflow surfaces as an explicit error at
//! the call site rather than wrapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative asset quantity in smallest units
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Amount(pub u128);

impl Amount {
    /// The zero amount
    pub const ZERO: Amount = Amount(0);

    /// Create a new amount
    pub fn new(value: u128) -> Self {
        Self(value)
    }

    /// Whether the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction; `None` when the result would be negative
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Raw value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}
