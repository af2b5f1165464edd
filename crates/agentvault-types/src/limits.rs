//! Global security limits
//!
//! A single record, mutable only by the administrator. Both fields must
//! be non-zero whenever the record is updated.

use crate::Amount;
use serde::{Deserialize, Serialize};

/// Global per-swap security limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityLimits {
    /// Maximum allowed effective fee rate, in basis points
    pub max_fee_bps: u16,
    /// Maximum allowed input amount for a single swap
    pub max_swap_amount: Amount,
}

impl SecurityLimits {
    /// Create new limits
    pub fn new(max_fee_bps: u16, max_swap_amount: Amount) -> Self {
        Self {
            max_fee_bps,
            max_swap_amount,
        }
    }

    /// Whether both limits are set to usable (non-zero) values
    pub fn is_valid(&self) -> bool {
        self.max_fee_bps > 0 && !self.max_swap_amount.is_zero()
    }
}
