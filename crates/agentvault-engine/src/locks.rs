//! Trade locks
//!
//! A per-(owner, agent) mutual-exclusion flag, true exactly while a swap
//! for that pair is mid-execution. This models the business-level
//! exclusivity invariant; the engine-wide reentrancy guard in
//! [`crate::Engine`] is a separate safety mechanism.
//!
//! A lock left set by an action that never reached its own cleanup is
//! not self-healing: recovery is the administrator's explicit
//! force-clear.

use agentvault_types::{Address, Result, VaultError};
use dashmap::DashSet;

/// Per-(owner, agent) exclusivity flags
#[derive(Default)]
pub struct TradeLocks {
    locked: DashSet<(Address, Address)>,
}

impl TradeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a swap for the pair is mid-execution
    pub fn is_locked(&self, owner: &Address, agent: &Address) -> bool {
        self.locked.contains(&(*owner, *agent))
    }

    /// Acquire the lock, failing if it is already held
    pub fn try_acquire(&self, owner: Address, agent: Address) -> Result<()> {
        if self.locked.insert((owner, agent)) {
            Ok(())
        } else {
            Err(VaultError::TradeInProgress { owner, agent })
        }
    }

    /// Release the lock on completion or rollback
    pub fn release(&self, owner: &Address, agent: &Address) {
        self.locked.remove(&(*owner, *agent));
    }

    /// Administrative override; returns whether a lock was actually set
    pub fn force_clear(&self, owner: &Address, agent: &Address) -> bool {
        self.locked.remove(&(*owner, *agent)).is_some()
    }
}
