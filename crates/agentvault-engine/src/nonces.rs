//! Nonce store
//!
//! A strictly increasing, gapless counter per (owner, agent), used to
//! reject replays of signed swap instructions. A swap must carry exactly
//! the expected value; the counter advances once per successful swap and
//! is restored when an already-consumed action aborts, so a failed
//! action leaves the counter unchanged.

use agentvault_types::Address;
use dashmap::DashMap;

/// Per-(owner, agent) monotonic counters
#[derive(Default)]
pub struct NonceStore {
    nonces: DashMap<(Address, Address), u64>,
}

impl NonceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next valid nonce for the pair (0 before any swap)
    pub fn expected(&self, owner: &Address, agent: &Address) -> u64 {
        self.nonces
            .get(&(*owner, *agent))
            .map(|n| *n)
            .unwrap_or(0)
    }

    /// Advance the counter by exactly one
    pub fn advance(&self, owner: &Address, agent: &Address) {
        *self.nonces.entry((*owner, *agent)).or_insert(0) += 1;
    }

    /// Undo one advance while rolling back an aborted action
    pub fn restore(&self, owner: &Address, agent: &Address) {
        if let Some(mut n) = self.nonces.get_mut(&(*owner, *agent)) {
            *n = n.saturating_sub(1);
        }
    }
}
