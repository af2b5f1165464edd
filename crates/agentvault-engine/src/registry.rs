//! Agent registry
//!
//! Records which agent identities are bound to which owner. The state
//! machine per (owner, agent) is Unregistered -> Registered, one-way;
//! the core has no unregister operation.

use agentvault_types::Address;
use dashmap::DashSet;

/// Per-(owner, agent) registration records
#[derive(Default)]
pub struct AgentRegistry {
    pairs: DashSet<(Address, Address)>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pair has completed onboarding
    pub fn is_registered(&self, owner: &Address, agent: &Address) -> bool {
        self.pairs.contains(&(*owner, *agent))
    }

    /// Transition the pair to Registered; returns false if it already was
    pub fn register(&self, owner: Address, agent: Address) -> bool {
        self.pairs.insert((owner, agent))
    }
}
