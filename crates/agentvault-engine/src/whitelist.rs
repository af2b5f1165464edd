//! Venue whitelist
//!
//! Per-(owner, agent) allow-list of (venue, entry-point selector)
//! pairs. Each tuple is toggled independently; allowing one selector of
//! a venue implies nothing about its other selectors.

use agentvault_types::{Address, Selector};
use dashmap::DashSet;

type Entry = (Address, Address, Address, Selector);

/// Per-tuple venue permissions
#[derive(Default)]
pub struct VenueWhitelist {
    allowed: DashSet<Entry>,
}

impl VenueWhitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether (owner, agent, venue, selector) is allowed
    pub fn is_allowed(
        &self,
        owner: &Address,
        agent: &Address,
        venue: &Address,
        selector: &Selector,
    ) -> bool {
        self.allowed.contains(&(*owner, *agent, *venue, *selector))
    }

    /// Toggle a single entry
    pub fn set(
        &self,
        owner: Address,
        agent: Address,
        venue: Address,
        selector: Selector,
        allowed: bool,
    ) {
        let entry = (owner, agent, venue, selector);
        if allowed {
            self.allowed.insert(entry);
        } else {
            self.allowed.remove(&entry);
        }
    }
}
