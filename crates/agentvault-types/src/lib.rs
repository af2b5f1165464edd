//! AgentVault Types - Canonical domain types for the vault engine
//!
//! This crate is the foundation layer: strongly typed identities, amounts,
//! entry-point selectors, security limits, and the complete failure
//! taxonomy. It has no dependencies on other agentvault crates.
//!
//! # Invariants
//!
//! 1. Amounts are non-negative integers with checked arithmetic only
//! 2. The zero address is never a valid owner, agent, asset, or venue
//! 3. Every failure is explicit - nothing is silently swallowed

pub mod address;
pub mod amount;
pub mod error;
pub mod limits;
pub mod selector;

pub use address::*;
pub use amount::*;
pub use error::*;
pub use limits::*;
pub use selector::*;
