//! AgentVault Engine - custodial execution for agent trading
//!
//! The engine custodies owner assets and lets authorized agents trade
//! them through whitelisted venues, without agents ever holding the
//! assets. Core pieces:
//!
//! - [`registry`]: (owner, agent) pairs onboarded by trusted-authority
//!   signature
//! - [`nonces`]: per-pair replay protection for signed swap instructions
//! - [`whitelist`]: per-pair (venue, selector) permissions
//! - [`locks`]: per-pair trade exclusivity
//! - [`calldata`]: instruction payload validation
//! - [`env`]: the capability seam to assets and venues
//! - [`engine`]: the pipeline tying it all together
//!
//! Balances live in an internal double-entry ledger
//! ([`agentvault_ledger`]); every successful state change is recorded in
//! a hash-chained audit log ([`agentvault_audit`]).

pub mod calldata;
pub mod engine;
pub mod env;
pub mod locks;
pub mod nonces;
pub mod registry;
pub mod whitelist;

pub use engine::{Engine, EngineConfig, SwapReceipt, SwapRequest};
pub use env::{ChainEnv, EnvError};
