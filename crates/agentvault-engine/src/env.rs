//! External environment seam
//!
//! The engine never talks to assets or venues directly; it depends on
//! this capability trait. The venue side executes arbitrary untrusted
//! code, so the engine treats every call as adversarial: effects are
//! committed to the ledger before the call, outcomes are measured
//! empirically afterwards, and nested entry into the engine is rejected
//! by the reentrancy guard.

use agentvault_types::{Address, Amount};
use thiserror::Error;

/// Failures at the environment boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("approval failed: {0}")]
    Approve(String),

    #[error("venue call failed: {0}")]
    Call(String),
}

/// Capability interface over assets and venues
///
/// Implementations cover the real settlement layer in production and
/// scriptable doubles in tests (success, shortfall, outright failure,
/// and adversarial reentrant callbacks).
#[async_trait::async_trait]
pub trait ChainEnv: Send + Sync {
    /// Whether the address has deployed code (a plain key-controlled
    /// address can never be a legitimate venue)
    async fn has_code(&self, addr: Address) -> bool;

    /// Current asset balance held by `holder`
    async fn balance_of(&self, asset: Address, holder: Address) -> Amount;

    /// Pull assets from `from` into the engine's custody
    async fn transfer_in(
        &self,
        asset: Address,
        from: Address,
        amount: Amount,
    ) -> Result<(), EnvError>;

    /// Push assets from the engine's custody to `to`
    async fn transfer_out(
        &self,
        asset: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), EnvError>;

    /// Grant (or, with zero, revoke) a spending allowance over the
    /// engine's holdings of `asset` to `spender`
    async fn approve(
        &self,
        asset: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), EnvError>;

    /// Invoke the venue with an opaque instruction payload
    async fn call(&self, venue: Address, payload: &[u8]) -> Result<(), EnvError>;
}
