//! Error types for AgentVault
//!
//! Every failure aborts the entire action it occurred in; no partial
//! effects survive. All errors are surfaced synchronously to the caller.

use crate::{Address, Amount, Selector};
use thiserror::Error;

/// Result type for AgentVault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// AgentVault error taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    // ========================================================================
    // Authorization Errors
    // ========================================================================

    /// Caller lacks the required relationship to the (owner, agent) pair
    #[error("caller {caller} is not authorized for this operation")]
    Unauthorized { caller: Address },

    /// Signature malformed or does not recover to the expected signer
    #[error("signature does not recover to the expected signer")]
    InvalidSignature,

    /// Supplied nonce does not match the expected value
    #[error("invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    // ========================================================================
    // Venue Errors
    // ========================================================================

    /// (owner, agent, venue, selector) not in the whitelist
    #[error("venue {venue} selector {selector} is not whitelisted")]
    RouterNotWhitelisted { venue: Address, selector: Selector },

    /// Venue address has no deployed code
    #[error("venue {venue} has no deployed code")]
    RouterNotContract { venue: Address },

    /// Instruction payload failed validation
    #[error("invalid swap calldata: {message}")]
    InvalidSwapCalldata { message: String },

    /// External venue call failed or slippage limit was breached
    #[error("swap failed: {message}")]
    SwapFailed { message: String },

    // ========================================================================
    // Ledger Errors
    // ========================================================================

    /// Stored balance is less than requested
    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance {
        available: Amount,
        required: Amount,
    },

    /// Zero or otherwise unusable amount
    #[error("invalid amount: {message}")]
    InvalidAmount { message: String },

    /// Checked arithmetic overflowed
    #[error("amount overflow during arithmetic operation")]
    AmountOverflow,

    // ========================================================================
    // Identity Errors
    // ========================================================================

    /// The zero address was supplied where an identity is required
    #[error("zero address supplied for {field}")]
    ZeroAddress { field: &'static str },

    /// Withdrawal or sweep recipient is unusable
    #[error("invalid recipient")]
    InvalidRecipient,

    // ========================================================================
    // Limit Errors
    // ========================================================================

    /// Effective fee rate exceeds the configured maximum
    #[error("fee rate {fee_bps} bps exceeds maximum {max_bps} bps")]
    FeeTooHigh { fee_bps: u16, max_bps: u16 },

    /// Requested input amount exceeds the per-swap maximum
    #[error("input amount {requested} exceeds per-swap maximum {max}")]
    ExceedsMaxSwapAmount { requested: Amount, max: Amount },

    // ========================================================================
    // Execution Errors
    // ========================================================================

    /// A swap for this (owner, agent) pair is already mid-execution
    #[error("trade already in progress for owner {owner}, agent {agent}")]
    TradeInProgress { owner: Address, agent: Address },

    /// Nested entry into a balance-affecting operation
    #[error("reentrant call rejected")]
    ReentrantCall,

    /// The global pause switch is engaged
    #[error("engine is paused")]
    Paused,

    /// Asset movement at the environment boundary failed
    #[error("asset transfer failed: {message}")]
    TransferFailed { message: String },
}
