//! AgentVault Crypto - Signature verification for the vault engine
//!
//! This crate provides:
//! - Keccak-256 authorization digests (agent onboarding, per-swap)
//! - Recoverable secp256k1 ECDSA signatures (signer identity is
//!   recovered from digest + signature, never supplied alongside)
//! - Address derivation from public keys
//! - Key pairs for callers and tests
//!
//! Everything here is pure computation with no side effects, so it can
//! be property-tested independently of the ledger logic.
//!
//! # Security Invariant
//!
//! **The engine never stores private keys.** Key pairs exist only for
//! off-chain callers; the core consumes signatures and digests.

pub mod digest;
pub mod keys;
pub mod signature;

pub use digest::*;
pub use keys::*;
pub use signature::*;

use thiserror::Error;

/// Cryptographic errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("recovery failed: {0}")]
    RecoveryFailed(String),

    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
