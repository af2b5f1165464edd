//! Authorization digests
//!
//! Two digest flavors are used by the engine:
//!
//! - **Onboarding**: binds (engine, owner, agent) so a trusted-authority
//!   signature registers exactly one agent for one owner on one
//!   deployment.
//! - **Swap authorization**: binds every economically relevant field of
//!   a swap plus the current nonce and the engine identity, so a signed
//!   instruction can neither be replayed nor repurposed.
//!
//! Both are Keccak-256 over a domain tag followed by fixed-width field
//! encodings (addresses raw, amounts big-endian u128, nonce big-endian
//! u64).

use agentvault_types::{Address, Amount};
use serde::{Deserialize, Serialize};
use sha3::{Digest as _, Keccak256};
use std::fmt;

/// Domain tag for agent-onboarding digests
const ONBOARD_DOMAIN: &[u8] = b"AGENTVAULT_ONBOARD_V1";

/// Domain tag for per-swap authorization digests
const SWAP_DOMAIN: &[u8] = b"AGENTVAULT_SWAP_V1";

/// A 32-byte message digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageDigest(pub [u8; 32]);

impl MessageDigest {
    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for MessageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Keccak-256 of arbitrary bytes
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Digest signed by the trusted authority to onboard an agent
///
/// Binds the engine's own identity to prevent cross-deployment replay.
pub fn onboarding_digest(engine: &Address, owner: &Address, agent: &Address) -> MessageDigest {
    let mut hasher = Keccak256::new();
    hasher.update(ONBOARD_DOMAIN);
    hasher.update(engine.as_bytes());
    hasher.update(owner.as_bytes());
    hasher.update(agent.as_bytes());
    MessageDigest(hasher.finalize().into())
}

/// Digest signed by the agent to authorize one specific swap
#[allow(clippy::too_many_arguments)]
pub fn swap_digest(
    engine: &Address,
    owner: &Address,
    agent: &Address,
    venue: &Address,
    input_asset: &Address,
    output_asset: &Address,
    input_amount: Amount,
    min_output: Amount,
    nonce: u64,
) -> MessageDigest {
    let mut hasher = Keccak256::new();
    hasher.update(SWAP_DOMAIN);
    hasher.update(engine.as_bytes());
    hasher.update(owner.as_bytes());
    hasher.update(agent.as_bytes());
    hasher.update(venue.as_bytes());
    hasher.update(input_asset.as_bytes());
    hasher.update(output_asset.as_bytes());
    hasher.update(input_amount.value().to_be_bytes());
    hasher.update(min_output.value().to_be_bytes());
    hasher.update(nonce.to_be_bytes());
    MessageDigest(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    #[test]
    fn test_onboarding_digest_is_deterministic() {
        let a = onboarding_digest(&addr(1), &addr(2), &addr(3));
        let b = onboarding_digest(&addr(1), &addr(2), &addr(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_onboarding_digest_binds_engine() {
        let a = onboarding_digest(&addr(1), &addr(2), &addr(3));
        let b = onboarding_digest(&addr(9), &addr(2), &addr(3));
        assert_ne!(a, b);
    }

    #[test]
    fn test_swap_digest_binds_every_field() {
        let base = swap_digest(
            &addr(1),
            &addr(2),
            &addr(3),
            &addr(4),
            &addr(5),
            &addr(6),
            Amount::new(1000),
            Amount::new(25),
            0,
        );
        let different_nonce = swap_digest(
            &addr(1),
            &addr(2),
            &addr(3),
            &addr(4),
            &addr(5),
            &addr(6),
            Amount::new(1000),
            Amount::new(25),
            1,
        );
        let different_amount = swap_digest(
            &addr(1),
            &addr(2),
            &addr(3),
            &addr(4),
            &addr(5),
            &addr(6),
            Amount::new(1001),
            Amount::new(25),
            0,
        );
        assert_ne!(base, different_nonce);
        assert_ne!(base, different_amount);
    }

    #[test]
    fn test_domains_are_separated() {
        // An onboarding digest can never collide with a swap digest even
        // over identical address material.
        let onboard = onboarding_digest(&addr(1), &addr(2), &addr(3));
        let swap = swap_digest(
            &addr(1),
            &addr(2),
            &addr(3),
            &addr(3),
            &addr(3),
            &addr(3),
            Amount::ZERO,
            Amount::ZERO,
            0,
        );
        assert_ne!(onboard, swap);
    }
}
