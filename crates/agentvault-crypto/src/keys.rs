//! Key pairs and address derivation
//!
//! Keys live entirely with off-chain callers (owners, agents, the
//! trusted authority). The engine itself only ever sees addresses and
//! signatures.

use crate::{keccak256, CryptoError, CryptoResult, MessageDigest, RecoverableSignature};
use agentvault_types::Address;
use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;

/// A secp256k1 key pair for signing authorization digests
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Create from existing signing key bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> CryptoResult<Self> {
        let signing_key = SigningKey::from_bytes(bytes.into())
            .map_err(|e| CryptoError::InvalidKeyFormat(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// The address this key pair signs as
    pub fn address(&self) -> Address {
        address_of(self.signing_key.verifying_key())
    }

    /// Sign a prehashed digest, producing a recoverable signature
    pub fn sign_digest(&self, digest: &MessageDigest) -> CryptoResult<RecoverableSignature> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest.as_bytes())
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        Ok(RecoverableSignature::from_parts(signature, recovery_id))
    }

    /// The signing key bytes (for secure storage only!)
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }
}

/// Derive the 20-byte address of a public key
///
/// Last 20 bytes of Keccak-256 over the uncompressed point with the tag
/// byte stripped.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    Address::new(out)
}
