//! Recoverable ECDSA signatures
//!
//! The verifier contract is a single pure function: given a digest and a
//! 65-byte r‖s‖v signature, return the address that produced it or a
//! verification failure. Callers compare the recovered address against
//! the identity they expect; the signature itself never names a signer.

use crate::{address_of, CryptoError, CryptoResult, MessageDigest};
use agentvault_types::Address;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A 65-byte recoverable signature (r ‖ s ‖ v)
#[derive(Clone, PartialEq, Eq)]
pub struct RecoverableSignature {
    bytes: [u8; 65],
}

impl RecoverableSignature {
    /// Assemble from signature components
    pub fn from_parts(signature: EcdsaSignature, recovery_id: RecoveryId) -> Self {
        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = recovery_id.to_byte();
        Self { bytes }
    }

    /// Parse from raw bytes; the recovery byte may be 0/1 or 27/28
    pub fn from_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != 65 {
            return Err(CryptoError::MalformedSignature(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }
        let mut out = [0u8; 65];
        out.copy_from_slice(bytes);
        // Normalize the Ethereum-style 27/28 recovery byte.
        if out[64] >= 27 {
            out[64] -= 27;
        }
        if out[64] > 3 {
            return Err(CryptoError::MalformedSignature(format!(
                "recovery byte out of range: {}",
                bytes[64]
            )));
        }
        Ok(Self { bytes: out })
    }

    /// Raw r ‖ s ‖ v bytes
    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.bytes
    }

    /// Recover the address that signed the digest
    pub fn recover(&self, digest: &MessageDigest) -> CryptoResult<Address> {
        let signature = EcdsaSignature::from_slice(&self.bytes[..64])
            .map_err(|e| CryptoError::MalformedSignature(e.to_string()))?;
        let recovery_id = RecoveryId::from_byte(self.bytes[64]).ok_or_else(|| {
            CryptoError::MalformedSignature(format!(
                "recovery byte out of range: {}",
                self.bytes[64]
            ))
        })?;
        let key = VerifyingKey::recover_from_prehash(digest.as_bytes(), &signature, recovery_id)
            .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
        Ok(address_of(&key))
    }
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoverableSignature(0x{})", hex::encode(self.bytes))
    }
}

impl fmt::Display for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.bytes))
    }
}

impl Serialize for RecoverableSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RecoverableSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(s).map_err(D::Error::custom)?;
        Self::from_bytes(&bytes).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{onboarding_digest, KeyPair};

    fn addr(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    #[test]
    fn test_sign_and_recover() {
        let keypair = KeyPair::generate();
        let digest = onboarding_digest(&addr(1), &addr(2), &addr(3));

        let signature = keypair.sign_digest(&digest).unwrap();
        let recovered = signature.recover(&digest).unwrap();
        assert_eq!(recovered, keypair.address());
    }

    #[test]
    fn test_wrong_digest_recovers_different_address() {
        let keypair = KeyPair::generate();
        let digest = onboarding_digest(&addr(1), &addr(2), &addr(3));
        let other = onboarding_digest(&addr(1), &addr(2), &addr(4));

        let signature = keypair.sign_digest(&digest).unwrap();
        // Recovery over the wrong digest yields some address, but never
        // the signer's.
        match signature.recover(&other) {
            Ok(recovered) => assert_ne!(recovered, keypair.address()),
            Err(_) => {}
        }
    }

    #[test]
    fn test_bad_length_rejected() {
        assert!(matches!(
            RecoverableSignature::from_bytes(&[0u8; 64]),
            Err(CryptoError::MalformedSignature(_))
        ));
    }

    #[test]
    fn test_ethereum_style_recovery_byte_accepted() {
        let keypair = KeyPair::generate();
        let digest = onboarding_digest(&addr(1), &addr(2), &addr(3));
        let signature = keypair.sign_digest(&digest).unwrap();

        let mut raw = *signature.as_bytes();
        raw[64] += 27;
        let reparsed = RecoverableSignature::from_bytes(&raw).unwrap();
        assert_eq!(reparsed.recover(&digest).unwrap(), keypair.address());
    }

    #[test]
    fn test_serde_roundtrip() {
        let keypair = KeyPair::generate();
        let digest = onboarding_digest(&addr(1), &addr(2), &addr(3));
        let signature = keypair.sign_digest(&digest).unwrap();

        let json = serde_json::to_string(&signature).unwrap();
        let back: RecoverableSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, signature);
    }
}
