//! Entry-point selectors
//!
//! A selector is the first four bytes of a venue instruction payload and
//! names the entry point being invoked. Whitelisting is keyed on
//! (owner, agent, venue, selector) - there is no implicit inheritance
//! between selectors of the same venue.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 4-byte entry-point selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// Create from raw bytes
    pub fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Extract the selector from the head of a payload, if long enough
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        let head: [u8; 4] = payload.get(..4)?.try_into().ok()?;
        Some(Self(head))
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Selector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        let head: [u8; 4] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| format!("selector must be 4 bytes, got {}", bytes.len()))?;
        Ok(Self(head))
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
