//! Content hashing for report digests and extra-data chunk pointers
//!
//! Every digest in the subsystem goes through this module: consensus report
//! digests, the data hash a processor compares against them, and the forward
//! pointers linking extra-data chunks. All of them are SHA-256.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// A 32-byte digest.
///
/// The all-zero value is reserved: as a consensus digest it means "no
/// report", as an extra-data pointer it marks the terminal chunk.
///
/// Human-readable formats carry it as a `0x`-prefixed hex string, binary
/// formats as the raw 32 bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash32(pub [u8; 32]);

impl Hash32 {
    /// The reserved all-zero digest
    pub const ZERO: Hash32 = Hash32([0u8; 32]);

    /// Digest of `data`
    pub fn of(data: &[u8]) -> Self {
        Self::of_parts(&[data])
    }

    /// Digest of the concatenation of `parts`
    pub fn of_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part);
        }
        Self(hasher.finalize().into())
    }

    /// Whether this is the reserved zero digest
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Read a digest from the first 32 bytes of `bytes`
    pub fn from_prefix(bytes: &[u8]) -> Option<Self> {
        let head: [u8; 32] = bytes.get(..32)?.try_into().ok()?;
        Some(Self(head))
    }

    /// Lowercase hex without prefix
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl FromStr for Hash32 {
    type Err = crate::OracleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw)
            .map_err(|e| crate::OracleError::invalid_config(format!("Invalid hash hex: {e}")))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| crate::OracleError::invalid_config("Hash must be 32 bytes"))?;
        Ok(Self(array))
    }
}

impl Serialize for Hash32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Hash32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            text.parse().map_err(serde::de::Error::custom)
        } else {
            <[u8; 32]>::deserialize(deserializer).map(Self)
        }
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}
