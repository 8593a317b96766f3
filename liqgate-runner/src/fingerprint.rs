//! Content hashes for audit records.
//!
//! BLAKE3 over the compact JSON form. Every hashed type serializes with a
//! fixed field order and no hash maps, so the bytes are stable across runs
//! and platforms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hex-encoded BLAKE3 digest of a value's JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash any serializable value.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<ContentHash, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(ContentHash::from_bytes(&json))
}
