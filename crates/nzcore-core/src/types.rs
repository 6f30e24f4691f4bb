//! Strong identifier types for nzcore.
//!
//! Chain and document ids are 32-byte values travelling as 64-character
//! lowercase hex on the wire; the newtypes keep the two from being mixed up
//! at compile time.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::bytes::{ct_eq, is_lower_hex};
use crate::crypto::{Blake2bHash, Ed25519PublicKey, CHAIN_DOMAIN, DOCUMENT_DOMAIN};
use crate::error::{Error, Result};

/// A 32-byte chain identifier, derived from the identity's public key.
///
/// Stable for the identity's lifetime: same mnemonic, same chain id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub [u8; 32]);

impl ChainId {
    /// Derive the chain id for a public key.
    pub fn derive(public_key: &Ed25519PublicKey) -> Self {
        Self(Blake2bHash::domain_hash(CHAIN_DOMAIN, public_key.as_bytes()).0)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to 64-character lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character lowercase hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        parse_hex32(s).map(Self).map_err(|e| match e {
            Error::InvalidKey(msg) => Error::InvalidKey(format!("chain id: {msg}")),
            other => other,
        })
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for ChainId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ChainId::from_hex(&s).map_err(D::Error::custom)
    }
}

/// A 32-byte document identifier.
///
/// Derived deterministically from `(chain id, parent hash, logical time)`;
/// two documents at the same position in the same chain share an id.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub [u8; 32]);

impl DocumentId {
    /// The genesis parent pointer (`"0" * 64` on the wire).
    pub const GENESIS: Self = Self([0u8; 32]);

    /// Derive a document id.
    ///
    /// The logical time is bound into the hash as a 32-bit little-endian
    /// integer, so times past `u32::MAX` cannot be encoded.
    pub fn derive(chain_id: &ChainId, parent: &DocumentId, logical_time: u64) -> Result<Self> {
        let time: u32 = logical_time.try_into().map_err(|_| {
            Error::LogicalTimeViolation(format!(
                "logical time {logical_time} exceeds the id-derivation bound {}",
                u32::MAX
            ))
        })?;
        let material = crate::bytes::merge(&[
            chain_id.as_bytes(),
            parent.as_bytes(),
            &time.to_le_bytes(),
        ]);
        Ok(Self(Blake2bHash::domain_hash(DOCUMENT_DOMAIN, &material).0))
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to 64-character lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 64-character lowercase hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        parse_hex32(s).map(Self).map_err(|e| match e {
            Error::InvalidKey(msg) => Error::InvalidKey(format!("document id: {msg}")),
            other => other,
        })
    }

    /// Constant-time equality against a wire-form hex string.
    pub fn matches_hex(&self, hex_str: &str) -> bool {
        ct_eq(self.to_hex().as_bytes(), hex_str.as_bytes())
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for DocumentId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DocumentId::from_hex(&s).map_err(D::Error::custom)
    }
}

fn parse_hex32(s: &str) -> Result<[u8; 32]> {
    if !is_lower_hex(s, 64) {
        return Err(Error::InvalidKey(
            "expected 64 lowercase hex characters".into(),
        ));
    }
    let bytes = hex::decode(s).map_err(|e| Error::InvalidKey(format!("hex decode: {e}")))?;
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}
