//! Content hashing for claims, attestations and pointers.
//!
//! Hashes are SHA-256 over a literal field encoding, so two entities with
//! the same hashed fields always produce the same digest regardless of how
//! they were built:
//!
//! ```text
//! hash = SHA-256( field(domain) || field(f1) || field(f2) || ... )
//! field(bytes)    = u64-be(len(bytes)) || bytes
//! optional(None)  = 0x00
//! optional(x)     = 0x01 || encoding(x)
//! ```
//!
//! The domain tag separates claim, attestation and pointer hashes. Each
//! type writes its fields in a fixed order documented on its `hash` method.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{LedgerError, Result};

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecureHash([u8; 32]);

impl SecureHash {
    /// Hash arbitrary bytes.
    pub fn sha256(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a lowercase or uppercase hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| LedgerError::SerializationError(format!("invalid hash hex: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| LedgerError::SerializationError("hash must be 32 bytes".into()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for SecureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for SecureHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureHash({})", self.to_hex())
    }
}

impl Serialize for SecureHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SecureHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A value that knows how to write itself into a [`ContentHasher`].
pub trait Hashable {
    fn write_to(&self, hasher: &mut ContentHasher);
}

/// Incremental builder for content hashes using the literal field encoding.
pub struct ContentHasher {
    inner: Sha256,
}

impl ContentHasher {
    /// Start a hash in the given domain.
    pub fn new(domain: &str) -> Self {
        let mut hasher = Self {
            inner: Sha256::new(),
        };
        hasher.bytes(domain.as_bytes());
        hasher
    }

    /// Append a length-prefixed byte field.
    pub fn bytes(&mut self, field: &[u8]) -> &mut Self {
        self.inner.update((field.len() as u64).to_be_bytes());
        self.inner.update(field);
        self
    }

    /// Append a UTF-8 string field.
    pub fn str(&mut self, field: &str) -> &mut Self {
        self.bytes(field.as_bytes())
    }

    /// Append a JSON document in its compact textual form. Object keys
    /// are sorted, so equal documents always hash alike.
    pub fn json_value(&mut self, value: &serde_json::Value) -> &mut Self {
        self.str(&value.to_string())
    }

    /// Append a value that writes its own fields.
    pub fn update<T: Hashable + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.write_to(self);
        self
    }

    /// Append a single raw tag byte (used for presence and variant markers).
    pub fn tag(&mut self, tag: u8) -> &mut Self {
        self.inner.update([tag]);
        self
    }

    pub fn finish(self) -> SecureHash {
        SecureHash(self.inner.finalize().into())
    }
}

impl Hashable for SecureHash {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.bytes(&self.0);
    }
}

impl Hashable for str {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.str(self);
    }
}

impl Hashable for String {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.str(self);
    }
}

impl<T: Hashable> Hashable for Option<T> {
    fn write_to(&self, hasher: &mut ContentHasher) {
        match self {
            None => {
                hasher.tag(0);
            }
            Some(value) => {
                hasher.tag(1);
                value.write_to(hasher);
            }
        }
    }
}

impl<T: Hashable + ?Sized> Hashable for &T {
    fn write_to(&self, hasher: &mut ContentHasher) {
        (**self).write_to(hasher);
    }
}

impl<T: Hashable> Hashable for [T] {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.bytes(&(self.len() as u64).to_be_bytes());
        for item in self {
            item.write_to(hasher);
        }
    }
}

impl<T: Hashable> Hashable for Vec<T> {
    fn write_to(&self, hasher: &mut ContentHasher) {
        self.as_slice().write_to(hasher);
    }
}

impl Hashable for BTreeMap<String, String> {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.bytes(&(self.len() as u64).to_be_bytes());
        for (key, value) in self {
            hasher.str(key).str(value);
        }
    }
}

impl Hashable for bool {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.tag(u8::from(*self));
    }
}

macro_rules! impl_hashable_be_bytes {
    ($($ty:ty),*) => {
        $(
            impl Hashable for $ty {
                fn write_to(&self, hasher: &mut ContentHasher) {
                    hasher.bytes(&self.to_be_bytes());
                }
            }
        )*
    };
}

impl_hashable_be_bytes!(i32, i64, u32, u64);

// Bit pattern, so NaN, infinities and -0.0 each hash distinctly.
impl Hashable for f64 {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.bytes(&self.to_bits().to_be_bytes());
    }
}

impl Hashable for uuid::Uuid {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.bytes(self.as_bytes());
    }
}

impl Hashable for chrono::DateTime<chrono::Utc> {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher
            .bytes(&self.timestamp().to_be_bytes())
            .bytes(&self.timestamp_subsec_nanos().to_be_bytes());
    }
}

impl Hashable for serde_json::Value {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.json_value(self);
    }
}
