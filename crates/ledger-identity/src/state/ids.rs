//! Identifiers: type tags, chain ids and record references.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hash::{ContentHasher, Hashable, SecureHash};

/// Explicit type tag for a record type.
///
/// Tags are compared on resolution: a record stored under one tag never
/// resolves as another type, even if the payload would decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateType(pub String);

impl StateType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Hashable for StateType {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.str(&self.0);
    }
}

/// Chain identity: a UUID with an optional external id.
///
/// Equality, ordering and hashing use the UUID only; the external id is a
/// human-facing label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainId {
    pub id: Uuid,
    pub external_id: Option<String>,
}

impl ChainId {
    /// A fresh random chain id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            external_id: None,
        }
    }

    /// A fresh random chain id with an external label.
    pub fn with_external_id(external_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            external_id: Some(external_id.into()),
        }
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self {
            id,
            external_id: None,
        }
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ChainId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ChainId {}

impl Hash for ChainId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for ChainId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChainId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.external_id {
            Some(ext) => write!(f, "{ext}_{}", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

impl Hashable for ChainId {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.bytes(self.id.as_bytes());
    }
}

/// Reference to one exact record: the transaction that created it and
/// the output index within that transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordRef {
    pub tx_id: SecureHash,
    pub index: u32,
}

impl RecordRef {
    pub fn new(tx_id: SecureHash, index: u32) -> Self {
        Self { tx_id, index }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.tx_id, self.index)
    }
}

impl Hashable for RecordRef {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher
            .bytes(self.tx_id.as_bytes())
            .bytes(&self.index.to_be_bytes());
    }
}
