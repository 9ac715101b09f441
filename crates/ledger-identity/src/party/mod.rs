//! Parties — the keys that own, issue and witness ledger records.
//!
//! A record names its parties as [`AbstractParty`] values: a well-known
//! [`Party`] (name + key), an [`AnonymousParty`] (key only), or an
//! [`AccountParty`] acting on behalf of an account record.

pub mod account_party;
pub mod identity;

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::crypto::keys::verifying_key_from_bytes;
use crate::error::{LedgerError, Result};
use crate::hash::{ContentHasher, Hashable};

pub use account_party::AccountParty;
pub use identity::LocalIdentity;

/// An Ed25519 public key. Serialized as base64.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        Self(key.to_bytes())
    }

    pub fn from_base64(s: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| LedgerError::InvalidKey(format!("invalid base64 public key: {e}")))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| LedgerError::InvalidKey("public key must be 32 bytes".into()))?;
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn to_verifying_key(&self) -> Result<VerifyingKey> {
        verifying_key_from_bytes(&self.0)
    }

    /// Short hex fingerprint for logs and error messages.
    pub fn fingerprint(&self) -> String {
        hex::encode(&Sha256::digest(self.0)[..8])
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base64())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.fingerprint())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base64(&s).map_err(serde::de::Error::custom)
    }
}

impl Hashable for PublicKey {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.bytes(&self.0);
    }
}

/// A party known by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub owning_key: PublicKey,
}

impl Party {
    pub fn new(name: impl Into<String>, owning_key: PublicKey) -> Self {
        Self {
            name: name.into(),
            owning_key,
        }
    }

    /// The same key without the name.
    pub fn anonymise(&self) -> AnonymousParty {
        AnonymousParty {
            owning_key: self.owning_key,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A party known only by its key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnonymousParty {
    pub owning_key: PublicKey,
}

/// Any party that can appear on a ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbstractParty {
    WellKnown(Party),
    Anonymous(AnonymousParty),
    Account(AccountParty),
}

impl AbstractParty {
    /// The key that must sign on this party's behalf.
    pub fn owning_key(&self) -> &PublicKey {
        match self {
            Self::WellKnown(p) => &p.owning_key,
            Self::Anonymous(p) => &p.owning_key,
            Self::Account(p) => &p.owning_key,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::WellKnown(p) => Some(&p.name),
            Self::Anonymous(_) => None,
            Self::Account(p) => p.name.as_deref(),
        }
    }
}

impl fmt::Display for AbstractParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WellKnown(p) => write!(f, "{}", p.name),
            Self::Anonymous(p) => write!(f, "anonymous:{}", p.owning_key.fingerprint()),
            Self::Account(p) => write!(f, "account:{}", p.account_chain_id),
        }
    }
}

impl From<Party> for AbstractParty {
    fn from(party: Party) -> Self {
        Self::WellKnown(party)
    }
}

impl From<AnonymousParty> for AbstractParty {
    fn from(party: AnonymousParty) -> Self {
        Self::Anonymous(party)
    }
}

impl From<AccountParty> for AbstractParty {
    fn from(party: AccountParty) -> Self {
        Self::Account(party)
    }
}

impl Hashable for AbstractParty {
    fn write_to(&self, hasher: &mut ContentHasher) {
        match self {
            Self::WellKnown(p) => {
                hasher.tag(0).update(&p.owning_key).str(&p.name);
            }
            Self::Anonymous(p) => {
                hasher.tag(1).update(&p.owning_key);
            }
            Self::Account(p) => {
                hasher
                    .tag(2)
                    .update(&p.owning_key)
                    .update(&p.name)
                    .update(&p.account_type)
                    .update(&p.account_chain_id);
            }
        }
    }
}

/// Deduplicate a participant list while keeping first-seen order.
pub fn dedup_participants(parties: impl IntoIterator<Item = AbstractParty>) -> Vec<AbstractParty> {
    let mut out: Vec<AbstractParty> = Vec::new();
    for party in parties {
        if !out.contains(&party) {
            out.push(party);
        }
    }
    out
}
