//! Local identity — a party's key pair held by the process acting for it.
//!
//! There is no ambient "current identity": operations that sign or need to
//! know who is acting take a `&LocalIdentity` explicitly.

use ed25519_dalek::SigningKey;

use crate::crypto::keys::KeyPair;
use crate::crypto::signing;
use crate::hash::SecureHash;

use super::{AbstractParty, AnonymousParty, Party, PublicKey};

/// A named party together with its signing key.
pub struct LocalIdentity {
    key_pair: KeyPair,
    name: String,
    /// Creation timestamp (microseconds since Unix epoch).
    pub created_at: u64,
}

impl LocalIdentity {
    /// Create a new identity with a fresh key pair.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            key_pair: KeyPair::generate(),
            name: name.into(),
            created_at: crate::time::now_micros(),
        }
    }

    /// Rebuild an identity from stored parts.
    pub fn from_parts(name: impl Into<String>, secret_key: &[u8; 32], created_at: u64) -> Self {
        Self {
            key_pair: KeyPair::from_secret_bytes(secret_key),
            name: name.into(),
            created_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_verifying_key(&self.key_pair.verifying_key())
    }

    pub fn signing_key(&self) -> &SigningKey {
        self.key_pair.signing_key()
    }

    /// Secret key bytes. Callers must zeroize the copy when done.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.key_pair.secret_bytes()
    }

    /// The well-known party for this identity.
    pub fn party(&self) -> Party {
        Party::new(self.name.clone(), self.public_key())
    }

    pub fn anonymous(&self) -> AnonymousParty {
        AnonymousParty {
            owning_key: self.public_key(),
        }
    }

    /// Shorthand for `self.party().into()`.
    pub fn as_abstract(&self) -> AbstractParty {
        self.party().into()
    }

    /// Sign a transaction id, returning the base64 signature.
    pub fn sign_id(&self, id: &SecureHash) -> String {
        signing::sign_base64(self.signing_key(), id.as_bytes())
    }
}

impl std::fmt::Debug for LocalIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalIdentity")
            .field("name", &self.name)
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}
