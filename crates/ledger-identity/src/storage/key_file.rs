//! Party key files — encrypted signing keys.
//!
//! A key file stores a party's Ed25519 secret key encrypted with
//! ChaCha20-Poly1305 under a key derived from a passphrase via Argon2id,
//! alongside the public [`Party`] in plaintext so it can be read without
//! the passphrase.
//!
//! File format (JSON):
//! ```json
//! {
//!     "version": 1,
//!     "format": "lid-key-v1",
//!     "encryption": {
//!         "algorithm": "chacha20-poly1305",
//!         "kdf": "argon2id",
//!         "salt": "<base64-16-bytes>",
//!         "nonce": "<base64-12-bytes>"
//!     },
//!     "encrypted_key": "<base64-ciphertext>",
//!     "party": { "name": "...", "owning_key": "<base64>" },
//!     "created_at": 1700000000000000
//! }
//! ```

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::crypto::sealing::{self, Sealed};
use crate::error::{LedgerError, Result};
use crate::party::{LocalIdentity, Party};

// ── File format constants ─────────────────────────────────────────────────────

const KEY_FILE_VERSION: u32 = 1;
const KEY_FILE_FORMAT: &str = "lid-key-v1";
const KEY_FILE_ALGORITHM: &str = "chacha20-poly1305";
const KEY_FILE_KDF: &str = "argon2id";

// ── On-disk structures ────────────────────────────────────────────────────────

/// Top-level structure written to disk as a key file.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyFile {
    pub version: u32,
    pub format: String,
    pub encryption: EncryptionMetadata,
    /// Base64-encoded ciphertext of the secret key.
    pub encrypted_key: String,
    /// Public party (no private key material).
    pub party: Party,
    /// Creation timestamp (microseconds since Unix epoch).
    pub created_at: u64,
}

/// Encryption metadata stored alongside the ciphertext.
#[derive(Debug, Serialize, Deserialize)]
pub struct EncryptionMetadata {
    pub algorithm: String,
    pub kdf: String,
    /// Base64-encoded Argon2id salt (16 bytes).
    pub salt: String,
    /// Base64-encoded ChaCha20-Poly1305 nonce (12 bytes).
    pub nonce: String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Save `identity` to a key file, encrypting the secret key with `passphrase`.
///
/// The file is written atomically.
pub fn save_identity(identity: &LocalIdentity, path: &Path, passphrase: &str) -> Result<()> {
    let mut secret = identity.secret_bytes();
    let sealed = sealing::seal(passphrase, &secret);
    secret.zeroize();
    let sealed = sealed?;

    let file = KeyFile {
        version: KEY_FILE_VERSION,
        format: KEY_FILE_FORMAT.to_string(),
        encryption: EncryptionMetadata {
            algorithm: KEY_FILE_ALGORITHM.to_string(),
            kdf: KEY_FILE_KDF.to_string(),
            salt: STANDARD.encode(sealed.salt),
            nonce: STANDARD.encode(sealed.nonce),
        },
        encrypted_key: STANDARD.encode(&sealed.ciphertext),
        party: identity.party(),
        created_at: identity.created_at,
    };

    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| LedgerError::SerializationError(e.to_string()))?;
    super::write_atomic(path, json.as_bytes())?;
    log::debug!("saved key file for {} to {}", identity.name(), path.display());
    Ok(())
}

/// Load an identity from a key file, decrypting with `passphrase`.
///
/// A wrong passphrase yields `LedgerError::InvalidPassphrase`.
pub fn load_identity(path: &Path, passphrase: &str) -> Result<LocalIdentity> {
    let file = read_key_file(path)?;

    let salt: [u8; 16] = decode_fixed(&file.encryption.salt, "salt")?;
    let nonce: [u8; 12] = decode_fixed(&file.encryption.nonce, "nonce")?;
    let ciphertext = STANDARD
        .decode(&file.encrypted_key)
        .map_err(|e| LedgerError::InvalidFileFormat(format!("invalid ciphertext base64: {e}")))?;

    let mut plaintext = sealing::unseal(
        passphrase,
        &Sealed {
            salt,
            nonce,
            ciphertext,
        },
    )?;
    let secret: std::result::Result<[u8; 32], _> = plaintext.as_slice().try_into();
    plaintext.zeroize();
    let mut secret =
        secret.map_err(|_| LedgerError::InvalidKey("secret key must be 32 bytes".to_string()))?;

    let identity = LocalIdentity::from_parts(file.party.name.clone(), &secret, file.created_at);
    secret.zeroize();

    if identity.public_key() != file.party.owning_key {
        return Err(LedgerError::InvalidKey(
            "decrypted key does not match the stored party".to_string(),
        ));
    }
    Ok(identity)
}

/// Read only the public party from a key file. No passphrase needed.
pub fn read_party(path: &Path) -> Result<Party> {
    Ok(read_key_file(path)?.party)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_key_file(path: &Path) -> Result<KeyFile> {
    if !path.exists() {
        return Err(LedgerError::NotFound(format!(
            "key file not found: {}",
            path.display()
        )));
    }
    let bytes = std::fs::read(path)?;
    let file: KeyFile = serde_json::from_slice(&bytes)
        .map_err(|e| LedgerError::InvalidFileFormat(format!("failed to parse key file: {e}")))?;
    if file.version != KEY_FILE_VERSION || file.format != KEY_FILE_FORMAT {
        return Err(LedgerError::InvalidFileFormat(format!(
            "unsupported key file version={} format={}",
            file.version, file.format,
        )));
    }
    Ok(file)
}

fn decode_fixed<const N: usize>(encoded: &str, what: &str) -> Result<[u8; N]> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| LedgerError::InvalidFileFormat(format!("invalid {what} base64: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| LedgerError::InvalidFileFormat(format!("{what} must be {N} bytes")))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
