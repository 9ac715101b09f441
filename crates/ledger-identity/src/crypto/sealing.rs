//! Sealing of secret material at rest.
//!
//! A passphrase is stretched with Argon2id into a 32-byte key which seals
//! the plaintext with ChaCha20-Poly1305 under a fresh random nonce.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::{LedgerError, Result};

const ARGON2_M_COST: u32 = 65536; // KiB
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;

/// Output of [`seal`]: everything except the passphrase needed to unseal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub salt: [u8; 16],
    pub nonce: [u8; 12],
    pub ciphertext: Vec<u8>,
}

/// Stretch a passphrase into a symmetric key.
pub fn passphrase_key(passphrase: &[u8], salt: &[u8; 16]) -> Result<[u8; 32]> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(32))
        .map_err(|e| LedgerError::DerivationFailed(format!("argon2 params: {e}")))?;
    let mut key = [0u8; 32];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(passphrase, salt, &mut key)
        .map_err(|e| LedgerError::DerivationFailed(format!("argon2: {e}")))?;
    Ok(key)
}

/// Seal `plaintext` under `passphrase`.
pub fn seal(passphrase: &str, plaintext: &[u8]) -> Result<Sealed> {
    let mut salt = [0u8; 16];
    let mut nonce = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut nonce);

    let mut key = passphrase_key(passphrase.as_bytes(), &salt)?;
    let cipher = ChaCha20Poly1305::new_from_slice(&key)
        .map_err(|e| LedgerError::EncryptionFailed(format!("cipher init: {e}")))?;
    key.zeroize();

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| LedgerError::EncryptionFailed(format!("encrypt: {e}")))?;

    Ok(Sealed {
        salt,
        nonce,
        ciphertext,
    })
}

/// Unseal with `passphrase`. A wrong passphrase yields `InvalidPassphrase`.
pub fn unseal(passphrase: &str, sealed: &Sealed) -> Result<Vec<u8>> {
    let mut key = passphrase_key(passphrase.as_bytes(), &sealed.salt)?;
    let cipher = ChaCha20Poly1305::new_from_slice(&key)
        .map_err(|e| LedgerError::DecryptionFailed(format!("cipher init: {e}")))?;
    key.zeroize();

    cipher
        .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
        .map_err(|_| LedgerError::InvalidPassphrase)
}
