//! Ed25519 signatures encoded as base64 strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use crate::error::{LedgerError, Result};

/// Sign `message` and return the base64-encoded signature.
pub fn sign_base64(signing_key: &SigningKey, message: &[u8]) -> String {
    STANDARD.encode(signing_key.sign(message).to_bytes())
}

/// Verify a base64-encoded signature over `message`.
pub fn verify_base64(verifying_key: &VerifyingKey, message: &[u8], signature: &str) -> Result<()> {
    let bytes = STANDARD
        .decode(signature)
        .map_err(|e| LedgerError::InvalidKey(format!("invalid base64 signature: {e}")))?;
    let bytes: [u8; 64] = bytes
        .try_into()
        .map_err(|_| LedgerError::InvalidKey("signature must be 64 bytes".into()))?;
    verifying_key
        .verify(message, &Signature::from_bytes(&bytes))
        .map_err(|_| LedgerError::SignatureInvalid)
}
