//! Cryptographic primitives.
//!
//! - Ed25519 key pairs for parties and transaction signatures
//! - Argon2id + ChaCha20-Poly1305 sealing of key material at rest

pub mod keys;
pub mod sealing;
pub mod signing;

pub use keys::KeyPair;
