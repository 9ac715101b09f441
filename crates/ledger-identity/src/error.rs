//! Error types for ledger-identity.
//!
//! Errors follow the four failure classes of the system: construction
//! errors raised while building an entity, contract rule violations raised
//! by the verification engine, resolution errors raised by pointers, and
//! infrastructure errors (keys, signatures, storage). Nothing is retried
//! internally. Private key material is never included in error messages.

use crate::hash::SecureHash;
use crate::party::PublicKey;
use crate::state::{RecordRef, StateType};

/// A named contract rule that a proposed transaction failed.
///
/// The message is fixed per rule so callers can match on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Failed requirement: {rule}")]
pub struct RuleViolation {
    pub rule: &'static str,
}

impl RuleViolation {
    pub fn new(rule: &'static str) -> Self {
        Self { rule }
    }
}

/// Fails with `rule` when `condition` does not hold.
pub fn require(condition: bool, rule: &'static str) -> std::result::Result<(), RuleViolation> {
    if condition {
        Ok(())
    } else {
        Err(RuleViolation::new(rule))
    }
}

/// Errors raised while constructing an entity. Always fatal to that construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    #[error("Attestation metadata has {count} entries; at most {max} are allowed")]
    TooManyMetadataEntries { count: usize, max: usize },

    #[error("Attestation metadata key exceeds {max} characters: {key}")]
    MetadataKeyTooLong { key: String, max: usize },

    #[error("Attestation metadata value for key '{key}' exceeds {max} characters")]
    MetadataValueTooLong { key: String, max: usize },
}

/// Errors raised by the verification engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error(transparent)]
    Rule(#[from] RuleViolation),

    #[error("Expected exactly one {family} command, found {found}")]
    CommandCount { family: StateType, found: usize },

    #[error("Unrecognized command '{action}' for {family}")]
    UnrecognizedCommand { family: StateType, action: String },

    #[error("No contract registered for state type {0}")]
    UnrecognizedStateType(StateType),

    #[error("Failed to decode {state_type}: {reason}")]
    Decode { state_type: StateType, reason: String },
}

/// Errors raised while resolving a pointer.
///
/// A pointer that matches nothing is not an error; it resolves to `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("Ambiguous resolution: {count} records matched")]
    Ambiguous { count: usize },

    #[error("Invalid state type: expected {expected}, found {actual}")]
    InvalidStateType { expected: String, actual: String },

    #[error("Failed to decode state of type {state_type}: {reason}")]
    Undecodable { state_type: StateType, reason: String },

    #[error("Envelope column '{column}' of {state_type} does not match its payload")]
    InconsistentEnvelope {
        state_type: StateType,
        column: &'static str,
    },

    #[error("Query failed: {0}")]
    Query(String),
}

/// Crate-wide error type.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Missing signatures from: {}", format_keys(.0))]
    MissingSignatures(Vec<PublicKey>),

    #[error("Transaction id mismatch: expected {expected}, computed {computed}")]
    TransactionIdMismatch {
        expected: SecureHash,
        computed: SecureHash,
    },

    #[error("Record {reference} was already consumed by transaction {consumed_by}")]
    StateAlreadyConsumed {
        reference: RecordRef,
        consumed_by: SecureHash,
    },

    #[error("Input {reference} does not match the recorded state")]
    InputMismatch { reference: RecordRef },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RuleViolation> for LedgerError {
    fn from(violation: RuleViolation) -> Self {
        Self::Verification(VerificationError::Rule(violation))
    }
}

fn format_keys(keys: &[PublicKey]) -> String {
    keys.iter()
        .map(|k| k.fingerprint())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, LedgerError>;
