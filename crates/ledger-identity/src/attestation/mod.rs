//! Attestations — one party witnessing a record on the ledger.
//!
//! An attestation points at the record it witnesses (a claim or any
//! other state) and records whether the attestor accepts or rejects it.
//! Attestor, chain id and the kind of pointer are fixed for the life of
//! the attestation chain; status, metadata and the exact witnessed
//! version may change on amendment.

#[allow(clippy::module_inception)]
pub mod attestation;
pub mod metadata;
pub mod pointer;

pub use attestation::{
    Attestation, AttestationAmendment, AttestationBuilder, AttestationImmutability,
    AttestationState, AttestationStatus,
};
pub use metadata::{
    Metadata, MAX_METADATA_ENTRIES, MAX_METADATA_KEY_LENGTH, MAX_METADATA_VALUE_LENGTH,
};
pub use pointer::AttestationPointer;
