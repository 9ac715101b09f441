//! The attestation record and its amendment semantics.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConstructionError;
use crate::hash::{ContentHasher, SecureHash};
use crate::party::{dedup_participants, AbstractParty};
use crate::pointer::Pointer;
use crate::state::{ChainId, ChainedState, ContractState, LinearState, RecordRef, StateType};

use super::metadata::Metadata;
use super::pointer::AttestationPointer;

/// Query column names written by attestations.
pub const FIELD_ATTESTOR: &str = "attestation.attestor";
pub const FIELD_POINTER: &str = "attestation.pointer";
pub const FIELD_STATUS: &str = "attestation.status";

/// Whether the attestor vouches for or disputes the witnessed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    #[default]
    Accepted,
    Rejected,
}

impl fmt::Display for AttestationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for AttestationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown attestation status: {other}")),
        }
    }
}

/// `attestor` witnesses the record `pointer` refers to, on behalf of `attestees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attestation<T> {
    attestor: AbstractParty,
    attestees: BTreeSet<AbstractParty>,
    pointer: AttestationPointer<T>,
    status: AttestationStatus,
    metadata: Metadata,
    chain_id: ChainId,
    previous_record_ref: Option<RecordRef>,
}

impl<T: ContractState> Attestation<T> {
    /// Start building an attestation of `pointer`.
    pub fn builder(
        attestor: impl Into<AbstractParty>,
        pointer: AttestationPointer<T>,
    ) -> AttestationBuilder<T> {
        AttestationBuilder::new(attestor, pointer)
    }

    /// Attest `pointer` with `status` and no metadata.
    pub fn witness(
        attestor: impl Into<AbstractParty>,
        attestees: impl IntoIterator<Item = AbstractParty>,
        pointer: AttestationPointer<T>,
        status: AttestationStatus,
    ) -> Self {
        Self {
            attestor: attestor.into(),
            attestees: attestees.into_iter().collect(),
            pointer,
            status,
            metadata: Metadata::empty(),
            chain_id: ChainId::new(),
            previous_record_ref: None,
        }
    }

    pub fn attestor(&self) -> &AbstractParty {
        &self.attestor
    }

    pub fn attestees(&self) -> &BTreeSet<AbstractParty> {
        &self.attestees
    }

    pub fn pointer(&self) -> &AttestationPointer<T> {
        &self.pointer
    }

    pub fn status(&self) -> AttestationStatus {
        self.status
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Content hash over, in order: attestor, pointer hash, previous
    /// record reference. Status and metadata are not hashed.
    pub fn compute_hash(&self) -> SecureHash {
        let mut hasher = ContentHasher::new("ledger-identity/attestation");
        hasher
            .update(&self.attestor)
            .update(&self.pointer.hash())
            .update(&self.previous_record_ref);
        hasher.finish()
    }

    /// The query columns an attestation contributes. Derived attestation
    /// types should return these from their own `query_fields`.
    pub fn attestation_query_fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                FIELD_ATTESTOR.to_string(),
                self.attestor.owning_key().to_base64(),
            ),
            (FIELD_POINTER.to_string(), self.pointer.hash().to_hex()),
            (FIELD_STATUS.to_string(), self.status.to_string()),
        ])
    }

    /// A new version linked to `previous_record_ref`.
    pub fn amend(
        &self,
        previous_record_ref: RecordRef,
        amendment: AttestationAmendment<T>,
    ) -> Self {
        Self {
            attestor: self.attestor.clone(),
            attestees: self.attestees.clone(),
            pointer: amendment.pointer.unwrap_or_else(|| self.pointer.clone()),
            status: amendment.status,
            metadata: amendment.metadata,
            chain_id: self.chain_id.clone(),
            previous_record_ref: Some(previous_record_ref),
        }
    }
}

/// The mutable part of an attestation, as supplied to `amend`.
///
/// The pointer defaults to the current one; metadata defaults to empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AttestationAmendment<T> {
    pub status: AttestationStatus,
    pub pointer: Option<AttestationPointer<T>>,
    pub metadata: Metadata,
}

impl<T: ContractState> AttestationAmendment<T> {
    pub fn new(status: AttestationStatus) -> Self {
        Self {
            status,
            pointer: None,
            metadata: Metadata::empty(),
        }
    }

    pub fn pointer(mut self, pointer: AttestationPointer<T>) -> Self {
        self.pointer = Some(pointer);
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Builder for new attestations. Metadata limits are checked in `build`.
pub struct AttestationBuilder<T> {
    attestor: AbstractParty,
    attestees: BTreeSet<AbstractParty>,
    pointer: AttestationPointer<T>,
    status: AttestationStatus,
    metadata: BTreeMap<String, String>,
    chain_id: Option<ChainId>,
}

impl<T: ContractState> AttestationBuilder<T> {
    pub fn new(attestor: impl Into<AbstractParty>, pointer: AttestationPointer<T>) -> Self {
        Self {
            attestor: attestor.into(),
            attestees: BTreeSet::new(),
            pointer,
            status: AttestationStatus::Accepted,
            metadata: BTreeMap::new(),
            chain_id: None,
        }
    }

    pub fn attestee(mut self, attestee: impl Into<AbstractParty>) -> Self {
        self.attestees.insert(attestee.into());
        self
    }

    pub fn attestees(mut self, attestees: impl IntoIterator<Item = AbstractParty>) -> Self {
        self.attestees.extend(attestees);
        self
    }

    pub fn status(mut self, status: AttestationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn build(self) -> Result<Attestation<T>, ConstructionError> {
        Ok(Attestation {
            attestor: self.attestor,
            attestees: self.attestees,
            pointer: self.pointer,
            status: self.status,
            metadata: Metadata::new(self.metadata)?,
            chain_id: self.chain_id.unwrap_or_default(),
            previous_record_ref: None,
        })
    }
}

impl<T: ContractState> ContractState for Attestation<T> {
    fn state_type() -> StateType {
        StateType::new(format!("ledger-identity/attestation<{}>", T::state_type()))
    }

    fn participants(&self) -> Vec<AbstractParty> {
        dedup_participants(
            std::iter::once(self.attestor.clone()).chain(self.attestees.iter().cloned()),
        )
    }

    fn chain_id(&self) -> Option<&ChainId> {
        Some(&self.chain_id)
    }

    fn content_hash(&self) -> Option<SecureHash> {
        Some(self.compute_hash())
    }

    fn query_fields(&self) -> BTreeMap<String, String> {
        self.attestation_query_fields()
    }
}

impl<T: ContractState> LinearState for Attestation<T> {
    fn linear_id(&self) -> &ChainId {
        &self.chain_id
    }
}

impl<T: ContractState> ChainedState for Attestation<T> {
    fn previous_record_ref(&self) -> Option<&RecordRef> {
        self.previous_record_ref.as_ref()
    }

    fn hash(&self) -> SecureHash {
        self.compute_hash()
    }
}

/// An attestation record type: the base [`Attestation`] or a type that
/// wraps one. Same extension rules as [`crate::claim::ClaimState`].
pub trait AttestationState: ChainedState {
    type Target: ContractState;

    fn attestation(&self) -> &Attestation<Self::Target>;

    fn amend(
        &self,
        previous_record_ref: RecordRef,
        amendment: AttestationAmendment<Self::Target>,
    ) -> Self;

    /// Equality over the wrapper's own immutable fields.
    fn immutable_equals(&self, _other: &Self) -> bool {
        true
    }
}

impl<T: ContractState> AttestationState for Attestation<T> {
    type Target = T;

    fn attestation(&self) -> &Attestation<T> {
        self
    }

    fn amend(&self, previous_record_ref: RecordRef, amendment: AttestationAmendment<T>) -> Self {
        Attestation::amend(self, previous_record_ref, amendment)
    }
}

/// Immutable-field comparison for attestations. Implemented for every
/// [`AttestationState`] and not overridable.
pub trait AttestationImmutability {
    /// True when attestor and chain id match, the pointers are
    /// interchangeable, and the type's `immutable_equals` holds.
    fn internal_immutable_equals(&self, other: &Self) -> bool;
}

impl<S: AttestationState> AttestationImmutability for S {
    fn internal_immutable_equals(&self, other: &Self) -> bool {
        let (a, b) = (self.attestation(), other.attestation());
        a.attestor == b.attestor
            && a.chain_id == b.chain_id
            && a.pointer.immutable_equals(&b.pointer)
            && self.immutable_equals(other)
    }
}
