//! Attestation pointers — what an attestation witnesses.

use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;
use crate::hash::SecureHash;
use crate::pointer::{LinearPointer, Pointer, StaticPointer};
use crate::query::QueryCriteria;
use crate::state::{ChainId, ContractState, LinearState, Record, RecordRef, StateType};

/// The witnessed record, by chain identity or by exact version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "pointer", rename_all = "snake_case")]
pub enum AttestationPointer<T> {
    Linear(LinearPointer<T>),
    Static(StaticPointer<T>),
}

impl<T: ContractState> AttestationPointer<T> {
    /// Witness whatever is current on chain `chain_id`.
    pub fn linear(chain_id: ChainId) -> Self {
        Self::Linear(LinearPointer::new(chain_id))
    }

    /// Witness one exact record.
    pub fn exact(record_ref: RecordRef) -> Self {
        Self::Static(StaticPointer::new(record_ref))
    }

    /// Witness exactly `record`.
    pub fn static_to(record: &Record<T>) -> Self {
        Self::Static(StaticPointer::to_record(record))
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, Self::Linear(_))
    }

    /// Whether `other` may replace this pointer on amendment.
    ///
    /// Both must be the same variant over the same state type. A linear
    /// pointer must keep its chain. A static pointer may move to another
    /// record, which is how a newer version gets re-attested.
    pub fn immutable_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Linear(a), Self::Linear(b)) => {
                a.state_type() == b.state_type() && a.chain_id() == b.chain_id()
            }
            (Self::Static(a), Self::Static(b)) => a.state_type() == b.state_type(),
            _ => false,
        }
    }
}

impl<T: LinearState> AttestationPointer<T> {
    /// Witness the chain `record` belongs to.
    pub fn linear_to(record: &Record<T>) -> Self {
        Self::Linear(LinearPointer::to_record(record))
    }
}

impl<T: ContractState> Pointer<T> for AttestationPointer<T> {
    fn state_type(&self) -> &StateType {
        match self {
            Self::Linear(p) => p.state_type(),
            Self::Static(p) => p.state_type(),
        }
    }

    fn hash(&self) -> SecureHash {
        match self {
            Self::Linear(p) => p.hash(),
            Self::Static(p) => p.hash(),
        }
    }

    fn is_pointing_to(&self, record: &Record<T>) -> bool {
        match self {
            Self::Linear(p) => p.is_pointing_to(record),
            Self::Static(p) => p.is_pointing_to(record),
        }
    }

    fn criteria(&self) -> QueryCriteria {
        match self {
            Self::Linear(p) => p.criteria(),
            Self::Static(p) => p.criteria(),
        }
    }

    fn check_record(&self, record: &Record<T>) -> Result<(), ResolutionError> {
        match self {
            Self::Linear(p) => p.check_record(record),
            Self::Static(p) => p.check_record(record),
        }
    }
}
