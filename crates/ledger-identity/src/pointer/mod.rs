//! Pointers — references from one record to another.
//!
//! A pointer names a target record by type and either
//!
//! - chain identity ([`LinearPointer`]): always the newest unconsumed
//!   version of the chain, so the reference survives later amendments; or
//! - exact reference ([`StaticPointer`]): one specific version, frozen at
//!   the time the pointer was made.
//!
//! Every pointer resolves against three contexts through the same
//! algorithm (see [`resolver`]): a remote query service, the local
//! [`Vault`], or one position of an in-flight transaction.

pub mod resolver;

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;
use crate::hash::{ContentHasher, SecureHash};
use crate::index::Vault;
use crate::query::{QueryCriteria, QueryService};
use crate::state::{ChainId, ContractState, LinearState, Record, RecordRef, StateType};
use crate::transaction::LedgerTransaction;

pub use resolver::{
    resolve, CandidateSupplier, LocalQuery, RemoteQuery, ResolutionPosition, TransactionScan,
};

/// Hash domain for pointer hashes.
const POINTER_DOMAIN: &str = "ledger-identity/pointer";

/// Behaviour shared by every pointer type.
pub trait Pointer<T: ContractState> {
    /// Declared type tag of the target.
    fn state_type(&self) -> &StateType;

    /// Hash over the target type and the target reference.
    fn hash(&self) -> SecureHash;

    /// Whether `record` is what this pointer refers to.
    fn is_pointing_to(&self, record: &Record<T>) -> bool;

    /// Criteria that select the candidate records.
    fn criteria(&self) -> QueryCriteria;

    /// Extra check on a decoded candidate, after the type tag matched.
    fn check_record(&self, _record: &Record<T>) -> Result<(), ResolutionError> {
        Ok(())
    }

    /// Resolve through a remote query service.
    fn resolve_remote(&self, service: &dyn QueryService) -> Result<Option<Record<T>>, ResolutionError>
    where
        Self: Sized,
    {
        resolve(self, &RemoteQuery::new(service))
    }

    /// Resolve against the local vault.
    fn resolve_local(&self, vault: &Vault) -> Result<Option<Record<T>>, ResolutionError>
    where
        Self: Sized,
    {
        resolve(self, &LocalQuery::new(vault))
    }

    /// Resolve inside a transaction, looking only at `position`.
    fn resolve_in_transaction(
        &self,
        tx: &LedgerTransaction,
        position: ResolutionPosition,
    ) -> Result<Option<Record<T>>, ResolutionError>
    where
        Self: Sized,
    {
        resolve(self, &TransactionScan::new(tx, position))
    }
}

/// Points at the newest unconsumed record of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearPointer<T> {
    state_type: StateType,
    chain_id: ChainId,
    #[serde(skip)]
    marker: PhantomData<fn() -> T>,
}

impl<T: ContractState> LinearPointer<T> {
    /// Point at the chain `chain_id` of records of type `T`.
    pub fn new(chain_id: ChainId) -> Self {
        Self::with_state_type(T::state_type(), chain_id)
    }

    /// Point at a chain with an explicitly supplied type tag.
    pub fn with_state_type(state_type: StateType, chain_id: ChainId) -> Self {
        Self {
            state_type,
            chain_id,
            marker: PhantomData,
        }
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }
}

impl<T: LinearState> LinearPointer<T> {
    /// Point at the chain a record belongs to.
    pub fn to_record(record: &Record<T>) -> Self {
        Self::new(record.state.linear_id().clone())
    }
}

impl<T: ContractState> Pointer<T> for LinearPointer<T> {
    fn state_type(&self) -> &StateType {
        &self.state_type
    }

    fn hash(&self) -> SecureHash {
        let mut hasher = ContentHasher::new(POINTER_DOMAIN);
        hasher.update(&self.state_type).update(&self.chain_id);
        hasher.finish()
    }

    fn is_pointing_to(&self, record: &Record<T>) -> bool {
        record.state.chain_id() == Some(&self.chain_id)
    }

    fn criteria(&self) -> QueryCriteria {
        QueryCriteria::unconsumed().chain_id(self.chain_id.clone())
    }
}

/// Points at one exact record version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticPointer<T> {
    state_type: StateType,
    record_ref: RecordRef,
    #[serde(skip)]
    marker: PhantomData<fn() -> T>,
}

impl<T: ContractState> StaticPointer<T> {
    /// Point at `record_ref`, declared as type `T`.
    pub fn new(record_ref: RecordRef) -> Self {
        Self::with_state_type(T::state_type(), record_ref)
    }

    /// Point at `record_ref` with an explicitly supplied type tag.
    pub fn with_state_type(state_type: StateType, record_ref: RecordRef) -> Self {
        Self {
            state_type,
            record_ref,
            marker: PhantomData,
        }
    }

    /// Point at exactly this record.
    pub fn to_record(record: &Record<T>) -> Self {
        Self::new(record.reference)
    }

    pub fn record_ref(&self) -> &RecordRef {
        &self.record_ref
    }
}

impl<T: ContractState> Pointer<T> for StaticPointer<T> {
    fn state_type(&self) -> &StateType {
        &self.state_type
    }

    fn hash(&self) -> SecureHash {
        let mut hasher = ContentHasher::new(POINTER_DOMAIN);
        hasher.update(&self.state_type).update(&self.record_ref);
        hasher.finish()
    }

    fn is_pointing_to(&self, record: &Record<T>) -> bool {
        record.reference == self.record_ref
    }

    // Consumed versions stay resolvable: the pointer names history.
    fn criteria(&self) -> QueryCriteria {
        QueryCriteria::all().record_ref(self.record_ref)
    }
}
