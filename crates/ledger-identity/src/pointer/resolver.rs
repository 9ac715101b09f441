//! The single resolution algorithm shared by all pointers and contexts.
//!
//! A [`CandidateSupplier`] turns query criteria into candidate records.
//! [`resolve`] then demands at most one candidate, checks its type tag
//! against the pointer's declared type, decodes it, and lets the pointer
//! run its own extra check.

use crate::error::ResolutionError;
use crate::index::Vault;
use crate::query::{QueryCriteria, QueryService};
use crate::state::{ContractState, Record, StateAndRef};
use crate::transaction::LedgerTransaction;

use super::Pointer;

/// Where in a transaction a pointer looks for its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPosition {
    Input,
    Output,
    Reference,
}

/// Source of candidate records for a resolution call.
pub trait CandidateSupplier {
    fn candidates(&self, criteria: &QueryCriteria) -> Result<Vec<StateAndRef>, ResolutionError>;
}

/// Candidates from a remote query service. Failures of the service are
/// reported as `ResolutionError::Query`; retrying is the caller's call.
pub struct RemoteQuery<'a> {
    service: &'a dyn QueryService,
}

impl<'a> RemoteQuery<'a> {
    pub fn new(service: &'a dyn QueryService) -> Self {
        Self { service }
    }
}

impl CandidateSupplier for RemoteQuery<'_> {
    fn candidates(&self, criteria: &QueryCriteria) -> Result<Vec<StateAndRef>, ResolutionError> {
        self.service
            .query(criteria)
            .map_err(|e| ResolutionError::Query(e.to_string()))
    }
}

/// Candidates from the local vault.
pub struct LocalQuery<'a> {
    vault: &'a Vault,
}

impl<'a> LocalQuery<'a> {
    pub fn new(vault: &'a Vault) -> Self {
        Self { vault }
    }
}

impl CandidateSupplier for LocalQuery<'_> {
    fn candidates(&self, criteria: &QueryCriteria) -> Result<Vec<StateAndRef>, ResolutionError> {
        Ok(self.vault.query(criteria))
    }
}

/// Candidates from one position of a transaction. No external query is
/// made, and consumption status does not apply.
pub struct TransactionScan<'a> {
    tx: &'a LedgerTransaction,
    position: ResolutionPosition,
}

impl<'a> TransactionScan<'a> {
    pub fn new(tx: &'a LedgerTransaction, position: ResolutionPosition) -> Self {
        Self { tx, position }
    }
}

impl CandidateSupplier for TransactionScan<'_> {
    fn candidates(&self, criteria: &QueryCriteria) -> Result<Vec<StateAndRef>, ResolutionError> {
        Ok(self
            .tx
            .states_at(self.position)
            .into_iter()
            .filter(|candidate| criteria.matches(candidate))
            .collect())
    }
}

/// Resolve `pointer` against `supplier`.
///
/// Candidates whose envelope disagrees with its payload, or that the
/// pointer does not actually point to, are skipped. Of the rest, zero
/// resolve to `None` and more than one is `ResolutionError::Ambiguous`.
/// A candidate whose type tag differs from the pointer's declared type
/// is `ResolutionError::InvalidStateType`.
pub fn resolve<T, P>(
    pointer: &P,
    supplier: &dyn CandidateSupplier,
) -> Result<Option<Record<T>>, ResolutionError>
where
    T: ContractState,
    P: Pointer<T> + ?Sized,
{
    let criteria = pointer.criteria();
    let mut admitted: Vec<Result<Record<T>, ResolutionError>> = supplier
        .candidates(&criteria)?
        .iter()
        .filter_map(|candidate| admit(pointer, candidate))
        .collect();

    let record = match admitted.len() {
        0 => {
            log::debug!("pointer {} resolved to nothing", pointer.hash());
            return Ok(None);
        }
        1 => admitted.remove(0)?,
        count => {
            log::warn!("pointer {} matched {count} records", pointer.hash());
            return Err(ResolutionError::Ambiguous { count });
        }
    };

    pointer.check_record(&record)?;
    log::debug!(
        "pointer {} resolved to {}",
        pointer.hash(),
        record.reference
    );
    Ok(Some(record))
}

/// Decode one candidate. `None` drops it from the count.
fn admit<T, P>(pointer: &P, candidate: &StateAndRef) -> Option<Result<Record<T>, ResolutionError>>
where
    T: ContractState,
    P: Pointer<T> + ?Sized,
{
    if &candidate.state.state_type != pointer.state_type() {
        return Some(Err(ResolutionError::InvalidStateType {
            expected: pointer.state_type().to_string(),
            actual: candidate.state.state_type.to_string(),
        }));
    }
    match candidate.decode::<T>() {
        Ok(record) if pointer.is_pointing_to(&record) => Some(Ok(record)),
        Ok(record) => {
            log::warn!(
                "record {} matched pointer {} by its columns only; skipped",
                record.reference,
                pointer.hash()
            );
            None
        }
        Err(e @ ResolutionError::InconsistentEnvelope { .. }) => {
            log::warn!("record {} skipped: {e}", candidate.reference);
            None
        }
        Err(e) => Some(Err(e)),
    }
}
