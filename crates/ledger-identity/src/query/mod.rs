//! Query criteria and the query-service collaborator interface.
//!
//! [`QueryCriteria`] describes which records a caller wants. Every set
//! field narrows the result (logical AND). Consumption status is applied
//! by whoever knows it: the [`crate::index::Vault`] or a remote service.
//! An in-flight transaction has no status, so [`QueryCriteria::matches`]
//! ignores it.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::hash::SecureHash;
use crate::state::{ChainId, ContractState, RecordRef, StateAndRef, StateType};

/// Consumption status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateStatus {
    #[default]
    Unconsumed,
    Consumed,
    All,
}

impl StateStatus {
    pub fn admits(&self, consumed: bool) -> bool {
        match self {
            Self::Unconsumed => !consumed,
            Self::Consumed => consumed,
            Self::All => true,
        }
    }
}

/// Record selection criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryCriteria {
    pub status: StateStatus,
    pub state_type: Option<StateType>,
    pub chain_id: Option<ChainId>,
    pub record_ref: Option<RecordRef>,
    pub hash: Option<SecureHash>,
    pub fields: BTreeMap<String, String>,
}

impl QueryCriteria {
    /// Unconsumed records only.
    pub fn unconsumed() -> Self {
        Self::default()
    }

    /// Consumed and unconsumed records.
    pub fn all() -> Self {
        Self {
            status: StateStatus::All,
            ..Self::default()
        }
    }

    pub fn status(mut self, status: StateStatus) -> Self {
        self.status = status;
        self
    }

    pub fn state_type(mut self, state_type: StateType) -> Self {
        self.state_type = Some(state_type);
        self
    }

    /// Restrict to records stored as `S`.
    pub fn of_type<S: ContractState>(self) -> Self {
        self.state_type(S::state_type())
    }

    pub fn chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn record_ref(mut self, record_ref: RecordRef) -> Self {
        self.record_ref = Some(record_ref);
        self
    }

    pub fn hash(mut self, hash: SecureHash) -> Self {
        self.hash = Some(hash);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Whether `candidate` satisfies every criterion except status.
    pub fn matches(&self, candidate: &StateAndRef) -> bool {
        let state = &candidate.state;
        if let Some(t) = &self.state_type {
            if &state.state_type != t {
                return false;
            }
        }
        if let Some(id) = &self.chain_id {
            if state.chain_id.as_ref() != Some(id) {
                return false;
            }
        }
        if let Some(r) = &self.record_ref {
            if &candidate.reference != r {
                return false;
            }
        }
        if let Some(h) = &self.hash {
            if state.hash.as_ref() != Some(h) {
                return false;
            }
        }
        self.fields
            .iter()
            .all(|(name, value)| state.fields.get(name) == Some(value))
    }
}

/// A service that answers record queries, such as a remote node's vault.
///
/// Implementations return every match in a stable order; the resolver,
/// not the service, decides whether more than one match is an error.
pub trait QueryService {
    fn query(&self, criteria: &QueryCriteria) -> Result<Vec<StateAndRef>>;
}
