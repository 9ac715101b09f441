//! Type-erased state envelopes and typed records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, ResolutionError, Result};
use crate::hash::{ContentHasher, Hashable, SecureHash};
use crate::party::AbstractParty;

use super::{ChainId, ContractState, RecordRef, StateType};

/// A state as carried by a transaction: its type tag, its encoded payload,
/// and the derived columns used for querying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionState {
    pub state_type: StateType,
    pub data: serde_json::Value,
    pub chain_id: Option<ChainId>,
    pub hash: Option<SecureHash>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    pub participants: Vec<AbstractParty>,
}

impl TransactionState {
    /// Encode a typed state.
    pub fn encode<S: ContractState>(state: &S) -> Result<Self> {
        let data = serde_json::to_value(state)
            .map_err(|e| LedgerError::SerializationError(e.to_string()))?;
        Ok(Self {
            state_type: S::state_type(),
            data,
            chain_id: state.chain_id().cloned(),
            hash: state.content_hash(),
            fields: state.query_fields(),
            participants: state.participants(),
        })
    }

    /// Whether the envelope is tagged as `S`.
    pub fn is<S: ContractState>(&self) -> bool {
        self.state_type == S::state_type()
    }

    /// Decode as `S`, checking the type tag first.
    ///
    /// The payload is authoritative: every derived column must equal what
    /// the decoded state reports, otherwise the envelope is
    /// `ResolutionError::InconsistentEnvelope`.
    pub fn decode<S: ContractState>(&self) -> std::result::Result<S, ResolutionError> {
        let expected = S::state_type();
        if self.state_type != expected {
            return Err(ResolutionError::InvalidStateType {
                expected: expected.0,
                actual: self.state_type.0.clone(),
            });
        }
        let state: S = serde_json::from_value(self.data.clone()).map_err(|e| {
            ResolutionError::Undecodable {
                state_type: self.state_type.clone(),
                reason: e.to_string(),
            }
        })?;
        self.check_columns(&state)?;
        Ok(state)
    }

    fn check_columns<S: ContractState>(
        &self,
        state: &S,
    ) -> std::result::Result<(), ResolutionError> {
        let mismatch = if self.chain_id.as_ref() != state.chain_id() {
            Some("chain_id")
        } else if self.hash != state.content_hash() {
            Some("hash")
        } else if self.fields != state.query_fields() {
            Some("fields")
        } else if self.participants != state.participants() {
            Some("participants")
        } else {
            None
        };
        match mismatch {
            Some(column) => Err(ResolutionError::InconsistentEnvelope {
                state_type: self.state_type.clone(),
                column,
            }),
            None => Ok(()),
        }
    }
}

impl Hashable for TransactionState {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher
            .update(&self.state_type)
            .json_value(&self.data)
            .update(&self.chain_id)
            .update(&self.hash)
            .update(&self.fields)
            .update(&self.participants);
    }
}

/// An envelope together with the reference of the record it is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAndRef {
    pub state: TransactionState,
    pub reference: RecordRef,
}

impl StateAndRef {
    pub fn decode<S: ContractState>(&self) -> std::result::Result<Record<S>, ResolutionError> {
        Ok(Record {
            state: self.state.decode()?,
            reference: self.reference,
        })
    }
}

impl Hashable for StateAndRef {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.update(&self.reference).update(&self.state);
    }
}

/// A typed record and its ledger reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<S> {
    pub state: S,
    pub reference: RecordRef,
}

impl<S: ContractState> Record<S> {
    pub fn new(state: S, reference: RecordRef) -> Self {
        Self { state, reference }
    }

    /// Re-encode as an envelope, e.g. to spend the record as an input.
    pub fn to_state_and_ref(&self) -> Result<StateAndRef> {
        Ok(StateAndRef {
            state: TransactionState::encode(&self.state)?,
            reference: self.reference,
        })
    }
}
