//! Ledger states — the typed records carried by transactions.
//!
//! Every record type implements [`ContractState`], which gives it an
//! explicit type tag ([`StateType`]) and the derived columns the query
//! layer indexes on. Inside a transaction a record travels as a
//! [`TransactionState`] envelope and is decoded back into its Rust type
//! only after the envelope's tag has been checked.

pub mod envelope;
pub mod ids;

use std::collections::BTreeMap;
use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::hash::SecureHash;
use crate::party::AbstractParty;

pub use envelope::{Record, StateAndRef, TransactionState};
pub use ids::{ChainId, RecordRef, StateType};

/// A record that can be stored on the ledger.
pub trait ContractState:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The type tag under which records of this type are stored.
    fn state_type() -> StateType
    where
        Self: Sized;

    /// Parties with an interest in the record.
    fn participants(&self) -> Vec<AbstractParty>;

    /// Chain identity for records that evolve through amendment.
    fn chain_id(&self) -> Option<&ChainId> {
        None
    }

    /// Content hash used for hash-keyed existence queries.
    fn content_hash(&self) -> Option<SecureHash> {
        None
    }

    /// Extra query columns (name -> value) for narrowing lookups.
    fn query_fields(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// A record with a stable chain identity that survives amendment.
pub trait LinearState: ContractState {
    fn linear_id(&self) -> &ChainId;
}

/// A linear record whose versions form a singly linked chain.
///
/// The first version has no previous record; each amendment links to the
/// record it replaces.
pub trait ChainedState: LinearState {
    fn previous_record_ref(&self) -> Option<&RecordRef>;

    /// Deterministic content hash over the record's hashed fields.
    fn hash(&self) -> SecureHash;
}
