//! ledger-identity — ledger-anchored identity.
//!
//! Provides self-describing claims about a party, attestations that
//! witness claims or any other ledger record, ownership-only accounts,
//! pointers that reference records by chain identity or exact version,
//! and the verification engine that accepts or rejects every proposed
//! issue, amend and revoke.

pub mod account;
pub mod attestation;
pub mod claim;
pub mod contract;
pub mod crypto;
pub mod error;
pub mod hash;
pub mod index;
pub mod party;
pub mod pointer;
pub mod query;
pub mod state;
pub mod storage;
pub mod time;
pub mod transaction;

// Re-export primary types
pub use error::{
    ConstructionError, LedgerError, ResolutionError, Result, RuleViolation, VerificationError,
};
pub use hash::SecureHash;
pub use party::{AbstractParty, AccountParty, AnonymousParty, LocalIdentity, Party, PublicKey};
pub use state::{
    ChainId, ChainedState, ContractState, LinearState, Record, RecordRef, StateAndRef, StateType,
    TransactionState,
};

// Re-export record types
pub use account::{Account, AccountState};
pub use attestation::{
    Attestation, AttestationAmendment, AttestationImmutability, AttestationPointer,
    AttestationState, AttestationStatus, Metadata,
};
pub use claim::{
    Claim, ClaimImmutability, ClaimPointer, ClaimSelector, ClaimState, ClaimValue, ValueType,
};

// Re-export pointer, query and verification types
pub use contract::{
    AccountContract, AttestationContract, ClaimContract, Contract, ContractHooks, NoExtraRules,
    Transition, VerificationEngine,
};
pub use index::Vault;
pub use pointer::{LinearPointer, Pointer, ResolutionPosition, StaticPointer};
pub use query::{QueryCriteria, QueryService, StateStatus};
pub use transaction::{
    Command, LedgerTransaction, LifecycleCommand, SignedTransaction, TransactionBuilder,
};
