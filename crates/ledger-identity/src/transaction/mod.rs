//! Transactions — proposed state transitions.
//!
//! A [`LedgerTransaction`] is the immutable snapshot the verification
//! engine reads: consumed records with their references, created
//! records, read-only references, and commands naming the transition and
//! its required signers. [`SignedTransaction`] attaches the signatures.

pub mod builder;
pub mod command;
pub mod ledger;
pub mod signed;

pub use builder::TransactionBuilder;
pub use command::{Command, LifecycleCommand};
pub use ledger::LedgerTransaction;
pub use signed::{SignedTransaction, TransactionSignature};
