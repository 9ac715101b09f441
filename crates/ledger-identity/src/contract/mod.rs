//! The verification engine.
//!
//! Each record family (state type) is governed by one [`Contract`]. The
//! [`VerificationEngine`] finds every family a transaction consumes,
//! creates or commands, and runs its contract; a family with no
//! registered contract rejects the transaction. Verification is a pure
//! function of the transaction: no queries, no shared mutable state.
//!
//! The generic contracts for claims, attestations and accounts run their
//! base rules unconditionally, then hand over to a [`ContractHooks`]
//! implementation for stricter, application-specific rules.

pub mod account;
pub mod attestation;
pub mod claim;

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use crate::error::{RuleViolation, VerificationError};
use crate::party::PublicKey;
use crate::state::{ContractState, Record, StateAndRef, StateType};
use crate::transaction::{LedgerTransaction, LifecycleCommand};

pub use self::account::AccountContract;
pub use self::attestation::AttestationContract;
pub use self::claim::ClaimContract;

/// Verifies every transaction touching one family of records.
pub trait Contract: Send + Sync {
    /// The state type this contract governs.
    fn family(&self) -> StateType;

    fn verify(&self, tx: &LedgerTransaction) -> Result<(), VerificationError>;
}

// ── Transition ───────────────────────────────────────────────────────────────

/// One family's view of a transaction: its single command, and its
/// consumed and created records decoded as `S`.
#[derive(Debug, Clone)]
pub struct Transition<S> {
    pub command: LifecycleCommand,
    pub signers: Vec<PublicKey>,
    pub inputs: Vec<Record<S>>,
    pub outputs: Vec<Record<S>>,
}

impl<S: ContractState> Transition<S> {
    /// Extract the family of `S` from `tx`.
    ///
    /// Fails before any rule runs unless there is exactly one command for
    /// the family and it is a lifecycle command.
    pub fn from_transaction(tx: &LedgerTransaction) -> Result<Self, VerificationError> {
        let family = S::state_type();
        let commands = tx.commands_of(&family);
        if commands.len() != 1 {
            return Err(VerificationError::CommandCount {
                family,
                found: commands.len(),
            });
        }
        let command = commands[0];
        let lifecycle = LifecycleCommand::parse_for(&family, &command.action)?;

        let inputs = tx
            .inputs_of_type(&family)
            .into_iter()
            .map(decode_record::<S>)
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = tx
            .outputs_of_type(&family)
            .iter()
            .map(decode_record::<S>)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            command: lifecycle,
            signers: command.signers.clone(),
            inputs,
            outputs,
        })
    }

    pub fn is_signed_by(&self, key: &PublicKey) -> bool {
        self.signers.contains(key)
    }
}

fn decode_record<S: ContractState>(record: &StateAndRef) -> Result<Record<S>, VerificationError> {
    record.decode().map_err(|e| VerificationError::Decode {
        state_type: record.state.state_type.clone(),
        reason: e.to_string(),
    })
}

// ── Hooks ────────────────────────────────────────────────────────────────────

/// Extra rules layered on a generic contract. Every hook runs after all
/// base rules for its command have passed.
pub trait ContractHooks<S>: Send + Sync {
    fn on_verify_issue(
        &self,
        _tx: &LedgerTransaction,
        _transition: &Transition<S>,
    ) -> Result<(), RuleViolation> {
        Ok(())
    }

    fn on_verify_amend(
        &self,
        _tx: &LedgerTransaction,
        _transition: &Transition<S>,
    ) -> Result<(), RuleViolation> {
        Ok(())
    }

    fn on_verify_revoke(
        &self,
        _tx: &LedgerTransaction,
        _transition: &Transition<S>,
    ) -> Result<(), RuleViolation> {
        Ok(())
    }
}

/// Hooks that add nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtraRules;

impl<S> ContractHooks<S> for NoExtraRules {}

/// Run the base rules for the transition's command, then the matching hook.
pub(crate) fn run_lifecycle<S, H>(
    tx: &LedgerTransaction,
    hooks: &H,
    issue: impl FnOnce(&Transition<S>) -> Result<(), RuleViolation>,
    amend: impl FnOnce(&Transition<S>) -> Result<(), RuleViolation>,
    revoke: impl FnOnce(&Transition<S>) -> Result<(), RuleViolation>,
) -> Result<(), VerificationError>
where
    S: ContractState,
    H: ContractHooks<S>,
{
    let transition = Transition::<S>::from_transaction(tx)?;
    log::debug!(
        "verifying {} {} in transaction {}: {} consumed, {} created",
        S::state_type(),
        transition.command,
        tx.id,
        transition.inputs.len(),
        transition.outputs.len()
    );
    match transition.command {
        LifecycleCommand::Issue => {
            issue(&transition)?;
            hooks.on_verify_issue(tx, &transition)?;
        }
        LifecycleCommand::Amend => {
            amend(&transition)?;
            hooks.on_verify_amend(tx, &transition)?;
        }
        LifecycleCommand::Revoke => {
            revoke(&transition)?;
            hooks.on_verify_revoke(tx, &transition)?;
        }
    }
    Ok(())
}

/// Type marker shared by the generic contracts.
pub(crate) type Family<S> = PhantomData<fn() -> S>;

// ── VerificationEngine ───────────────────────────────────────────────────────

/// Dispatches each family in a transaction to its registered contract.
#[derive(Default)]
pub struct VerificationEngine {
    contracts: BTreeMap<StateType, Box<dyn Contract>>,
}

impl VerificationEngine {
    /// An engine with no contracts; it rejects every non-empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine with the base contracts for accounts, claims of every
    /// built-in value type, and attestations of those.
    pub fn standard() -> Self {
        use crate::account::Account;
        use crate::claim::Claim;

        let mut engine = Self::new();
        engine.register(AccountContract::<Account>::default());
        engine.register_attestation::<Account>();

        macro_rules! register_claims {
            ($($ty:ty),* $(,)?) => {
                $(
                    engine.register(ClaimContract::<Claim<$ty>>::default());
                    engine.register_attestation::<Claim<$ty>>();
                )*
            };
        }
        register_claims!(
            bool,
            i32,
            i64,
            u32,
            u64,
            f64,
            String,
            uuid::Uuid,
            chrono::DateTime<chrono::Utc>,
            serde_json::Value,
        );
        engine
    }

    /// Register `contract`, replacing any contract for the same family.
    pub fn register(&mut self, contract: impl Contract + 'static) -> &mut Self {
        let family = contract.family();
        if self.contracts.insert(family.clone(), Box::new(contract)).is_some() {
            log::debug!("replaced contract for {family}");
        }
        self
    }

    /// Register the base attestation contract for attestations of `T`.
    pub fn register_attestation<T: ContractState>(&mut self) -> &mut Self {
        self.register(AttestationContract::<crate::attestation::Attestation<T>>::default())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_contract(mut self, contract: impl Contract + 'static) -> Self {
        self.register(contract);
        self
    }

    pub fn contains(&self, family: &StateType) -> bool {
        self.contracts.contains_key(family)
    }

    pub fn families(&self) -> impl Iterator<Item = &StateType> {
        self.contracts.keys()
    }

    /// Accept or reject `tx`.
    ///
    /// Every family consumed, created or named by a command must have a
    /// contract, and every such contract must accept.
    pub fn verify(&self, tx: &LedgerTransaction) -> Result<(), VerificationError> {
        let mut families: BTreeSet<StateType> = tx.state_types();
        families.extend(tx.commands.iter().map(|c| c.family.clone()));

        for family in &families {
            let contract = self
                .contracts
                .get(family)
                .ok_or_else(|| VerificationError::UnrecognizedStateType(family.clone()))?;
            if let Err(e) = contract.verify(tx) {
                log::warn!("transaction {} rejected by {family}: {e}", tx.id);
                return Err(e);
            }
        }
        log::debug!("transaction {} verified ({} families)", tx.id, families.len());
        Ok(())
    }
}

impl std::fmt::Debug for VerificationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationEngine")
            .field("families", &self.contracts.keys().collect::<Vec<_>>())
            .finish()
    }
}
