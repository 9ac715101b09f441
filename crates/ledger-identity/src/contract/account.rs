//! The base account contract.

use std::collections::BTreeSet;

use crate::account::AccountState;
use crate::error::{require, RuleViolation, VerificationError};
use crate::state::{ChainId, ContractState, RecordRef, StateType};
use crate::transaction::LedgerTransaction;

use super::{run_lifecycle, Contract, ContractHooks, Family, NoExtraRules, Transition};

pub const ISSUE_ZERO_INPUTS: &str = "On account issuing, zero account states must be consumed.";
pub const ISSUE_SOME_OUTPUTS: &str =
    "On account issuing, at least one account state must be created.";
pub const ISSUE_OWNER_PARTICIPANT: &str = "On account issuing, the owner must be a participant.";
pub const ISSUE_OWNER_SIGNS: &str = "On account issuing, the owner must sign the transaction.";

pub const AMEND_SOME_INPUTS: &str =
    "On account amending, at least one account state must be consumed.";
pub const AMEND_SOME_OUTPUTS: &str =
    "On account amending, at least one account state must be created.";
pub const AMEND_OWNER_UNCHANGED: &str =
    "On account amending, each created account must keep the owner and chain id of a distinct consumed account.";
pub const AMEND_ONE_HEAD_PER_CHAIN: &str =
    "On account amending, at most one account state may be created per chain id.";
pub const AMEND_OWNER_PARTICIPANT: &str = "On account amending, the owner must be a participant.";
pub const AMEND_OWNER_SIGNS: &str = "On account amending, the owner must sign the transaction.";

pub const REVOKE_SOME_INPUTS: &str =
    "On account revoking, at least one account state must be consumed.";
pub const REVOKE_ZERO_OUTPUTS: &str = "On account revoking, zero account states must be created.";
pub const REVOKE_OWNER_SIGNS: &str = "On account revoking, the owner must sign the transaction.";

/// Governs the lifecycle of account records of type `S`.
pub struct AccountContract<S, H = NoExtraRules> {
    hooks: H,
    _family: Family<S>,
}

impl<S, H: Default> Default for AccountContract<S, H> {
    fn default() -> Self {
        Self::new(H::default())
    }
}

impl<S, H> AccountContract<S, H> {
    pub fn new(hooks: H) -> Self {
        Self {
            hooks,
            _family: Family::default(),
        }
    }
}

fn verify_issue<S: AccountState>(t: &Transition<S>) -> Result<(), RuleViolation> {
    require(t.inputs.is_empty(), ISSUE_ZERO_INPUTS)?;
    require(!t.outputs.is_empty(), ISSUE_SOME_OUTPUTS)?;
    for output in &t.outputs {
        let owner = output.state.account().owner();
        require(
            output.state.participants().contains(owner),
            ISSUE_OWNER_PARTICIPANT,
        )?;
        require(t.is_signed_by(owner.owning_key()), ISSUE_OWNER_SIGNS)?;
    }
    Ok(())
}

fn verify_amend<S: AccountState>(t: &Transition<S>) -> Result<(), RuleViolation> {
    require(!t.inputs.is_empty(), AMEND_SOME_INPUTS)?;
    require(!t.outputs.is_empty(), AMEND_SOME_OUTPUTS)?;

    let mut heads: BTreeSet<&ChainId> = BTreeSet::new();
    let mut paired: BTreeSet<RecordRef> = BTreeSet::new();
    for output in &t.outputs {
        let account = output.state.account();
        require(heads.insert(account.chain_id()), AMEND_ONE_HEAD_PER_CHAIN)?;
        let input = t.inputs.iter().find(|input| {
            let before = input.state.account();
            !paired.contains(&input.reference)
                && before.chain_id() == account.chain_id()
                && before.owner() == account.owner()
        });
        match input {
            Some(input) => paired.insert(input.reference),
            None => return Err(RuleViolation::new(AMEND_OWNER_UNCHANGED)),
        };
        require(
            output.state.participants().contains(account.owner()),
            AMEND_OWNER_PARTICIPANT,
        )?;
    }
    for input in &t.inputs {
        let owner = input.state.account().owner();
        require(t.is_signed_by(owner.owning_key()), AMEND_OWNER_SIGNS)?;
    }
    Ok(())
}

fn verify_revoke<S: AccountState>(t: &Transition<S>) -> Result<(), RuleViolation> {
    require(!t.inputs.is_empty(), REVOKE_SOME_INPUTS)?;
    require(t.outputs.is_empty(), REVOKE_ZERO_OUTPUTS)?;
    for input in &t.inputs {
        let owner = input.state.account().owner();
        require(t.is_signed_by(owner.owning_key()), REVOKE_OWNER_SIGNS)?;
    }
    Ok(())
}

impl<S, H> Contract for AccountContract<S, H>
where
    S: AccountState,
    H: ContractHooks<S>,
{
    fn family(&self) -> StateType {
        S::state_type()
    }

    fn verify(&self, tx: &LedgerTransaction) -> Result<(), VerificationError> {
        run_lifecycle::<S, H>(
            tx,
            &self.hooks,
            verify_issue::<S>,
            verify_amend::<S>,
            verify_revoke::<S>,
        )
    }
}
