//! The base claim contract.

use crate::claim::{ClaimImmutability, ClaimState};
use crate::error::{require, RuleViolation, VerificationError};
use crate::state::{ChainedState, ContractState, StateType};
use crate::transaction::LedgerTransaction;

use super::{run_lifecycle, Contract, ContractHooks, Family, NoExtraRules, Transition};

pub const ISSUE_ZERO_INPUTS: &str = "On claim issuing, zero claim states must be consumed.";
pub const ISSUE_ONE_OUTPUT: &str = "On claim issuing, only one claim state must be created.";
pub const ISSUE_NO_PREVIOUS: &str =
    "On claim issuing, the created claim must not reference a previous record.";
pub const ISSUE_ISSUER_PARTICIPANT: &str =
    "On claim issuing, the issuer must be a participant.";
pub const ISSUE_HOLDER_PARTICIPANT: &str =
    "On claim issuing, the holder must be a participant.";
pub const ISSUE_ISSUER_SIGNS: &str = "On claim issuing, the issuer must sign the transaction.";

pub const AMEND_ONE_INPUT: &str = "On claim amending, only one claim state must be consumed.";
pub const AMEND_ONE_OUTPUT: &str = "On claim amending, only one claim state must be created.";
pub const AMEND_CHAIN_LINK: &str =
    "On claim amending, the previous record reference of the created claim must be equal to the reference of the consumed claim.";
pub const AMEND_IMMUTABLE: &str =
    "On claim amending, the issuer, holder, property, chain id and value type must not change.";
pub const AMEND_ISSUER_PARTICIPANT: &str =
    "On claim amending, the issuer must be a participant.";
pub const AMEND_HOLDER_PARTICIPANT: &str =
    "On claim amending, the holder must be a participant.";
pub const AMEND_ISSUER_SIGNS: &str = "On claim amending, the issuer must sign the transaction.";

pub const REVOKE_ONE_INPUT: &str = "On claim revoking, only one claim state must be consumed.";
pub const REVOKE_ZERO_OUTPUTS: &str = "On claim revoking, zero claim states must be created.";
pub const REVOKE_ISSUER_SIGNS: &str = "On claim revoking, the issuer must sign the transaction.";

/// Governs the lifecycle of claim records of type `S`.
pub struct ClaimContract<S, H = NoExtraRules> {
    hooks: H,
    _family: Family<S>,
}

impl<S, H: Default> Default for ClaimContract<S, H> {
    fn default() -> Self {
        Self::new(H::default())
    }
}

impl<S, H> ClaimContract<S, H> {
    pub fn new(hooks: H) -> Self {
        Self {
            hooks,
            _family: Family::default(),
        }
    }
}

fn verify_issue<S: ClaimState>(t: &Transition<S>) -> Result<(), RuleViolation> {
    require(t.inputs.is_empty(), ISSUE_ZERO_INPUTS)?;
    require(t.outputs.len() == 1, ISSUE_ONE_OUTPUT)?;
    let output = &t.outputs[0].state;
    let claim = output.claim();
    let participants = output.participants();
    require(output.previous_record_ref().is_none(), ISSUE_NO_PREVIOUS)?;
    require(participants.contains(claim.issuer()), ISSUE_ISSUER_PARTICIPANT)?;
    require(participants.contains(claim.holder()), ISSUE_HOLDER_PARTICIPANT)?;
    require(t.is_signed_by(claim.issuer().owning_key()), ISSUE_ISSUER_SIGNS)
}

fn verify_amend<S: ClaimState>(t: &Transition<S>) -> Result<(), RuleViolation> {
    require(t.inputs.len() == 1, AMEND_ONE_INPUT)?;
    require(t.outputs.len() == 1, AMEND_ONE_OUTPUT)?;
    let (input, output) = (&t.inputs[0], &t.outputs[0].state);
    require(
        output.previous_record_ref() == Some(&input.reference),
        AMEND_CHAIN_LINK,
    )?;
    require(
        input.state.internal_immutable_equals(output),
        AMEND_IMMUTABLE,
    )?;
    let claim = output.claim();
    let participants = output.participants();
    require(participants.contains(claim.issuer()), AMEND_ISSUER_PARTICIPANT)?;
    require(participants.contains(claim.holder()), AMEND_HOLDER_PARTICIPANT)?;
    require(t.is_signed_by(claim.issuer().owning_key()), AMEND_ISSUER_SIGNS)
}

fn verify_revoke<S: ClaimState>(t: &Transition<S>) -> Result<(), RuleViolation> {
    require(t.inputs.len() == 1, REVOKE_ONE_INPUT)?;
    require(t.outputs.is_empty(), REVOKE_ZERO_OUTPUTS)?;
    let claim = t.inputs[0].state.claim();
    require(t.is_signed_by(claim.issuer().owning_key()), REVOKE_ISSUER_SIGNS)
}

impl<S, H> Contract for ClaimContract<S, H>
where
    S: ClaimState,
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
