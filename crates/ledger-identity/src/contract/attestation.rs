//! The base attestation contract.

use crate::attestation::{AttestationImmutability, AttestationState};
use crate::error::{require, RuleViolation, VerificationError};
use crate::state::{ChainedState, ContractState, StateType};
use crate::transaction::LedgerTransaction;

use super::{run_lifecycle, Contract, ContractHooks, Family, NoExtraRules, Transition};

pub const ISSUE_ZERO_INPUTS: &str =
    "On attestation issuing, zero attestation states must be consumed.";
pub const ISSUE_SOME_OUTPUTS: &str =
    "On attestation issuing, at least one attestation state must be created.";
pub const ISSUE_NO_PREVIOUS: &str =
    "On attestation issuing, the created attestations must not reference a previous record.";
pub const ISSUE_ATTESTOR_PARTICIPANT: &str =
    "On attestation issuing, the attestor must be a participant.";
pub const ISSUE_ATTESTOR_SIGNS: &str =
    "On attestation issuing, the attestor must sign the transaction.";

pub const AMEND_ONE_INPUT: &str =
    "On attestation amending, only one attestation state must be consumed.";
pub const AMEND_ONE_OUTPUT: &str =
    "On attestation amending, only one attestation state must be created.";
pub const AMEND_CHAIN_LINK: &str =
    "On attestation amending, the previous record reference of the created attestation must be equal to the reference of the consumed attestation.";
pub const AMEND_IMMUTABLE: &str =
    "On attestation amending, the attestor, chain id and pointer must not change.";
pub const AMEND_ATTESTOR_PARTICIPANT: &str =
    "On attestation amending, the attestor must be a participant.";
pub const AMEND_ATTESTOR_SIGNS: &str =
    "On attestation amending, the attestor must sign the transaction.";

pub const REVOKE_SOME_INPUTS: &str =
    "On attestation revoking, at least one attestation state must be consumed.";
pub const REVOKE_ZERO_OUTPUTS: &str =
    "On attestation revoking, zero attestation states must be created.";
pub const REVOKE_ATTESTOR_SIGNS: &str =
    "On attestation revoking, the attestor must sign the transaction.";

/// Governs the lifecycle of attestation records of type `S`.
pub struct AttestationContract<S, H = NoExtraRules> {
    hooks: H,
    _family: Family<S>,
}

impl<S, H: Default> Default for AttestationContract<S, H> {
    fn default() -> Self {
        Self::new(H::default())
    }
}

impl<S, H> AttestationContract<S, H> {
    pub fn new(hooks: H) -> Self {
        Self {
            hooks,
            _family: Family::default(),
        }
    }
}

fn verify_issue<S: AttestationState>(t: &Transition<S>) -> Result<(), RuleViolation> {
    require(t.inputs.is_empty(), ISSUE_ZERO_INPUTS)?;
    require(!t.outputs.is_empty(), ISSUE_SOME_OUTPUTS)?;
    for output in &t.outputs {
        let state = &output.state;
        let attestor = state.attestation().attestor();
        require(state.previous_record_ref().is_none(), ISSUE_NO_PREVIOUS)?;
        require(
            state.participants().contains(attestor),
            ISSUE_ATTESTOR_PARTICIPANT,
        )?;
        require(t.is_signed_by(attestor.owning_key()), ISSUE_ATTESTOR_SIGNS)?;
    }
    Ok(())
}

fn verify_amend<S: AttestationState>(t: &Transition<S>) -> Result<(), RuleViolation> {
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
    let attestor = output.attestation().attestor();
    require(
        output.participants().contains(attestor),
        AMEND_ATTESTOR_PARTICIPANT,
    )?;
    require(t.is_signed_by(attestor.owning_key()), AMEND_ATTESTOR_SIGNS)
}

fn verify_revoke<S: AttestationState>(t: &Transition<S>) -> Result<(), RuleViolation> {
    require(!t.inputs.is_empty(), REVOKE_SOME_INPUTS)?;
    require(t.outputs.is_empty(), REVOKE_ZERO_OUTPUTS)?;
    for input in &t.inputs {
        let attestor = input.state.attestation().attestor();
        require(t.is_signed_by(attestor.owning_key()), REVOKE_ATTESTOR_SIGNS)?;
    }
    Ok(())
}

impl<S, H> Contract for AttestationContract<S, H>
where
    S: AttestationState,
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
