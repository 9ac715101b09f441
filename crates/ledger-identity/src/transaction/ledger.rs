//! The transaction snapshot the verification engine reads.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::hash::{ContentHasher, SecureHash};
use crate::pointer::ResolutionPosition;
use crate::state::{RecordRef, StateAndRef, StateType, TransactionState};

use super::Command;

/// Hash domain for transaction ids.
const TRANSACTION_DOMAIN: &str = "ledger-identity/transaction";

/// An immutable proposed transaction.
///
/// Inputs are consumed records (with their original references),
/// outputs are created records, references are records read but not
/// consumed. Output `i` becomes the record `RecordRef { tx_id: id, index: i }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: SecureHash,
    pub inputs: Vec<StateAndRef>,
    pub outputs: Vec<TransactionState>,
    pub references: Vec<StateAndRef>,
    pub commands: Vec<Command>,
}

impl LedgerTransaction {
    /// Assemble a transaction and compute its id.
    pub fn new(
        inputs: Vec<StateAndRef>,
        outputs: Vec<TransactionState>,
        references: Vec<StateAndRef>,
        commands: Vec<Command>,
    ) -> Self {
        let id = Self::compute_id(&inputs, &outputs, &references, &commands);
        Self {
            id,
            inputs,
            outputs,
            references,
            commands,
        }
    }

    /// Id over inputs, outputs, references and commands, in that order.
    ///
    /// Inputs and references are hashed with their payloads, so a
    /// signature over the id also fixes the states the engine checks.
    pub fn compute_id(
        inputs: &[StateAndRef],
        outputs: &[TransactionState],
        references: &[StateAndRef],
        commands: &[Command],
    ) -> SecureHash {
        let mut hasher = ContentHasher::new(TRANSACTION_DOMAIN);
        hasher
            .update(inputs)
            .update(outputs)
            .update(references)
            .update(commands);
        hasher.finish()
    }

    /// Recompute the id from the current content.
    pub fn recompute_id(&self) -> SecureHash {
        Self::compute_id(&self.inputs, &self.outputs, &self.references, &self.commands)
    }

    /// Reference of output `index`.
    pub fn out_ref(&self, index: u32) -> RecordRef {
        RecordRef::new(self.id, index)
    }

    /// Outputs paired with the references they will have once recorded.
    pub fn output_refs(&self) -> Vec<StateAndRef> {
        self.outputs
            .iter()
            .enumerate()
            .map(|(i, state)| StateAndRef {
                state: state.clone(),
                reference: self.out_ref(i as u32),
            })
            .collect()
    }

    /// The candidate set at one position of the transaction.
    pub fn states_at(&self, position: ResolutionPosition) -> Vec<StateAndRef> {
        match position {
            ResolutionPosition::Input => self.inputs.clone(),
            ResolutionPosition::Output => self.output_refs(),
            ResolutionPosition::Reference => self.references.clone(),
        }
    }

    /// Inputs tagged `state_type`.
    pub fn inputs_of_type(&self, state_type: &StateType) -> Vec<&StateAndRef> {
        self.inputs
            .iter()
            .filter(|s| &s.state.state_type == state_type)
            .collect()
    }

    /// Outputs tagged `state_type`, with their references.
    pub fn outputs_of_type(&self, state_type: &StateType) -> Vec<StateAndRef> {
        self.output_refs()
            .into_iter()
            .filter(|s| &s.state.state_type == state_type)
            .collect()
    }

    /// Commands governing `family`.
    pub fn commands_of(&self, family: &StateType) -> Vec<&Command> {
        self.commands.iter().filter(|c| &c.family == family).collect()
    }

    /// Every state type consumed or created. References are excluded:
    /// reading a record does not invoke its contract.
    pub fn state_types(&self) -> BTreeSet<StateType> {
        self.inputs
            .iter()
            .map(|s| s.state.state_type.clone())
            .chain(self.outputs.iter().map(|s| s.state_type.clone()))
            .collect()
    }
}
