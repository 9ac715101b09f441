//! Incremental construction of transactions.

use crate::error::Result;
use crate::state::{ContractState, Record, StateAndRef, TransactionState};

use super::{Command, LedgerTransaction};

/// Builds a [`LedgerTransaction`] from typed records.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    inputs: Vec<StateAndRef>,
    outputs: Vec<TransactionState>,
    references: Vec<StateAndRef>,
    commands: Vec<Command>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume `record`.
    pub fn input<S: ContractState>(mut self, record: &Record<S>) -> Result<Self> {
        self.inputs.push(record.to_state_and_ref()?);
        Ok(self)
    }

    /// Consume an already-encoded record.
    pub fn input_state(mut self, record: StateAndRef) -> Self {
        self.inputs.push(record);
        self
    }

    /// Create `state`.
    pub fn output<S: ContractState>(mut self, state: &S) -> Result<Self> {
        self.outputs.push(TransactionState::encode(state)?);
        Ok(self)
    }

    /// Create an already-encoded state.
    pub fn output_state(mut self, state: TransactionState) -> Self {
        self.outputs.push(state);
        self
    }

    /// Read `record` without consuming it.
    pub fn reference<S: ContractState>(mut self, record: &Record<S>) -> Result<Self> {
        self.references.push(record.to_state_and_ref()?);
        Ok(self)
    }

    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    pub fn build(self) -> LedgerTransaction {
        LedgerTransaction::new(self.inputs, self.outputs, self.references, self.commands)
    }
}
