//! The local materialized view of recorded transactions.
//!
//! [`Vault`] keeps every record it has seen together with its
//! consumption status, and answers [`QueryCriteria`] from the most
//! selective index available:
//!
//! record ref > content hash > chain id > state type > full scan
//!
//! Recording is idempotent and order-independent: a transaction that
//! consumes a record may be recorded before the one that created it.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{LedgerError, Result};
use crate::hash::SecureHash;
use crate::query::{QueryCriteria, QueryService, StateStatus};
use crate::state::{ChainId, RecordRef, StateAndRef, StateType};
use crate::transaction::LedgerTransaction;

// ── Vault ────────────────────────────────────────────────────────────────────

/// In-memory index over ledger records.
#[derive(Debug, Default)]
pub struct Vault {
    /// Primary store: record ref → record. Ordered so scans are stable.
    records: BTreeMap<RecordRef, StateAndRef>,
    /// Consumption map: record ref → id of the consuming transaction.
    consumed: HashMap<RecordRef, SecureHash>,
    /// Secondary index: content hash → record refs.
    by_hash: HashMap<SecureHash, Vec<RecordRef>>,
    /// Secondary index: chain id → record refs.
    by_chain: HashMap<ChainId, Vec<RecordRef>>,
    /// Secondary index: state type → record refs.
    by_type: HashMap<StateType, Vec<RecordRef>>,
    /// Ids of transactions already recorded.
    transactions: HashSet<SecureHash>,
    /// Records seen only as inputs so far. Their creating transaction
    /// replaces the stored copy when it is recorded.
    provisional: HashSet<RecordRef>,
}

impl Vault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vault from a sequence of transactions, in any order.
    pub fn from_transactions<'a>(
        transactions: impl IntoIterator<Item = &'a LedgerTransaction>,
    ) -> Result<Self> {
        let mut vault = Self::new();
        for tx in transactions {
            vault.record_transaction(tx)?;
        }
        Ok(vault)
    }

    /// Apply a verified transaction: inputs become consumed, outputs
    /// become unconsumed records.
    ///
    /// Recording the same transaction twice is a no-op. Fails, leaving the
    /// vault untouched, with `StateAlreadyConsumed` when an input was
    /// already consumed by a different transaction, and with
    /// `InputMismatch` when an input or reference carries a state other
    /// than the one recorded under its reference.
    pub fn record_transaction(&mut self, tx: &LedgerTransaction) -> Result<()> {
        if self.transactions.contains(&tx.id) {
            log::debug!("transaction {} already recorded", tx.id);
            return Ok(());
        }

        for input in &tx.inputs {
            if let Some(consumed_by) = self.consumed.get(&input.reference) {
                if consumed_by != &tx.id {
                    log::warn!(
                        "transaction {} double-spends {} (consumed by {})",
                        tx.id,
                        input.reference,
                        consumed_by
                    );
                    return Err(LedgerError::StateAlreadyConsumed {
                        reference: input.reference,
                        consumed_by: *consumed_by,
                    });
                }
            }
        }

        for read in tx.inputs.iter().chain(&tx.references) {
            if let Some(stored) = self.records.get(&read.reference) {
                if stored.state != read.state {
                    log::warn!(
                        "transaction {} carries a forged copy of {}",
                        tx.id,
                        read.reference
                    );
                    return Err(LedgerError::InputMismatch {
                        reference: read.reference,
                    });
                }
            }
        }

        for input in &tx.inputs {
            if !self.records.contains_key(&input.reference) {
                self.provisional.insert(input.reference);
                self.insert_record(input.clone());
            }
            self.consumed.insert(input.reference, tx.id);
        }
        for output in tx.output_refs() {
            if self.provisional.remove(&output.reference) {
                self.settle_provisional(output);
            } else {
                self.insert_record(output);
            }
        }
        self.transactions.insert(tx.id);

        log::debug!(
            "recorded transaction {}: {} consumed, {} created",
            tx.id,
            tx.inputs.len(),
            tx.outputs.len()
        );
        Ok(())
    }

    /// Replace a record first seen as an input with the copy its creating
    /// transaction carries.
    fn settle_provisional(&mut self, created: StateAndRef) {
        let reference = created.reference;
        match self.records.get(&reference) {
            Some(stored) if stored.state == created.state => return,
            Some(_) => log::warn!(
                "record {reference} was consumed as a different state than the one created"
            ),
            None => {}
        }
        if let Some(stale) = self.records.remove(&reference) {
            self.unindex(&stale);
        }
        self.insert_record(created);
    }

    fn insert_record(&mut self, record: StateAndRef) {
        let reference = record.reference;
        if self.records.contains_key(&reference) {
            return;
        }
        if let Some(hash) = record.state.hash {
            self.by_hash.entry(hash).or_default().push(reference);
        }
        if let Some(chain_id) = &record.state.chain_id {
            self.by_chain
                .entry(chain_id.clone())
                .or_default()
                .push(reference);
        }
        self.by_type
            .entry(record.state.state_type.clone())
            .or_default()
            .push(reference);
        self.records.insert(reference, record);
    }

    fn unindex(&mut self, record: &StateAndRef) {
        let reference = record.reference;
        if let Some(hash) = &record.state.hash {
            drop_ref(&mut self.by_hash, hash, &reference);
        }
        if let Some(chain_id) = &record.state.chain_id {
            drop_ref(&mut self.by_chain, chain_id, &reference);
        }
        drop_ref(&mut self.by_type, &record.state.state_type, &reference);
    }

    /// Look up a record by reference, consumed or not.
    pub fn get(&self, reference: &RecordRef) -> Option<&StateAndRef> {
        self.records.get(reference)
    }

    /// Return `true` if the record has been consumed.
    pub fn is_consumed(&self, reference: &RecordRef) -> bool {
        self.consumed.contains_key(reference)
    }

    /// Id of the transaction that consumed `reference`, if any.
    pub fn consumed_by(&self, reference: &RecordRef) -> Option<&SecureHash> {
        self.consumed.get(reference)
    }

    /// Return `true` if the transaction has been recorded.
    pub fn contains_transaction(&self, id: &SecureHash) -> bool {
        self.transactions.contains(id)
    }

    /// Whether any record with content hash `hash` has `status`.
    pub fn contains_hash(&self, hash: &SecureHash, status: StateStatus) -> bool {
        self.by_hash
            .get(hash)
            .map(|refs| refs.iter().any(|r| status.admits(self.is_consumed(r))))
            .unwrap_or(false)
    }

    /// Every record matching `criteria`, ordered by reference.
    pub fn query(&self, criteria: &QueryCriteria) -> Vec<StateAndRef> {
        let mut candidates: Vec<RecordRef> = if let Some(reference) = &criteria.record_ref {
            vec![*reference]
        } else if let Some(hash) = &criteria.hash {
            self.refs_in(self.by_hash.get(hash))
        } else if let Some(chain_id) = &criteria.chain_id {
            self.refs_in(self.by_chain.get(chain_id))
        } else if let Some(state_type) = &criteria.state_type {
            self.refs_in(self.by_type.get(state_type))
        } else {
            self.records.keys().copied().collect()
        };
        candidates.sort();
        candidates.dedup();

        candidates
            .into_iter()
            .filter(|r| criteria.status.admits(self.is_consumed(r)))
            .filter_map(|r| self.records.get(&r))
            .filter(|record| criteria.matches(record))
            .cloned()
            .collect()
    }

    fn refs_in(&self, refs: Option<&Vec<RecordRef>>) -> Vec<RecordRef> {
        refs.cloned().unwrap_or_default()
    }

    /// Return the total number of records stored.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Return `true` when the vault holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Return the number of unconsumed records.
    pub fn unconsumed_len(&self) -> usize {
        self.records
            .keys()
            .filter(|r| !self.is_consumed(r))
            .count()
    }
}

fn drop_ref<K: std::hash::Hash + Eq>(
    index: &mut HashMap<K, Vec<RecordRef>>,
    key: &K,
    reference: &RecordRef,
) {
    if let Some(refs) = index.get_mut(key) {
        refs.retain(|r| r != reference);
        if refs.is_empty() {
            index.remove(key);
        }
    }
}

impl QueryService for Vault {
    fn query(&self, criteria: &QueryCriteria) -> Result<Vec<StateAndRef>> {
        Ok(Vault::query(self, criteria))
    }
}
