//! Transaction persistence — store and retrieve signed transactions.
//!
//! Each transaction is stored as a single JSON file named `{tx_id}.json`
//! inside the configured base directory.
//!
//! File format:
//! ```json
//! {
//!     "version": 1,
//!     "recorded_at": 1700000000000000,
//!     "transaction": { ... SignedTransaction ... }
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::hash::SecureHash;
use crate::transaction::SignedTransaction;

// ── File format constants ─────────────────────────────────────────────────────

const TRANSACTION_FILE_VERSION: u32 = 1;

// ── On-disk structure ─────────────────────────────────────────────────────────

/// Wrapper written to disk for each transaction.
#[derive(Debug, Serialize, Deserialize)]
struct TransactionFile {
    version: u32,
    /// When the transaction was stored (microseconds since Unix epoch).
    recorded_at: u64,
    transaction: SignedTransaction,
}

// ── TransactionStore ──────────────────────────────────────────────────────────

/// Filesystem-backed store for [`SignedTransaction`] records.
///
/// The store is safe for single-process use; concurrent writes from
/// multiple processes are not coordinated.
pub struct TransactionStore {
    base_dir: PathBuf,
}

impl TransactionStore {
    /// Create a store rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Persist a transaction. Saving an already stored transaction keeps
    /// its original record time.
    pub fn save(&self, transaction: &SignedTransaction) -> Result<()> {
        let path = self.transaction_path(transaction.id());
        let recorded_at = match self.read_file(transaction.id()) {
            Ok(existing) => existing.recorded_at,
            Err(LedgerError::NotFound(_)) => crate::time::now_micros(),
            Err(e) => return Err(e),
        };

        let file = TransactionFile {
            version: TRANSACTION_FILE_VERSION,
            recorded_at,
            transaction: transaction.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| LedgerError::SerializationError(e.to_string()))?;
        super::write_atomic(&path, json.as_bytes())?;
        log::debug!("stored transaction {}", transaction.id());
        Ok(())
    }

    /// Load a transaction by id.
    pub fn load(&self, id: &SecureHash) -> Result<SignedTransaction> {
        Ok(self.read_file(id)?.transaction)
    }

    /// When a transaction was stored.
    pub fn recorded_at(&self, id: &SecureHash) -> Result<u64> {
        Ok(self.read_file(id)?.recorded_at)
    }

    /// Ids of every stored transaction, in no particular order.
    pub fn list(&self) -> Result<Vec<SecureHash>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".json") {
                match SecureHash::from_hex(stem) {
                    Ok(id) => ids.push(id),
                    Err(_) => log::warn!("ignoring unexpected file {name_str}"),
                }
            }
        }
        Ok(ids)
    }

    /// Every stored transaction, ordered by record time then id.
    pub fn load_all(&self) -> Result<Vec<SignedTransaction>> {
        let mut files = self
            .list()?
            .iter()
            .map(|id| self.read_file(id))
            .collect::<Result<Vec<_>>>()?;
        files.sort_by(|a, b| {
            a.recorded_at
                .cmp(&b.recorded_at)
                .then_with(|| a.transaction.id().cmp(b.transaction.id()))
        });
        Ok(files.into_iter().map(|f| f.transaction).collect())
    }

    // ── Internal helpers ──────────────────────────────────────────────────────

    fn read_file(&self, id: &SecureHash) -> Result<TransactionFile> {
        let path = self.transaction_path(id);
        if !path.exists() {
            return Err(LedgerError::NotFound(format!("transaction not found: {id}")));
        }
        let bytes = std::fs::read(&path)?;
        let file: TransactionFile = serde_json::from_slice(&bytes).map_err(|e| {
            LedgerError::InvalidFileFormat(format!(
                "failed to parse transaction file {}: {e}",
                path.display()
            ))
        })?;
        if file.version != TRANSACTION_FILE_VERSION {
            return Err(LedgerError::InvalidFileFormat(format!(
                "unsupported transaction file version {}",
                file.version
            )));
        }
        Ok(file)
    }

    fn transaction_path(&self, id: &SecureHash) -> PathBuf {
        self.base_dir.join(format!("{}.json", id.to_hex()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
