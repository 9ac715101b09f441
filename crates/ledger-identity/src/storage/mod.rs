//! Storage layer for party key files and recorded transactions.
//!
//! # Directory layout
//!
//! By convention the default root is `~/.ledger-identity/`:
//!
//! ```text
//! ~/.ledger-identity/
//! ├── parties/
//! │   └── {name}.key
//! └── transactions/
//!     └── {tx_id}.json
//! ```
//!
//! # Modules
//!
//! - [`key_file`] — passphrase-encrypted party key files.
//! - [`transaction_store`] — one JSON file per signed transaction.

pub mod key_file;
pub mod transaction_store;

pub use key_file::{load_identity, read_party, save_identity, EncryptionMetadata, KeyFile};
pub use transaction_store::TransactionStore;

use std::path::Path;

use crate::error::Result;

/// Write `data` to `path` atomically using a sibling temporary file.
///
/// Creates the parent directory if it does not exist.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
