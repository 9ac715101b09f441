//! Transactions carrying the signatures of their command signers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::contract::VerificationEngine;
use crate::crypto::signing;
use crate::error::{LedgerError, Result};
use crate::party::{LocalIdentity, PublicKey};

use super::LedgerTransaction;

/// One party's Ed25519 signature over a transaction id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub by: PublicKey,
    pub signature: String,
}

/// A transaction plus the signatures collected for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub tx: LedgerTransaction,
    pub signatures: Vec<TransactionSignature>,
}

impl SignedTransaction {
    pub fn new(tx: LedgerTransaction) -> Self {
        Self {
            tx,
            signatures: Vec::new(),
        }
    }

    pub fn id(&self) -> &crate::hash::SecureHash {
        &self.tx.id
    }

    /// Add `identity`'s signature. Signing twice replaces the earlier one.
    pub fn sign(mut self, identity: &LocalIdentity) -> Self {
        let by = identity.public_key();
        self.signatures.retain(|s| s.by != by);
        self.signatures.push(TransactionSignature {
            by,
            signature: identity.sign_id(&self.tx.id),
        });
        self
    }

    /// Every key named as a signer by any command.
    pub fn required_signers(&self) -> BTreeSet<PublicKey> {
        self.tx
            .commands
            .iter()
            .flat_map(|c| c.signers.iter().copied())
            .collect()
    }

    /// Keys whose signature is required but absent.
    pub fn missing_signers(&self) -> Vec<PublicKey> {
        let present: BTreeSet<PublicKey> = self.signatures.iter().map(|s| s.by).collect();
        self.required_signers()
            .into_iter()
            .filter(|k| !present.contains(k))
            .collect()
    }

    /// Check every attached signature and that no required one is missing.
    pub fn verify_signatures(&self) -> Result<()> {
        for sig in &self.signatures {
            let key = sig.by.to_verifying_key()?;
            signing::verify_base64(&key, self.tx.id.as_bytes(), &sig.signature)?;
        }
        let missing = self.missing_signers();
        if !missing.is_empty() {
            return Err(LedgerError::MissingSignatures(missing));
        }
        Ok(())
    }

    /// Full check: id integrity, signatures, then the contracts.
    pub fn verify(&self, engine: &VerificationEngine) -> Result<()> {
        let computed = self.tx.recompute_id();
        if computed != self.tx.id {
            return Err(LedgerError::TransactionIdMismatch {
                expected: self.tx.id,
                computed,
            });
        }
        self.verify_signatures()?;
        engine.verify(&self.tx)?;
        Ok(())
    }
}
