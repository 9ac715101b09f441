//! Accounts — ownership-only records.
//!
//! An [`Account`] binds a chain id to an owner. The owner is fixed: the
//! fields are private, there is no setter, and the only way to produce
//! an account is [`Account::new`], which always starts a fresh chain.
//! Types that attach application state to an account wrap an `Account`
//! and implement [`AccountState`]; amending them can change their own
//! fields but has no way to reach the owner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::party::{AbstractParty, AccountParty};
use crate::state::{ChainId, ContractState, LinearState, StateType};

/// Query column written by accounts.
pub const FIELD_OWNER: &str = "account.owner";

/// The owner and chain identity of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    owner: AbstractParty,
    chain_id: ChainId,
}

impl Account {
    /// Open a new account for `owner` on a fresh chain.
    pub fn new(owner: impl Into<AbstractParty>) -> Self {
        Self {
            owner: owner.into(),
            chain_id: ChainId::new(),
        }
    }

    /// Open a new account whose chain carries an external id.
    pub fn with_external_id(owner: impl Into<AbstractParty>, external_id: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            chain_id: ChainId::with_external_id(external_id),
        }
    }

    pub fn owner(&self) -> &AbstractParty {
        &self.owner
    }

    pub fn chain_id(&self) -> &ChainId {
        &self.chain_id
    }

    pub fn account_query_fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(
            FIELD_OWNER.to_string(),
            self.owner.owning_key().to_base64(),
        )])
    }
}

impl ContractState for Account {
    fn state_type() -> StateType {
        StateType::new("ledger-identity/account")
    }

    fn participants(&self) -> Vec<AbstractParty> {
        vec![self.owner.clone()]
    }

    fn chain_id(&self) -> Option<&ChainId> {
        Some(&self.chain_id)
    }

    fn query_fields(&self) -> BTreeMap<String, String> {
        self.account_query_fields()
    }
}

impl LinearState for Account {
    fn linear_id(&self) -> &ChainId {
        &self.chain_id
    }
}

/// An account record type: the base [`Account`] or a type that wraps one.
pub trait AccountState: LinearState {
    fn account(&self) -> &Account;

    /// The party that acts on behalf of this account.
    fn account_party(&self) -> AccountParty
    where
        Self: Sized,
    {
        AccountParty::for_account(self)
    }
}

impl AccountState for Account {
    fn account(&self) -> &Account {
        self
    }
}
