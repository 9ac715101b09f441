//! Account parties — acting on behalf of an account record.
//!
//! An `AccountParty` lets a record name "alice's savings account" as a
//! participant. The account itself holds no key: signatures come from the
//! owning key, while the account chain id and type make the party
//! resolvable back to the account record.

use serde::{Deserialize, Serialize};

use crate::account::AccountState;
use crate::pointer::LinearPointer;
use crate::state::{ChainId, ContractState, StateType};

use super::PublicKey;

/// A party acting on behalf of an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountParty {
    pub owning_key: PublicKey,
    pub name: Option<String>,
    pub account_type: StateType,
    pub account_chain_id: ChainId,
}

impl AccountParty {
    /// Derive the account party for an account state.
    pub fn for_account<A: AccountState>(account: &A) -> Self {
        let base = account.account();
        Self {
            owning_key: *base.owner().owning_key(),
            name: base.owner().name().map(str::to_string),
            account_type: A::state_type(),
            account_chain_id: base.chain_id().clone(),
        }
    }

    /// A pointer to the current version of the account record.
    ///
    /// The pointer carries the stored account type, so resolving it as a
    /// different account type fails with `InvalidStateType`.
    pub fn account_pointer<A: AccountState>(&self) -> LinearPointer<A> {
        LinearPointer::with_state_type(self.account_type.clone(), self.account_chain_id.clone())
    }

    /// Whether this party acts for accounts of type `A`.
    pub fn is_account_type<A: ContractState>(&self) -> bool {
        self.account_type == A::state_type()
    }
}
