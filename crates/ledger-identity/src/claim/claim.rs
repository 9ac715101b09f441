//! The claim record and its amendment semantics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hash::{ContentHasher, SecureHash};
use crate::party::{dedup_participants, AbstractParty};
use crate::state::{ChainId, ChainedState, ContractState, LinearState, RecordRef, StateType};

use super::value::ClaimValue;

/// Query column names written by claims.
pub const FIELD_ISSUER: &str = "claim.issuer";
pub const FIELD_HOLDER: &str = "claim.holder";
pub const FIELD_PROPERTY: &str = "claim.property";
pub const FIELD_VALUE_TYPE: &str = "claim.value_type";

/// A claim that `holder` has `property` with `value`, asserted by `issuer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim<T> {
    issuer: AbstractParty,
    holder: AbstractParty,
    property: String,
    value: T,
    chain_id: ChainId,
    previous_record_ref: Option<RecordRef>,
}

impl<T: ClaimValue> Claim<T> {
    /// Start building a claim. The holder defaults to the issuer.
    pub fn builder(
        issuer: impl Into<AbstractParty>,
        property: impl Into<String>,
        value: T,
    ) -> ClaimBuilder<T> {
        ClaimBuilder::new(issuer, property, value)
    }

    /// Issue a new claim on a fresh chain.
    pub fn issue(
        issuer: impl Into<AbstractParty>,
        holder: impl Into<AbstractParty>,
        property: impl Into<String>,
        value: T,
    ) -> Self {
        ClaimBuilder::new(issuer, property, value)
            .holder(holder)
            .build()
    }

    /// Issue a claim the issuer makes about itself.
    pub fn self_issued(
        issuer: impl Into<AbstractParty>,
        property: impl Into<String>,
        value: T,
    ) -> Self {
        ClaimBuilder::new(issuer, property, value).build()
    }

    pub fn issuer(&self) -> &AbstractParty {
        &self.issuer
    }

    pub fn holder(&self) -> &AbstractParty {
        &self.holder
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn is_self_issued(&self) -> bool {
        self.issuer == self.holder
    }

    /// Content hash over, in order: issuer, holder, property, value,
    /// value type, previous record reference. The chain id is not hashed.
    pub fn compute_hash(&self) -> SecureHash {
        let mut hasher = ContentHasher::new("ledger-identity/claim");
        hasher
            .update(&self.issuer)
            .update(&self.holder)
            .str(&self.property)
            .update(&self.value)
            .update(&self.value.value_type())
            .update(&self.previous_record_ref);
        hasher.finish()
    }

    /// The query columns a claim contributes. Derived claim types should
    /// return these from their own `query_fields` so claim pointers can
    /// narrow on them.
    pub fn claim_query_fields(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (FIELD_ISSUER.to_string(), self.issuer.owning_key().to_base64()),
            (FIELD_HOLDER.to_string(), self.holder.owning_key().to_base64()),
            (FIELD_PROPERTY.to_string(), self.property.clone()),
            (
                FIELD_VALUE_TYPE.to_string(),
                self.value.value_type().to_string(),
            ),
        ])
    }

    /// A new version of this claim with `value`, linked to `previous_record_ref`.
    pub fn amend(&self, previous_record_ref: RecordRef, value: T) -> Self {
        Self {
            issuer: self.issuer.clone(),
            holder: self.holder.clone(),
            property: self.property.clone(),
            value,
            chain_id: self.chain_id.clone(),
            previous_record_ref: Some(previous_record_ref),
        }
    }
}

/// Builder for new claims.
pub struct ClaimBuilder<T> {
    issuer: AbstractParty,
    holder: Option<AbstractParty>,
    property: String,
    value: T,
    chain_id: Option<ChainId>,
}

impl<T: ClaimValue> ClaimBuilder<T> {
    pub fn new(issuer: impl Into<AbstractParty>, property: impl Into<String>, value: T) -> Self {
        Self {
            issuer: issuer.into(),
            holder: None,
            property: property.into(),
            value,
            chain_id: None,
        }
    }

    /// Set the holder (defaults to the issuer).
    pub fn holder(mut self, holder: impl Into<AbstractParty>) -> Self {
        self.holder = Some(holder.into());
        self
    }

    /// Use an existing chain id instead of a fresh one.
    pub fn chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn build(self) -> Claim<T> {
        Claim {
            holder: self.holder.unwrap_or_else(|| self.issuer.clone()),
            issuer: self.issuer,
            property: self.property,
            value: self.value,
            chain_id: self.chain_id.unwrap_or_default(),
            previous_record_ref: None,
        }
    }
}

impl<T: ClaimValue> ContractState for Claim<T> {
    fn state_type() -> StateType {
        StateType::new(format!("ledger-identity/claim<{}>", T::type_name()))
    }

    fn participants(&self) -> Vec<AbstractParty> {
        dedup_participants([self.issuer.clone(), self.holder.clone()])
    }

    fn chain_id(&self) -> Option<&ChainId> {
        Some(&self.chain_id)
    }

    fn content_hash(&self) -> Option<SecureHash> {
        Some(self.compute_hash())
    }

    fn query_fields(&self) -> BTreeMap<String, String> {
        self.claim_query_fields()
    }
}

impl<T: ClaimValue> LinearState for Claim<T> {
    fn linear_id(&self) -> &ChainId {
        &self.chain_id
    }
}

impl<T: ClaimValue> ChainedState for Claim<T> {
    fn previous_record_ref(&self) -> Option<&RecordRef> {
        self.previous_record_ref.as_ref()
    }

    fn hash(&self) -> SecureHash {
        self.compute_hash()
    }
}

/// A claim record type: the base [`Claim`] or a type that wraps one.
///
/// Wrapping types carry the base claim plus their own fields. `amend` is
/// required so a wrapper always carries its extra fields forward. A
/// wrapper that adds immutable fields must also override
/// `immutable_equals`; the default accepts any change to them, and the
/// verification engine has no way to notice.
pub trait ClaimState: ChainedState {
    type Value: ClaimValue;

    fn claim(&self) -> &Claim<Self::Value>;

    /// A new version with `value`, linked to `previous_record_ref`.
    fn amend(&self, previous_record_ref: RecordRef, value: Self::Value) -> Self;

    /// Equality over the wrapper's own immutable fields.
    fn immutable_equals(&self, _other: &Self) -> bool {
        true
    }
}

impl<T: ClaimValue> ClaimState for Claim<T> {
    type Value = T;

    fn claim(&self) -> &Claim<T> {
        self
    }

    fn amend(&self, previous_record_ref: RecordRef, value: T) -> Self {
        Claim::amend(self, previous_record_ref, value)
    }
}

/// Immutable-field comparison for claims. Implemented for every
/// [`ClaimState`] and not overridable.
pub trait ClaimImmutability {
    /// True when value type, issuer, holder, property and chain id match,
    /// and the type's `immutable_equals` holds.
    fn internal_immutable_equals(&self, other: &Self) -> bool;
}

impl<S: ClaimState> ClaimImmutability for S {
    fn internal_immutable_equals(&self, other: &Self) -> bool {
        let (a, b) = (self.claim(), other.claim());
        a.value.value_type() == b.value.value_type()
            && a.issuer == b.issuer
            && a.holder == b.holder
            && a.property == b.property
            && a.chain_id == b.chain_id
            && self.immutable_equals(other)
    }
}
