//! Claim pointers — pointers narrowed by the claim's fixed fields.

use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;
use crate::hash::SecureHash;
use crate::party::AbstractParty;
use crate::pointer::{LinearPointer, Pointer, StaticPointer};
use crate::query::QueryCriteria;
use crate::state::{ChainId, Record, StateType};

use super::claim::{FIELD_HOLDER, FIELD_ISSUER, FIELD_PROPERTY};
use super::{ClaimState, ClaimValue, ValueType};

/// The fixed fields a claim pointer narrows on.
///
/// `value_type` is checked after decoding rather than used as a filter,
/// so a record whose value changed runtime type fails loudly instead of
/// disappearing. `None` accepts any runtime type of the static value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSelector {
    pub issuer: AbstractParty,
    pub holder: AbstractParty,
    pub property: String,
    pub value_type: Option<ValueType>,
}

impl ClaimSelector {
    pub fn new(
        issuer: impl Into<AbstractParty>,
        holder: impl Into<AbstractParty>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            holder: holder.into(),
            property: property.into(),
            value_type: None,
        }
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    /// The selector matching `claim` exactly, value type included.
    pub fn for_claim<S: ClaimState>(claim: &S) -> Self {
        let base = claim.claim();
        Self::new(base.issuer().clone(), base.holder().clone(), base.property())
            .with_value_type(base.value().value_type())
    }

    /// Issuer, holder (by key) and property match.
    pub fn selects<S: ClaimState>(&self, claim: &S) -> bool {
        let base = claim.claim();
        base.issuer().owning_key() == self.issuer.owning_key()
            && base.holder().owning_key() == self.holder.owning_key()
            && base.property() == self.property
    }

    fn narrow(&self, criteria: QueryCriteria) -> QueryCriteria {
        criteria
            .field(FIELD_ISSUER, self.issuer.owning_key().to_base64())
            .field(FIELD_HOLDER, self.holder.owning_key().to_base64())
            .field(FIELD_PROPERTY, self.property.clone())
    }
}

/// A pointer to a claim, by chain identity or by exact version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClaimPointer<S> {
    Linear {
        selector: ClaimSelector,
        pointer: LinearPointer<S>,
    },
    Static {
        selector: ClaimSelector,
        pointer: StaticPointer<S>,
    },
}

impl<S: ClaimState> ClaimPointer<S> {
    /// Point at the current version of the claim chain `chain_id`.
    pub fn linear(selector: ClaimSelector, chain_id: ChainId) -> Self {
        Self::Linear {
            selector,
            pointer: LinearPointer::new(chain_id),
        }
    }

    /// Point at the chain `record` belongs to.
    pub fn linear_to(record: &Record<S>) -> Self {
        Self::Linear {
            selector: ClaimSelector::for_claim(&record.state),
            pointer: LinearPointer::to_record(record),
        }
    }

    /// Point at exactly `record`.
    pub fn static_to(record: &Record<S>) -> Self {
        Self::Static {
            selector: ClaimSelector::for_claim(&record.state),
            pointer: StaticPointer::to_record(record),
        }
    }

    pub fn selector(&self) -> &ClaimSelector {
        match self {
            Self::Linear { selector, .. } | Self::Static { selector, .. } => selector,
        }
    }

    pub fn is_linear(&self) -> bool {
        matches!(self, Self::Linear { .. })
    }
}

impl<S: ClaimState> Pointer<S> for ClaimPointer<S> {
    fn state_type(&self) -> &StateType {
        match self {
            Self::Linear { pointer, .. } => pointer.state_type(),
            Self::Static { pointer, .. } => pointer.state_type(),
        }
    }

    fn hash(&self) -> SecureHash {
        match self {
            Self::Linear { pointer, .. } => pointer.hash(),
            Self::Static { pointer, .. } => pointer.hash(),
        }
    }

    fn is_pointing_to(&self, record: &Record<S>) -> bool {
        let located = match self {
            Self::Linear { pointer, .. } => pointer.is_pointing_to(record),
            Self::Static { pointer, .. } => pointer.is_pointing_to(record),
        };
        located && self.selector().selects(&record.state)
    }

    fn criteria(&self) -> QueryCriteria {
        match self {
            Self::Linear { selector, pointer } => selector.narrow(pointer.criteria()),
            Self::Static { selector, pointer } => selector.narrow(pointer.criteria()),
        }
    }

    fn check_record(&self, record: &Record<S>) -> Result<(), ResolutionError> {
        if let Some(expected) = &self.selector().value_type {
            let actual = record.state.claim().value().value_type();
            if &actual != expected {
                return Err(ResolutionError::InvalidStateType {
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }
        }
        Ok(())
    }
}
