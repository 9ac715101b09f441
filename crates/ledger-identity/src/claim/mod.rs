//! Claims — self-describing statements about a party.
//!
//! A claim says "`issuer` asserts that `holder` has `property` = `value`".
//! Issuer, holder, property, chain id and the value's runtime type are
//! fixed for the life of the claim chain; only the value may change on
//! amendment, and each amendment links to the version it replaces.

#[allow(clippy::module_inception)]
pub mod claim;
pub mod pointer;
pub mod value;

pub use claim::{Claim, ClaimBuilder, ClaimImmutability, ClaimState};
pub use pointer::{ClaimPointer, ClaimSelector};
pub use value::{ClaimValue, ValueType};
