//! Transaction commands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VerificationError;
use crate::hash::{ContentHasher, Hashable};
use crate::party::PublicKey;
use crate::state::{ContractState, StateType};

/// The three lifecycle transitions every record family supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleCommand {
    Issue,
    Amend,
    Revoke,
}

impl LifecycleCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Amend => "amend",
            Self::Revoke => "revoke",
        }
    }

    /// Parse an action carried by a command of `family`.
    pub fn parse_for(family: &StateType, action: &str) -> Result<Self, VerificationError> {
        action
            .parse()
            .map_err(|_| VerificationError::UnrecognizedCommand {
                family: family.clone(),
                action: action.to_string(),
            })
    }
}

impl fmt::Display for LifecycleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "issue" => Ok(Self::Issue),
            "amend" => Ok(Self::Amend),
            "revoke" => Ok(Self::Revoke),
            other => Err(format!("unknown lifecycle command: {other}")),
        }
    }
}

/// A command: which family it governs, what it does, and who must sign.
///
/// `action` is kept as a string so an unknown action survives decoding
/// and is rejected by the engine instead of by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub family: StateType,
    pub action: String,
    pub signers: Vec<PublicKey>,
}

impl Hashable for Command {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher
            .update(&self.family)
            .str(&self.action)
            .update(&self.signers);
    }
}

impl Command {
    pub fn new(family: StateType, command: LifecycleCommand, signers: Vec<PublicKey>) -> Self {
        Self {
            family,
            action: command.as_str().to_string(),
            signers,
        }
    }

    /// A lifecycle command for records of type `S`.
    pub fn for_state<S: ContractState>(command: LifecycleCommand, signers: Vec<PublicKey>) -> Self {
        Self::new(S::state_type(), command, signers)
    }

    /// A command with an arbitrary action string.
    pub fn custom(family: StateType, action: impl Into<String>, signers: Vec<PublicKey>) -> Self {
        Self {
            family,
            action: action.into(),
            signers,
        }
    }

    pub fn is_signed_by(&self, key: &PublicKey) -> bool {
        self.signers.contains(key)
    }
}
