//! Bounded attestation metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConstructionError;

/// Maximum number of metadata entries.
pub const MAX_METADATA_ENTRIES: usize = 10;
/// Maximum metadata key length, in characters.
pub const MAX_METADATA_KEY_LENGTH: usize = 256;
/// Maximum metadata value length, in characters.
pub const MAX_METADATA_VALUE_LENGTH: usize = 1024;

/// String metadata attached to an attestation.
///
/// Limits are checked on construction and on deserialization, so an
/// out-of-bounds instance cannot exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate and wrap `entries`.
    pub fn new(entries: BTreeMap<String, String>) -> Result<Self, ConstructionError> {
        if entries.len() > MAX_METADATA_ENTRIES {
            return Err(ConstructionError::TooManyMetadataEntries {
                count: entries.len(),
                max: MAX_METADATA_ENTRIES,
            });
        }
        for (key, value) in &entries {
            if key.chars().count() > MAX_METADATA_KEY_LENGTH {
                return Err(ConstructionError::MetadataKeyTooLong {
                    key: key.chars().take(32).collect::<String>() + "...",
                    max: MAX_METADATA_KEY_LENGTH,
                });
            }
            if value.chars().count() > MAX_METADATA_VALUE_LENGTH {
                return Err(ConstructionError::MetadataValueTooLong {
                    key: key.clone(),
                    max: MAX_METADATA_VALUE_LENGTH,
                });
            }
        }
        Ok(Self(entries))
    }

    /// Validate pairs, later duplicates replacing earlier ones.
    pub fn from_pairs<K, V>(
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, ConstructionError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl TryFrom<BTreeMap<String, String>> for Metadata {
    type Error = ConstructionError;

    fn try_from(entries: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<Metadata> for BTreeMap<String, String> {
    fn from(metadata: Metadata) -> Self {
        metadata.0
    }
}
