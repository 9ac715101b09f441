//! Claim values and their runtime type tags.

use std::fmt::{self, Debug};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::hash::{ContentHasher, Hashable};

/// Runtime type tag of a claim value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueType(pub String);

impl ValueType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Hashable for ValueType {
    fn write_to(&self, hasher: &mut ContentHasher) {
        hasher.str(&self.0);
    }
}

/// A value that can be claimed.
///
/// `type_name` is the static tag used in the claim's state type.
/// `value_type` is the runtime tag; for dynamically typed values such as
/// `serde_json::Value` it can differ between instances, which is why
/// amendment checks it. The value enters the claim hash through its
/// [`Hashable`] encoding.
pub trait ClaimValue:
    Clone + Debug + PartialEq + Hashable + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn type_name() -> &'static str;

    fn value_type(&self) -> ValueType {
        ValueType::new(Self::type_name())
    }
}

macro_rules! impl_claim_value {
    ($($ty:ty => $tag:literal),* $(,)?) => {
        $(
            impl ClaimValue for $ty {
                fn type_name() -> &'static str {
                    $tag
                }
            }
        )*
    };
}

impl_claim_value! {
    bool => "bool",
    i32 => "i32",
    i64 => "i64",
    u32 => "u32",
    u64 => "u64",
    f64 => "f64",
    String => "string",
    uuid::Uuid => "uuid",
    chrono::DateTime<chrono::Utc> => "datetime",
}

impl ClaimValue for serde_json::Value {
    fn type_name() -> &'static str {
        "json"
    }

    fn value_type(&self) -> ValueType {
        let variant = match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        };
        ValueType::new(format!("json.{variant}"))
    }
}
