//! Flag definition objects as they appear on the wire.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::keys::ClientKey;

/// The declared value type of a flag.
///
/// Every variation value of a flag must be representable in this type; the
/// server enforces that at write time, so SDKs can trust the cached
/// definitions at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlagType {
    Boolean,
    String,
    Integer,
    Json,
}

/// One possible value a flag can resolve to, with its traffic portion.
///
/// `value` is stored as a string regardless of [`FlagType`]; it is parsed
/// into the declared type at evaluation. `portion` is an integer percentage
/// in `[0, 100]`, treated as a relative weight by the bucketing engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub value: String,
    pub portion: i32,
    #[serde(default)]
    pub description: String,
}

impl Variation {
    pub fn new(value: impl Into<String>, portion: i32) -> Self {
        Self {
            value: value.into(),
            portion,
            description: String::new(),
        }
    }
}

/// One property a targeting keyword requires of the evaluated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub property: CompactString,
    pub data: String,
}

impl Property {
    pub fn new(property: impl Into<CompactString>, data: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            data: data.into(),
        }
    }
}

/// A targeting rule: users whose properties match every listed property
/// resolve to `value` directly, bypassing the bucketing engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub properties: Vec<Property>,
    #[serde(default)]
    pub description: String,
    pub value: String,
}

/// A full flag definition as delivered to SDK clients.
///
/// This is the payload of the initial fetch and of CREATE/UPDATE change
/// events. SDKs key their local cache by `title`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagSnapshot {
    pub flag_id: Uuid,
    pub title: CompactString,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub default_value: String,
    pub default_portion: i32,
    #[serde(default)]
    pub default_description: String,
    pub variations: Vec<Variation>,
    /// Targeting rules, checked before bucketing.
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    pub active: bool,
}

impl FlagSnapshot {
    /// The default variation as a [`Variation`] for the bucketing engine.
    pub fn default_variation(&self) -> Variation {
        Variation {
            value: self.default_value.clone(),
            portion: self.default_portion,
            description: self.default_description.clone(),
        }
    }
}

/// Response of `GET /api/v1/sdk/init`: the derived client key plus the
/// tenant's full current flag set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitResponse {
    pub user_key: ClientKey,
    pub flags: Vec<FlagSnapshot>,
}
