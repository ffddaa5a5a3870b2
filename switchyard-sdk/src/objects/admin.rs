//! Admin API request and response objects.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::flag::{FlagType, Keyword, Variation};

/// Body of `POST /api/v1/admin/tenants/{tenant}/flags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlagRequest {
    pub title: CompactString,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub default_value: String,
    pub default_portion: i32,
    #[serde(default)]
    pub default_description: String,
    #[serde(default)]
    pub variations: Vec<Variation>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub tags: Vec<CompactString>,
}

/// Body of `PUT /api/v1/admin/flags/{flag_id}`.
///
/// The variation table is replaced wholesale; the flag's value type is
/// fixed at creation and cannot be changed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlagRequest {
    pub title: CompactString,
    #[serde(default)]
    pub description: String,
    pub default_value: String,
    pub default_portion: i32,
    #[serde(default)]
    pub default_description: String,
    #[serde(default)]
    pub variations: Vec<Variation>,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    #[serde(default)]
    pub tags: Vec<CompactString>,
}

/// Body of `POST /api/v1/admin/flags/{flag_id}/switch`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SwitchFlagRequest {
    pub active: bool,
}

/// A flag as returned to admin callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminFlagResponse {
    pub flag_id: Uuid,
    pub title: CompactString,
    pub description: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub default_value: String,
    pub default_portion: i32,
    pub default_description: String,
    pub variations: Vec<Variation>,
    pub keywords: Vec<Keyword>,
    pub tags: Vec<CompactString>,
    pub active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}
