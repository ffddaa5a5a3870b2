//! Flag and variation entities.
//!
//! Value validation lives here and runs at write time only: a flag that
//! made it into the store is guaranteed to evaluate cleanly, so the
//! bucketing engine and the SDKs never re-validate.

use compact_str::CompactString;
use switchyard_sdk::keys::ClientKey;
use switchyard_sdk::objects::flag::{FlagSnapshot, FlagType, Keyword, Variation};
use time::OffsetDateTime;
use uuid::Uuid;

/// A flag definition owned by one tenant.
#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    pub flag_id: Uuid,
    /// Client key of the owning tenant; change events for this flag are
    /// routed to this key.
    pub tenant: ClientKey,
    pub title: CompactString,
    pub description: String,
    pub flag_type: FlagType,
    pub default_value: String,
    pub default_portion: i32,
    pub default_description: String,
    pub variations: Vec<Variation>,
    pub keywords: Vec<Keyword>,
    pub tags: Vec<CompactString>,
    pub active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    /// Set instead of removing the record under the tombstoned retention
    /// policy.
    pub deleted_at: Option<OffsetDateTime>,
}

impl Flag {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The wire shape delivered to SDK clients.
    pub fn snapshot(&self) -> FlagSnapshot {
        FlagSnapshot {
            flag_id: self.flag_id,
            title: self.title.clone(),
            description: self.description.clone(),
            flag_type: self.flag_type,
            default_value: self.default_value.clone(),
            default_portion: self.default_portion,
            default_description: self.default_description.clone(),
            variations: self.variations.clone(),
            keywords: self.keywords.clone(),
            active: self.active,
        }
    }
}

/// Input for creating a flag.
#[derive(Debug, Clone)]
pub struct NewFlag {
    pub tenant: ClientKey,
    pub title: CompactString,
    pub description: String,
    pub flag_type: FlagType,
    pub default_value: String,
    pub default_portion: i32,
    pub default_description: String,
    pub variations: Vec<Variation>,
    pub keywords: Vec<Keyword>,
    pub tags: Vec<CompactString>,
}

/// Input for updating a flag.
///
/// The variation table is replaced wholesale with the supplied one; there
/// is no diff-and-patch path.
#[derive(Debug, Clone)]
pub struct FlagUpdate {
    pub title: CompactString,
    pub description: String,
    pub default_value: String,
    pub default_portion: i32,
    pub default_description: String,
    pub variations: Vec<Variation>,
    pub keywords: Vec<Keyword>,
    pub tags: Vec<CompactString>,
}

/// Write-time validation failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FlagValidationError {
    #[error("value `{value}` is not legal for a {flag_type:?} flag")]
    InvalidValue { flag_type: FlagType, value: String },

    #[error("portion {0} is outside [0, 100]")]
    InvalidPortion(i32),

    #[error("flag title must not be empty")]
    EmptyTitle,
}

/// Check one variation value against the flag's declared type.
///
/// BOOLEAN values must be `TRUE` or `FALSE`, INTEGER values digit-only
/// (with an optional leading minus), JSON must parse; STRING accepts
/// anything.
pub fn validate_value(flag_type: FlagType, value: &str) -> Result<(), FlagValidationError> {
    let ok = match flag_type {
        FlagType::Boolean => value == "TRUE" || value == "FALSE",
        FlagType::Integer => {
            let digits = value.strip_prefix('-').unwrap_or(value);
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        }
        FlagType::String => true,
        FlagType::Json => serde_json::from_str::<serde_json::Value>(value).is_ok(),
    };
    if ok {
        Ok(())
    } else {
        Err(FlagValidationError::InvalidValue {
            flag_type,
            value: value.to_owned(),
        })
    }
}

pub fn validate_portion(portion: i32) -> Result<(), FlagValidationError> {
    if (0..=100).contains(&portion) {
        Ok(())
    } else {
        Err(FlagValidationError::InvalidPortion(portion))
    }
}

/// Validate a full variation table (default plus extras) and the keyword
/// values that can short-circuit it.
pub fn validate_table(
    flag_type: FlagType,
    default_value: &str,
    default_portion: i32,
    variations: &[Variation],
    keywords: &[Keyword],
) -> Result<(), FlagValidationError> {
    validate_value(flag_type, default_value)?;
    validate_portion(default_portion)?;
    for variation in variations {
        validate_value(flag_type, &variation.value)?;
        validate_portion(variation.portion)?;
    }
    for keyword in keywords {
        validate_value(flag_type, &keyword.value)?;
    }
    Ok(())
}
