//! Wire objects shared by the Switchyard server, admin tooling and SDKs.

pub mod admin;
pub mod flag;
pub mod stream;

pub use admin::{AdminFlagResponse, CreateFlagRequest, SwitchFlagRequest, UpdateFlagRequest};
pub use flag::{FlagSnapshot, FlagType, InitResponse, Keyword, Property, Variation};
pub use stream::{DeletePayload, StreamFrame, SwitchPayload};

/// Header carrying the raw SDK key on SDK API requests.
pub const SDK_KEY_HEADER: &str = "Switchyard-Sdk-Key";

/// Header carrying the admin secret on Admin API requests.
pub const ADMIN_AUTH_HEADER: &str = "Switchyard-Admin-Authorization";
