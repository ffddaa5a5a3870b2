//! Custom Axum extractors for request authentication.
//!
//! Provides:
//! - `AdminAuth` — verifies the `Switchyard-Admin-Authorization` header
//!   against the argon2-hashed admin secret (used by the Admin API).
//! - `SdkTenant` — resolves the `Switchyard-Sdk-Key` header to a configured
//!   tenant (used by the SDK API).

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use switchyard_sdk::keys::derive_client_key;
use switchyard_sdk::objects::{ADMIN_AUTH_HEADER, SDK_KEY_HEADER};

use crate::config::runtime::TenantConfig;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// AdminAuth — Admin API authentication via the admin secret header
// ---------------------------------------------------------------------------

/// An Axum extractor that verifies the plaintext admin secret carried in
/// the `Switchyard-Admin-Authorization` header against the stored argon2
/// hash.
pub struct AdminAuth;

/// Errors returned by the [`AdminAuth`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum AdminAuthError {
    #[error("missing Switchyard-Admin-Authorization header")]
    MissingHeader,
    #[error("invalid Switchyard-Admin-Authorization header")]
    InvalidHeader,
    #[error("admin secret verification failed")]
    VerificationFailed,
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AdminAuthError::MissingHeader => (
                StatusCode::UNAUTHORIZED,
                "missing Switchyard-Admin-Authorization header",
            ),
            AdminAuthError::InvalidHeader => (
                StatusCode::BAD_REQUEST,
                "invalid Switchyard-Admin-Authorization header",
            ),
            AdminAuthError::VerificationFailed => {
                (StatusCode::UNAUTHORIZED, "admin secret verification failed")
            }
        };
        (status, message).into_response()
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(ADMIN_AUTH_HEADER)
            .ok_or(AdminAuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AdminAuthError::InvalidHeader)?;

        let admin = state.config.admin.read().await;
        if !admin.verify(presented) {
            drop(admin);
            return Err(AdminAuthError::VerificationFailed);
        }

        Ok(AdminAuth)
    }
}

// ---------------------------------------------------------------------------
// SdkTenant — SDK API authentication via the SDK key header
// ---------------------------------------------------------------------------

/// An Axum extractor that resolves the raw SDK key in the
/// `Switchyard-Sdk-Key` header to a configured tenant.
///
/// The key is hashed before lookup, so the handler only ever sees the
/// derived client key — the same identifier events are routed by.
pub struct SdkTenant(pub TenantConfig);

/// Errors returned by the [`SdkTenant`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum SdkAuthError {
    #[error("missing Switchyard-Sdk-Key header")]
    MissingHeader,
    #[error("invalid Switchyard-Sdk-Key header")]
    InvalidHeader,
    #[error("unknown sdk key")]
    UnknownKey,
}

impl IntoResponse for SdkAuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SdkAuthError::MissingHeader => {
                (StatusCode::UNAUTHORIZED, "missing Switchyard-Sdk-Key header")
            }
            SdkAuthError::InvalidHeader => {
                (StatusCode::BAD_REQUEST, "invalid Switchyard-Sdk-Key header")
            }
            SdkAuthError::UnknownKey => (StatusCode::UNAUTHORIZED, "unknown sdk key"),
        };
        (status, message).into_response()
    }
}

impl FromRequestParts<AppState> for SdkTenant {
    type Rejection = SdkAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw_key = parts
            .headers
            .get(SDK_KEY_HEADER)
            .ok_or(SdkAuthError::MissingHeader)?
            .to_str()
            .map_err(|_| SdkAuthError::InvalidHeader)?;

        let client_key = derive_client_key(raw_key);
        let tenant = state
            .config
            .tenant_by_client_key(&client_key)
            .await
            .ok_or(SdkAuthError::UnknownKey)?;

        Ok(SdkTenant(tenant))
    }
}
