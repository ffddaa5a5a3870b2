//! Admin API handlers.
//!
//! These endpoints are called by the admin dashboard frontend and require
//! the `Switchyard-Admin-Authorization` header with the plaintext admin
//! secret.
//!
//! # Endpoints
//!
//! - `POST   /tenants/{tenant}/flags`  – create a flag (emits CREATE)
//! - `GET    /tenants/{tenant}/flags`  – list flags (`?tag=`, `?keyword=`)
//! - `PUT    /flags/{flag_id}`         – replace a flag (emits UPDATE)
//! - `POST   /flags/{flag_id}/switch`  – toggle a flag (emits SWITCH)
//! - `DELETE /flags/{flag_id}`         – delete a flag (emits DELETE)

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

mod create_flag;
mod delete_flag;
mod list_flags;
mod switch_flag;
mod update_flag;

/// Build the Admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tenants/{tenant}/flags", post(create_flag::create_flag))
        .route("/tenants/{tenant}/flags", get(list_flags::list_flags))
        .route("/flags/{flag_id}", put(update_flag::update_flag))
        .route("/flags/{flag_id}/switch", post(switch_flag::switch_flag))
        .route("/flags/{flag_id}", delete(delete_flag::delete_flag))
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    UnknownTenant(String),
    Store(switchyard_core::store::StoreError),
}

impl From<switchyard_core::store::StoreError> for AdminApiError {
    fn from(err: switchyard_core::store::StoreError) -> Self {
        Self::Store(err)
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> axum::response::Response {
        use switchyard_core::store::StoreError;

        match self {
            AdminApiError::UnknownTenant(name) => {
                tracing::debug!(tenant = %name, "Admin API: unknown tenant");
                (StatusCode::NOT_FOUND, "unknown tenant").into_response()
            }
            AdminApiError::Store(StoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "flag not found").into_response()
            }
            AdminApiError::Store(StoreError::DuplicateTitle(title)) => (
                StatusCode::CONFLICT,
                format!("a flag titled `{title}` already exists"),
            )
                .into_response(),
            AdminApiError::Store(StoreError::Validation(e)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

use switchyard_core::flag::Flag;
use switchyard_sdk::objects::admin::AdminFlagResponse;

pub(crate) fn flag_to_admin_response(f: &Flag) -> AdminFlagResponse {
    AdminFlagResponse {
        flag_id: f.flag_id,
        title: f.title.clone(),
        description: f.description.clone(),
        flag_type: f.flag_type,
        default_value: f.default_value.clone(),
        default_portion: f.default_portion,
        default_description: f.default_description.clone(),
        variations: f.variations.clone(),
        keywords: f.keywords.clone(),
        tags: f.tags.clone(),
        active: f.active,
        created_at: f.created_at.unix_timestamp(),
        updated_at: f.updated_at.unix_timestamp(),
    }
}
