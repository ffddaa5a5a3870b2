use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use switchyard_sdk::objects::flag::InitResponse;

use crate::api::extractors::SdkTenant;
use crate::state::AppState;

/// `GET /init` — full fetch of the tenant's flag set.
///
/// Returns every live flag (active or not) plus the derived client key the
/// server routes this tenant's events by. Clients call this once at
/// startup and again after a stream reconnect to re-sync.
pub async fn init(
    State(state): State<AppState>,
    SdkTenant(tenant): SdkTenant,
) -> impl IntoResponse {
    match state.store.list(&tenant.client_key).await {
        Ok(flags) => {
            let response = InitResponse {
                user_key: tenant.client_key,
                flags: flags.iter().map(|flag| flag.snapshot()).collect(),
            };
            Json(response).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, tenant = %tenant.name, "SDK init: store read failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}
