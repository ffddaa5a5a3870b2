use axum::{Json, extract::Path, extract::State, http::StatusCode, response::IntoResponse};
use switchyard_core::flag::NewFlag;
use switchyard_sdk::objects::admin::CreateFlagRequest;
use switchyard_sdk::objects::stream::StreamFrame;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, flag_to_admin_response};

/// `POST /tenants/{tenant}/flags` — create a flag.
///
/// The flag starts active. Subscribed clients of the tenant receive a
/// CREATE event with the full flag snapshot.
pub async fn create_flag(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(tenant): Path<String>,
    Json(request): Json<CreateFlagRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let tenant = state
        .config
        .tenant_by_name(&tenant)
        .await
        .ok_or(AdminApiError::UnknownTenant(tenant))?;

    let flag = state
        .store
        .create(NewFlag {
            tenant: tenant.client_key.clone(),
            title: request.title,
            description: request.description,
            flag_type: request.flag_type,
            default_value: request.default_value,
            default_portion: request.default_portion,
            default_description: request.default_description,
            variations: request.variations,
            keywords: request.keywords,
            tags: request.tags,
        })
        .await?;

    tracing::info!(tenant = %tenant.name, title = %flag.title, "flag created");
    state.broadcaster.publish(StreamFrame::Create {
        client_key: flag.tenant.clone(),
        payload: flag.snapshot(),
    });

    Ok((StatusCode::CREATED, Json(flag_to_admin_response(&flag))))
}
