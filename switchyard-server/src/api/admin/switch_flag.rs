use axum::{Json, extract::Path, extract::State, response::IntoResponse};
use switchyard_sdk::objects::admin::SwitchFlagRequest;
use switchyard_sdk::objects::stream::{StreamFrame, SwitchPayload};
use uuid::Uuid;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, flag_to_admin_response};

/// `POST /flags/{flag_id}/switch` — set the active switch.
///
/// Subscribed clients receive a SWITCH event carrying only the title and
/// the new state; they already hold the rest of the definition.
pub async fn switch_flag(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(flag_id): Path<Uuid>,
    Json(request): Json<SwitchFlagRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let flag = state.store.set_active(flag_id, request.active).await?;

    tracing::info!(%flag_id, title = %flag.title, active = flag.active, "flag switched");
    state.broadcaster.publish(StreamFrame::Switch {
        client_key: flag.tenant.clone(),
        payload: SwitchPayload {
            title: flag.title.clone(),
            active: flag.active,
        },
    });

    Ok(Json(flag_to_admin_response(&flag)))
}
