use axum::{Json, extract::Path, extract::State, response::IntoResponse};
use switchyard_core::flag::FlagUpdate;
use switchyard_sdk::objects::admin::UpdateFlagRequest;
use switchyard_sdk::objects::stream::StreamFrame;
use uuid::Uuid;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, flag_to_admin_response};

/// `PUT /flags/{flag_id}` — replace a flag's definition.
///
/// The variation table is replaced wholesale; the flag's value type never
/// changes. Subscribed clients receive an UPDATE event with the new
/// snapshot.
pub async fn update_flag(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(flag_id): Path<Uuid>,
    Json(request): Json<UpdateFlagRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let flag = state
        .store
        .update(
            flag_id,
            FlagUpdate {
                title: request.title,
                description: request.description,
                default_value: request.default_value,
                default_portion: request.default_portion,
                default_description: request.default_description,
                variations: request.variations,
                keywords: request.keywords,
                tags: request.tags,
            },
        )
        .await?;

    tracing::info!(%flag_id, title = %flag.title, "flag updated");
    state.broadcaster.publish(StreamFrame::Update {
        client_key: flag.tenant.clone(),
        payload: flag.snapshot(),
    });

    Ok(Json(flag_to_admin_response(&flag)))
}
