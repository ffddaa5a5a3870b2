use axum::{extract::Path, extract::State, http::StatusCode, response::IntoResponse};
use switchyard_sdk::objects::stream::{DeletePayload, StreamFrame};
use uuid::Uuid;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

/// `DELETE /flags/{flag_id}` — delete a flag.
///
/// Whether the record is removed or tombstoned is the store's retention
/// policy; the API behaves identically either way. Subscribed clients
/// receive a DELETE event with the title so they can evict it.
pub async fn delete_flag(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(flag_id): Path<Uuid>,
) -> Result<impl IntoResponse, AdminApiError> {
    let flag = state.store.delete(flag_id).await?;

    tracing::info!(%flag_id, title = %flag.title, "flag deleted");
    state.broadcaster.publish(StreamFrame::Delete {
        client_key: flag.tenant.clone(),
        payload: DeletePayload {
            title: flag.title.clone(),
        },
    });

    Ok(StatusCode::NO_CONTENT)
}
