use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, flag_to_admin_response};

/// Query parameters for flag listing. `tag` wins if both are given.
#[derive(Debug, Deserialize)]
pub struct ListFlagsQuery {
    pub tag: Option<String>,
    pub keyword: Option<String>,
}

/// `GET /tenants/{tenant}/flags` — list the tenant's flags.
///
/// Optionally filtered by `?tag=` (exact tag match) or `?keyword=`
/// (substring of title or description). Deleted flags never appear.
pub async fn list_flags(
    State(state): State<AppState>,
    _auth: AdminAuth,
    Path(tenant): Path<String>,
    Query(query): Query<ListFlagsQuery>,
) -> Result<impl IntoResponse, AdminApiError> {
    let tenant = state
        .config
        .tenant_by_name(&tenant)
        .await
        .ok_or(AdminApiError::UnknownTenant(tenant))?;

    let flags = match (&query.tag, &query.keyword) {
        (Some(tag), _) => state.store.find_by_tag(&tenant.client_key, tag).await?,
        (None, Some(keyword)) => {
            state
                .store
                .find_by_keyword(&tenant.client_key, keyword)
                .await?
        }
        (None, None) => state.store.list(&tenant.client_key).await?,
    };

    let responses: Vec<_> = flags.iter().map(flag_to_admin_response).collect();
    Ok(Json(responses))
}
