//! SDK API handlers.
//!
//! These endpoints are called by evaluation clients and require the
//! `Switchyard-Sdk-Key` header with the tenant's raw SDK key.
//!
//! # Endpoints
//!
//! - `GET /init`   – full fetch of the tenant's flag set
//! - `GET /stream` – WebSocket stream of flag change events

use axum::{Router, routing::get};

use crate::state::AppState;

mod init;
mod stream;

/// Build the SDK API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/init", get(init::init))
        .route("/stream", get(stream::stream))
}
