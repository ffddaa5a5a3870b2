//! The client evaluation library.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest` and the WebSocket stack.
//!
//! A [`FlagClient`] fetches the tenant's full flag set once at startup,
//! keeps it current over a WebSocket subscription, and evaluates flags
//! purely locally — no network round-trip per evaluation.

mod cache;
mod flag_client;
mod stream;

pub use cache::FlagCache;
pub use flag_client::{evaluate, evaluate_for, EvaluateError, FlagClient, FlagValue, UserContext};

use reqwest::StatusCode;

/// Errors produced while talking to the Switchyard server.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Errors surfaced by [`FlagClient::connect`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The initial full fetch failed. The caller decides whether to retry
    /// or run with application-side defaults; no background task was
    /// started.
    #[error("initialization failed: {0}")]
    Initialization(#[from] FetchError),
}
