//! Background subscription task.
//!
//! Holds the WebSocket delivery channel open and applies incoming change
//! events to the local cache. There is no replay log on the server, so a
//! dropped connection means events may have been missed: every reconnect
//! performs a fresh full fetch before resuming the stream.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;

use super::flag_client::{fetch_init, ClientInner};
use crate::objects::stream::StreamFrame;
use crate::objects::SDK_KEY_HEADER;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
enum StreamError {
    #[error("invalid stream url: {0}")]
    Url(#[from] url::ParseError),
    #[error("unsupported base url scheme")]
    Scheme,
    #[error("invalid sdk key header")]
    Header,
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// Run the subscription loop until the owning client is dropped.
pub(super) async fn run(inner: Arc<ClientInner>) {
    let mut backoff = INITIAL_BACKOFF;
    loop {
        match pump(&inner).await {
            Ok(()) => {
                tracing::info!("flag stream closed by server, reconnecting");
                backoff = INITIAL_BACKOFF;
            }
            Err(e) => {
                tracing::warn!(error = %e, "flag stream dropped, reconnecting");
            }
        }

        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_BACKOFF);

        // Self-heal: refresh the whole cache before resuming, since any
        // events emitted while disconnected are gone.
        match fetch_init(&inner).await {
            Ok(init) => {
                inner.apply_init(init);
                backoff = INITIAL_BACKOFF;
            }
            Err(e) => {
                tracing::warn!(error = %e, "re-sync fetch failed, will retry");
            }
        }
    }
}

/// Connect the WebSocket and apply frames until the stream ends.
async fn pump(inner: &ClientInner) -> Result<(), StreamError> {
    let mut url = inner.base_url.join("/api/v1/sdk/stream")?;
    let scheme = match url.scheme() {
        "http" => "ws".to_string(),
        "https" => "wss".to_string(),
        "ws" | "wss" => url.scheme().to_string(),
        _ => return Err(StreamError::Scheme),
    };
    url.set_scheme(&scheme).map_err(|_| StreamError::Scheme)?;

    let mut request = url.as_str().into_client_request()?;
    request.headers_mut().insert(
        SDK_KEY_HEADER,
        HeaderValue::from_str(&inner.sdk_key).map_err(|_| StreamError::Header)?,
    );

    let (mut socket, _) = connect_async(request).await?;
    tracing::debug!("flag stream connected");

    while let Some(message) = socket.next().await {
        match message? {
            Message::Text(text) => match serde_json::from_str::<StreamFrame>(&text) {
                Ok(StreamFrame::Connected { message }) => {
                    tracing::debug!(%message, "flag stream acknowledged");
                }
                Ok(frame) => {
                    tracing::debug!(kind = frame.kind(), "applying change event");
                    inner.cache.apply(&frame);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring unparseable stream frame");
                }
            },
            Message::Close(_) => return Ok(()),
            // Pings are answered by tungstenite internally.
            _ => {}
        }
    }
    Ok(())
}
