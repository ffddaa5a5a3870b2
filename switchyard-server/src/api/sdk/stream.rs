use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use switchyard_sdk::keys::ClientKey;

use crate::api::extractors::SdkTenant;
use crate::state::AppState;

/// `GET /stream` — WebSocket flag change stream.
///
/// Upgrades the HTTP connection and forwards [`StreamFrame`] JSON text
/// frames for the authenticated tenant. The first frame is always the
/// CONNECTED acknowledgement. A reconnect under the same SDK key replaces
/// this channel and ends the stream.
///
/// [`StreamFrame`]: switchyard_sdk::objects::stream::StreamFrame
pub async fn stream(
    State(state): State<AppState>,
    SdkTenant(tenant): SdkTenant,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_stream(socket, state, tenant.client_key))
}

/// Background task that drives a single subscription.
///
/// Forwards frames from the delivery channel until the registry closes it
/// (replaced by a reconnect) or the client disconnects. On client-side
/// teardown the mapping is removed, stale-guarded so a racing reconnect's
/// fresh channel is left alone.
async fn handle_stream(mut socket: WebSocket, state: AppState, client_key: ClientKey) {
    let mut sub = state.registry.subscribe(client_key.clone());
    tracing::debug!(client_key = %client_key, "stream subscribed");

    loop {
        tokio::select! {
            frame = sub.frames.recv() => {
                match frame {
                    Some(frame) => {
                        let json = match serde_json::to_string(&frame) {
                            Ok(json) => json,
                            Err(e) => {
                                tracing::error!(error = %e, "stream: frame serialization failed");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            // Client went away mid-send.
                            break;
                        }
                    }
                    None => {
                        // Channel closed: a reconnect replaced this
                        // subscription. No unsubscribe — the mapping now
                        // belongs to the replacement.
                        tracing::debug!(client_key = %client_key, "stream replaced by reconnect");
                        let _ = socket.send(Message::Close(None)).await;
                        return;
                    }
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Ok(_)) => {
                        // Clients have nothing to say on this stream.
                    }
                    Some(Err(_)) => {
                        break;
                    }
                }
            }
        }
    }

    sub.unsubscribe(state.registry.as_ref(), &client_key);
    tracing::debug!(client_key = %client_key, "stream disconnected");
    let _ = socket.send(Message::Close(None)).await;
}
