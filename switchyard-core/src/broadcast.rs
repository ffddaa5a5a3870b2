//! Best-effort fan-out of change events.
//!
//! The broadcaster is the single writer for every delivery channel, so
//! frames arrive in publish order per channel. Delivery is at-most-once:
//! a missing target, a full buffer or a closed channel is logged and
//! dropped — never surfaced to the mutation that triggered the event.

use std::sync::Arc;

use switchyard_sdk::objects::stream::StreamFrame;
use tokio::sync::mpsc::error::TrySendError;

use crate::registry::ChannelRegistry;

/// Publishes change events to the channel owned by their target client key.
#[derive(Clone)]
pub struct EventBroadcaster {
    registry: Arc<dyn ChannelRegistry>,
}

impl EventBroadcaster {
    pub fn new(registry: Arc<dyn ChannelRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `event` to its target client, if one is connected.
    ///
    /// Infallible by design: the publish step is a side effect of the flag
    /// mutation, never a precondition for its success.
    pub fn publish(&self, event: StreamFrame) {
        let Some(key) = event.client_key().cloned() else {
            tracing::debug!(kind = event.kind(), "event without target key, dropping");
            return;
        };

        let Some(sender) = self.registry.lookup(&key) else {
            tracing::debug!(client_key = %key, kind = event.kind(), "no subscriber, dropping event");
            return;
        };

        let kind = event.kind();
        match sender.try_send(event) {
            Ok(()) => {
                tracing::debug!(client_key = %key, kind, "event delivered");
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(client_key = %key, kind, "delivery channel full, dropping event");
            }
            Err(TrySendError::Closed(_)) => {
                // The transport already died; prune the dead mapping so the
                // registry does not accumulate closed channels.
                tracing::debug!(client_key = %key, kind, "delivery channel closed, pruning");
                self.registry.unsubscribe(&key, &sender);
            }
        }
    }
}
