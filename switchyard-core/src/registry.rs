//! Subscription registry: client key → live delivery channel.
//!
//! The registry is the lifecycle owner of all delivery channels. It is the
//! only shared mutable state on the fan-out path, so it is expressed as a
//! trait: the in-memory implementation below serves a single node, and a
//! broker-backed one can replace it without touching the broadcaster or
//! the SDK contracts.

use dashmap::DashMap;
use switchyard_sdk::keys::ClientKey;
use switchyard_sdk::objects::stream::StreamFrame;
use tokio::sync::mpsc::WeakSender;

use crate::events::{delivery_channel, FrameReceiver, FrameSender};

/// One delivery channel as handed to a transport task.
///
/// `frames` is the single-reader stream of frames to forward to the
/// client; it ends when the registry closes the channel (replacement by a
/// reconnect). `handle` identifies this channel for the stale-guarded
/// [`ChannelRegistry::unsubscribe`] on teardown — it is weak so the
/// transport task itself never keeps a replaced channel alive.
#[derive(Debug)]
pub struct Subscription {
    pub handle: WeakSender<StreamFrame>,
    pub frames: FrameReceiver,
}

impl Subscription {
    /// Remove this channel's mapping from `registry` if it is still the
    /// registered one.
    pub fn unsubscribe(&self, registry: &dyn ChannelRegistry, key: &ClientKey) {
        if let Some(sender) = self.handle.upgrade() {
            registry.unsubscribe(key, &sender);
        }
    }
}

/// Key-to-channel registry for delivery channels.
///
/// Implementations must allow subscribe/unsubscribe/lookup for *different*
/// keys to proceed independently; operations on the same key serialize.
/// `lookup` never blocks on I/O.
pub trait ChannelRegistry: Send + Sync {
    /// Open a new delivery channel for `key`.
    ///
    /// The connection acknowledgement is already queued as the first frame
    /// of the returned subscription. Any previous channel registered under
    /// the same key is atomically replaced and closed — a client holds at
    /// most one live channel.
    fn subscribe(&self, key: ClientKey) -> Subscription;

    /// Remove the mapping for `key`, but only if it still refers to the
    /// channel identified by `handle`. A stale handle (the channel was
    /// already replaced by a reconnect) is a no-op.
    fn unsubscribe(&self, key: &ClientKey, handle: &FrameSender);

    /// The currently registered sender for `key`, if any.
    fn lookup(&self, key: &ClientKey) -> Option<FrameSender>;
}

/// Single-node registry backed by a sharded concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    channels: DashMap<ClientKey, FrameSender>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently registered channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl ChannelRegistry for InMemoryRegistry {
    fn subscribe(&self, key: ClientKey) -> Subscription {
        let (tx, rx) = delivery_channel();
        // The channel is empty, so queueing the ack cannot fail.
        let _ = tx.try_send(StreamFrame::connected());
        let handle = tx.downgrade();

        if let Some(previous) = self.channels.insert(key.clone(), tx) {
            drop(previous);
            tracing::debug!(client_key = %key, "replaced existing delivery channel");
        } else {
            tracing::debug!(client_key = %key, "registered delivery channel");
        }
        Subscription { handle, frames: rx }
    }

    fn unsubscribe(&self, key: &ClientKey, handle: &FrameSender) {
        let removed = self
            .channels
            .remove_if(key, |_, stored| stored.same_channel(handle));
        if removed.is_some() {
            tracing::debug!(client_key = %key, "removed delivery channel");
        }
    }

    fn lookup(&self, key: &ClientKey) -> Option<FrameSender> {
        self.channels.get(key).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_sdk::keys::derive_client_key;

    #[tokio::test]
    async fn subscribe_queues_the_ack_first() {
        let registry = InMemoryRegistry::new();
        let mut sub = registry.subscribe(derive_client_key("tenant"));
        assert_eq!(sub.frames.recv().await, Some(StreamFrame::connected()));
    }

    #[tokio::test]
    async fn resubscribe_replaces_and_closes_the_previous_channel() {
        let registry = InMemoryRegistry::new();
        let key = derive_client_key("tenant");

        let mut first = registry.subscribe(key.clone());
        assert_eq!(first.frames.recv().await, Some(StreamFrame::connected()));

        let mut second = registry.subscribe(key.clone());

        // Exactly one live channel remains, and the first receiver
        // terminates once its queued frames are drained.
        assert_eq!(registry.len(), 1);
        assert_eq!(first.frames.recv().await, None);
        assert_eq!(second.frames.recv().await, Some(StreamFrame::connected()));
    }

    #[tokio::test]
    async fn stale_unsubscribe_leaves_the_replacement_alone() {
        let registry = InMemoryRegistry::new();
        let key = derive_client_key("tenant");

        // Reconnect replaces the channel; the old transport task then
        // tears down with its stale subscription.
        let first = registry.subscribe(key.clone());
        let _second = registry.subscribe(key.clone());
        first.unsubscribe(&registry, &key);

        assert!(registry.lookup(&key).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn matching_unsubscribe_removes_the_mapping() {
        let registry = InMemoryRegistry::new();
        let key = derive_client_key("tenant");

        let sub = registry.subscribe(key.clone());
        sub.unsubscribe(&registry, &key);

        assert!(registry.lookup(&key).is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn distinct_keys_are_independent() {
        let registry = InMemoryRegistry::new();
        let key_a = derive_client_key("tenant-a");
        let key_b = derive_client_key("tenant-b");

        let sub_a = registry.subscribe(key_a.clone());
        let _sub_b = registry.subscribe(key_b.clone());
        assert_eq!(registry.len(), 2);

        sub_a.unsubscribe(&registry, &key_a);
        assert!(registry.lookup(&key_a).is_none());
        assert!(registry.lookup(&key_b).is_some());
    }
}
