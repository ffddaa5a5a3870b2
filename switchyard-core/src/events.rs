//! Delivery-channel plumbing.
//!
//! A delivery channel is a bounded tokio mpsc pair carrying
//! [`StreamFrame`]s from the broadcaster to exactly one connected client.
//! The sender half lives in the subscription registry; the receiver half is
//! owned by the transport task that writes frames to the wire.

use switchyard_sdk::objects::stream::StreamFrame;
use tokio::sync::mpsc;

/// Buffer size for delivery channels.
///
/// Deep enough to absorb a burst of admin edits while a client's socket is
/// momentarily slow; delivery is best-effort, so an overflowing channel
/// drops frames rather than blocking the publisher.
pub const DELIVERY_CHANNEL_BUFFER: usize = 256;

/// Sender half of a delivery channel.
pub type FrameSender = mpsc::Sender<StreamFrame>;
/// Receiver half of a delivery channel.
pub type FrameReceiver = mpsc::Receiver<StreamFrame>;

/// Create a new delivery channel pair.
pub fn delivery_channel() -> (FrameSender, FrameReceiver) {
    mpsc::channel(DELIVERY_CHANNEL_BUFFER)
}
