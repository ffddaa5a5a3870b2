#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

//! Server-side core of the Switchyard feature-flag platform.
//!
//! - [`flag`] — the flag/variation entities and write-time validation.
//! - [`store`] — the flag store interface and its in-memory backend.
//! - [`registry`] — client-key → delivery-channel subscription registry.
//! - [`broadcast`] — best-effort fan-out of change events to subscribers.
//! - [`events`] — channel aliases and buffer sizing for delivery channels.

pub mod broadcast;
pub mod events;
pub mod flag;
pub mod registry;
pub mod store;
