//! Shared types and client library for the Switchyard feature-flag platform.
//!
//! This crate carries everything both sides of the wire must agree on:
//!
//! - [`objects`] — the JSON shapes exchanged between server, admin tooling
//!   and SDK clients.
//! - [`bucketing`] — the deterministic variation-assignment algorithm. The
//!   hash and reduction formula are part of the wire contract: the server
//!   and every SDK must produce bit-identical assignments.
//! - [`keys`] — one-way derivation of the per-tenant client key from a raw
//!   SDK key.
//!
//! The [`client`] module (cargo feature `client`) adds the evaluation
//! client: one full fetch at startup, a WebSocket subscription for live
//! changes, and purely local flag evaluation afterwards.

pub mod bucketing;
pub mod keys;
pub mod objects;

#[cfg(feature = "client")]
pub mod client;
