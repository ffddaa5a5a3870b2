//! HTTP API surface: admin flag management and SDK endpoints.

pub mod admin;
pub mod extractors;
pub mod sdk;
