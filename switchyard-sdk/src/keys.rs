//! Client-key derivation.
//!
//! A client key is the opaque token under which a tenant's delivery channel
//! is registered and its change events are routed. It is derived from the
//! raw SDK key with a one-way hash so the credential itself never appears
//! as a routing key:
//!
//! ```text
//! client_key = lowercase_hex(SHA-256(sdk_key))
//! ```
//!
//! The derivation is deterministic — the same SDK key yields the same
//! client key on every call, on every host.

use std::fmt::Write;

use compact_str::CompactString;
use ring::digest;
use serde::{Deserialize, Serialize};

/// Opaque per-tenant routing key (64 lowercase hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientKey(CompactString);

impl ClientKey {
    /// Wrap an already-derived key (e.g. one received from the server).
    pub fn from_derived(key: impl Into<CompactString>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the client key for a raw SDK key.
pub fn derive_client_key(sdk_key: &str) -> ClientKey {
    let digest = digest::digest(&digest::SHA256, sdk_key.as_bytes());
    let hex = digest.as_ref().iter().fold(
        String::with_capacity(digest.as_ref().len() * 2),
        |mut acc, byte| {
            let _ = write!(acc, "{byte:02x}");
            acc
        },
    );
    ClientKey(hex.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_stable() {
        let sdk_key = "0801d3c5e29b4fc3bbfe9023716891b8";
        let first = derive_client_key(sdk_key);
        let second = derive_client_key(sdk_key);
        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 64);
        assert!(first.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_credentials_get_different_keys() {
        assert_ne!(derive_client_key("key-a"), derive_client_key("key-b"));
    }

    #[test]
    fn raw_credential_does_not_leak_into_the_key() {
        let sdk_key = "super-secret-sdk-key";
        let key = derive_client_key(sdk_key);
        assert!(!key.as_str().contains(sdk_key));
    }
}
