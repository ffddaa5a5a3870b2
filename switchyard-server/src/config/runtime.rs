//! Runtime configuration shared across request handlers.
//!
//! Each section lives behind its own lock so a SIGHUP reload can swap
//! sections independently of in-flight requests.

use std::net::SocketAddr;
use std::sync::Arc;
use switchyard_sdk::keys::{ClientKey, derive_client_key};
use tokio::sync::RwLock;

/// Server section as used at runtime.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

/// Admin credentials. Holds only the argon2 hash; the plaintext secret
/// never outlives config loading.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    secret_hash: String,
}

impl AdminConfig {
    pub fn new(secret_hash: String) -> Self {
        Self { secret_hash }
    }

    /// Verify a presented plaintext secret against the stored hash.
    pub fn verify(&self, presented: &str) -> bool {
        use argon2::{Argon2, PasswordHash, PasswordVerifier};

        let Ok(parsed) = PasswordHash::new(&self.secret_hash) else {
            tracing::error!("stored admin secret hash is not a valid argon2 hash");
            return false;
        };
        Argon2::default()
            .verify_password(presented.as_bytes(), &parsed)
            .is_ok()
    }
}

/// One tenant as used at runtime.
///
/// The raw SDK key is dropped at load time; requests are matched by the
/// derived client key, so the server never holds tenant credentials.
#[derive(Debug, Clone)]
pub struct TenantConfig {
    pub name: String,
    pub client_key: ClientKey,
}

impl TenantConfig {
    pub fn new(name: String, sdk_key: &str) -> Self {
        let client_key = derive_client_key(sdk_key);
        Self { name, client_key }
    }
}

/// Runtime configuration with per-section locks (reloadable via SIGHUP).
#[derive(Clone)]
pub struct SharedConfig {
    pub server: Arc<RwLock<ServerConfig>>,
    pub admin: Arc<RwLock<AdminConfig>>,
    pub tenants: Arc<RwLock<Vec<TenantConfig>>>,
}

impl SharedConfig {
    /// Resolve a tenant by its admin-facing name.
    pub async fn tenant_by_name(&self, name: &str) -> Option<TenantConfig> {
        let tenants = self.tenants.read().await;
        tenants.iter().find(|t| t.name == name).cloned()
    }

    /// Resolve a tenant by the client key derived from a presented SDK key.
    pub async fn tenant_by_client_key(&self, key: &ClientKey) -> Option<TenantConfig> {
        let tenants = self.tenants.read().await;
        tenants.iter().find(|t| &t.client_key == key).cloned()
    }
}
