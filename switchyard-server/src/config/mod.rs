//! Configuration module for switchyard-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables. Also handles admin secret hashing.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::{AdminConfig, ServerConfig, SharedConfig, TenantConfig};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use switchyard_core::store::RetentionPolicy;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("password hashing error: {0}")]
    HashError(String),
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub retention: RetentionPolicy,
    pub tenants: Vec<TenantConfig>,
}

impl LoadedConfig {
    /// Convert into a SharedConfig with Arc<RwLock<T>> wrappers.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig {
            server: Arc::new(RwLock::new(self.server)),
            admin: Arc::new(RwLock::new(self.admin)),
            tenants: Arc::new(RwLock::new(self.tenants)),
        }
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Hash the admin secret if it's plaintext (and rewrite the file)
    /// 5. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        // Read the config file
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        // Apply CLI overrides
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        // Validate the configuration
        validate(&file_config)?;

        // Hash admin secret if needed and rewrite config
        let secret_hash = if file_config.is_admin_secret_hashed() {
            file_config.admin.secret.clone()
        } else {
            let hash = self.hash_secret(&file_config.admin.secret)?;
            file_config.admin.secret = hash.clone();
            self.rewrite_config(&file_config)?;
            tracing::info!("Admin secret hashed and config file updated");
            hash
        };

        // Build the config parts
        Ok(build_loaded_config(file_config, secret_hash))
    }

    /// Reload the configuration (used during SIGHUP).
    ///
    /// Returns a LoadedConfig that can be used to update individual parts
    /// of a SharedConfig. The retention policy is intentionally *not*
    /// applied on reload: the store is constructed once at startup.
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn hash_secret(&self, plaintext: &str) -> Result<String, ConfigError> {
        use argon2::{
            Argon2, PasswordHasher,
            password_hash::{SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ConfigError::HashError(e.to_string()))
    }

    fn rewrite_config(&self, config: &FileConfig) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(config)?;

        // Write atomically: write to temp file, then rename
        let temp_path = self.config_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, toml_string)?;
        std::fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.admin.secret.is_empty() {
        return Err(ConfigError::ValidationError(
            "admin secret must not be empty".to_string(),
        ));
    }

    let mut names = HashSet::new();
    let mut keys = HashSet::new();
    for tenant in &config.tenants {
        if tenant.name.is_empty() {
            return Err(ConfigError::ValidationError(
                "tenant name must not be empty".to_string(),
            ));
        }
        if tenant.sdk_key.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "tenant {} has an empty sdk_key",
                tenant.name
            )));
        }
        if !names.insert(tenant.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate tenant name: {}",
                tenant.name
            )));
        }
        if !keys.insert(tenant.sdk_key.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "tenant {} reuses another tenant's sdk_key",
                tenant.name
            )));
        }
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig, secret_hash: String) -> LoadedConfig {
    let tenants = file_config
        .tenants
        .into_iter()
        .map(|t| TenantConfig::new(t.name, &t.sdk_key))
        .collect();

    LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
        },
        admin: AdminConfig::new(secret_hash),
        retention: file_config.retention.policy,
        tenants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::{
        AdminConfig as FileAdminConfig, RetentionConfig, ServerConfig as FileServerConfig,
        TenantConfig as FileTenantConfig,
    };

    fn base_config() -> FileConfig {
        FileConfig {
            server: FileServerConfig {
                listen: "127.0.0.1:3000".parse().unwrap(),
            },
            admin: FileAdminConfig {
                secret: "hunter2".to_string(),
            },
            retention: RetentionConfig::default(),
            tenants: vec![
                FileTenantConfig {
                    name: "web".to_string(),
                    sdk_key: "sdk-key-web".to_string(),
                },
                FileTenantConfig {
                    name: "mobile".to_string(),
                    sdk_key: "sdk-key-mobile".to_string(),
                },
            ],
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn duplicate_tenant_names_are_rejected() {
        let mut config = base_config();
        config.tenants[1].name = "web".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn shared_sdk_keys_are_rejected() {
        let mut config = base_config();
        config.tenants[1].sdk_key = "sdk-key-web".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn tenants_resolve_by_name_and_derived_key() {
        let loaded = build_loaded_config(base_config(), "$argon2-fake".to_string());
        assert_eq!(loaded.tenants.len(), 2);

        let web = &loaded.tenants[0];
        assert_eq!(web.name, "web");
        assert_eq!(
            web.client_key,
            switchyard_sdk::keys::derive_client_key("sdk-key-web")
        );
    }
}
