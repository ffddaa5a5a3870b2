//! TOML file configuration structures.
//!
//! These structs directly map to the `switchyard-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use switchyard_core::store::RetentionPolicy;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub tenants: Vec<TenantConfig>,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default address")
}

/// Admin configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// The admin secret. If this is plaintext (doesn't start with `$argon2`),
    /// it will be hashed and the config file will be rewritten.
    pub secret: String,
}

/// Retention configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// What deleting a flag does with the record.
    #[serde(default)]
    pub policy: RetentionPolicy,
}

/// One tenant (a project/environment with its own flag set).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Human-readable tenant name, used in admin route paths.
    pub name: String,
    /// The raw SDK key handed to this tenant's evaluation clients.
    pub sdk_key: String,
}

impl FileConfig {
    /// Check if the admin secret is already hashed (argon2 format).
    pub fn is_admin_secret_hashed(&self) -> bool {
        self.admin.secret.starts_with("$argon2")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[admin]
secret = "test-secret"

[retention]
policy = "immediate"

[[tenants]]
name = "web"
sdk_key = "sdk-key-web"

[[tenants]]
name = "mobile"
sdk_key = "sdk-key-mobile"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.retention.policy, RetentionPolicy::Immediate);
        assert_eq!(config.tenants.len(), 2);
        assert_eq!(config.tenants[0].name, "web");
        assert!(!config.is_admin_secret_hashed());
    }

    #[test]
    fn test_retention_defaults_to_tombstoned() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[admin]
secret = "test-secret"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.retention.policy, RetentionPolicy::Tombstoned);
        assert!(config.tenants.is_empty());
    }

    #[test]
    fn test_hashed_secret_detection() {
        let config = FileConfig {
            server: ServerConfig {
                listen: default_listen_addr(),
            },
            admin: AdminConfig {
                secret: "$argon2id$v=19$m=19456,t=2,p=1$abc123".to_string(),
            },
            retention: RetentionConfig::default(),
            tenants: vec![],
        };
        assert!(config.is_admin_secret_hashed());
    }
}
