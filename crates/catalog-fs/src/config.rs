//! Catalog configuration.

use serde::{Deserialize, Serialize};

/// Catalog configuration stored in `.catalog/config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Catalog settings.
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Ordering behavior.
    #[serde(default)]
    pub ordering: OrderingSettings,

    /// HTTP server defaults.
    #[serde(default)]
    pub server: ServerSettings,
}

const fn default_version() -> u32 {
    1
}

/// Catalog-level settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Catalog name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Ordering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderingSettings {
    /// Hold a per-category lock from read to commit.
    #[serde(default = "default_serialize_group_writes")]
    pub serialize_group_writes: bool,
}

const fn default_serialize_group_writes() -> bool {
    true
}

impl Default for OrderingSettings {
    fn default() -> Self {
        Self {
            serialize_group_writes: default_serialize_group_writes(),
        }
    }
}

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    17374
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            version: 1,
            catalog: CatalogSettings::default(),
            ordering: OrderingSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

impl CatalogConfig {
    /// Create a new config with the given catalog name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            catalog: CatalogSettings {
                name: Some(name.into()),
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: CatalogConfig = serde_yaml::from_str("version: 1\nserver:\n  port: 9000\n").unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.ordering.serialize_group_writes);
        assert!(config.catalog.name.is_none());
    }

    #[test]
    fn test_disable_serialization() {
        let config: CatalogConfig =
            serde_yaml::from_str("ordering:\n  serialize_group_writes: false\n").unwrap();

        assert!(!config.ordering.serialize_group_writes);
        assert_eq!(config.version, 1);
    }
}
