//! Configuration management for the serializer
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (avro-serde.toml)
//! - Environment variables (AVRO_SERDE__*)
//!
//! ## Example config file (avro-serde.toml):
//! ```toml
//! [serializer]
//! register_missing_schemas = true
//! register_missing_subjects = false
//!
//! [registry]
//! kind = "directory"
//! path = "./schema-registry"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::registry::{DirectoryRegistry, InMemoryRegistry, SchemaRegistry};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerdeConfig {
    /// Serializer settings
    #[serde(default)]
    pub serializer: SerializerConfig,

    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,
}

/// How the serializer treats schemas the registry does not know yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializerConfig {
    /// Register schemas missing under a known subject
    #[serde(default = "default_true")]
    pub register_missing_schemas: bool,

    /// Register schemas for subjects the registry has never seen
    #[serde(default = "default_true")]
    pub register_missing_subjects: bool,
}

/// Which registry implementation to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    #[default]
    Memory,
    Directory,
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub kind: RegistryKind,

    /// Root of a directory registry
    #[serde(default = "default_registry_path")]
    pub path: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("./schema-registry")
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            register_missing_schemas: true,
            register_missing_subjects: true,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            kind: RegistryKind::Memory,
            path: default_registry_path(),
        }
    }
}

impl SerdeConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a required file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "avro-serde.toml",
            ".avro-serde.toml",
            "config/avro-serde.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "avro-serde") {
            let xdg_config = config_dir.config_dir().join("avro-serde.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("AVRO_SERDE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Get the registry path (resolves relative paths)
    pub fn registry_path(&self) -> PathBuf {
        if self.registry.path.is_absolute() {
            self.registry.path.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.registry.path)
        }
    }

    /// Build the configured registry
    pub fn build_registry(&self) -> Result<Arc<dyn SchemaRegistry>> {
        Ok(match self.registry.kind {
            RegistryKind::Memory => Arc::new(InMemoryRegistry::new()),
            RegistryKind::Directory => Arc::new(DirectoryRegistry::open(self.registry_path())?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = SerdeConfig::default();
        assert!(config.serializer.register_missing_schemas);
        assert!(config.serializer.register_missing_subjects);
        assert_eq!(config.registry.kind, RegistryKind::Memory);
    }

    #[test]
    fn test_serialize_config() {
        let config = SerdeConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[serializer]"));
        assert!(toml_str.contains("[registry]"));
        assert!(toml_str.contains("kind = \"memory\""));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[serializer]\nregister_missing_subjects = false\n\n[registry]\nkind = \"directory\"\npath = \"/tmp/registry\"\n",
        )
        .unwrap();

        let config = SerdeConfig::load_from(path.to_str()).unwrap();
        assert!(config.serializer.register_missing_schemas);
        assert!(!config.serializer.register_missing_subjects);
        assert_eq!(config.registry.kind, RegistryKind::Directory);
        assert_eq!(config.registry_path(), PathBuf::from("/tmp/registry"));
    }

    #[test]
    fn test_build_directory_registry() {
        let dir = tempdir().unwrap();
        let config = SerdeConfig {
            registry: RegistryConfig {
                kind: RegistryKind::Directory,
                path: dir.path().to_path_buf(),
            },
            ..SerdeConfig::default()
        };

        let registry = config.build_registry().unwrap();
        let id = registry.register("users-value", &apache_avro::Schema::String).unwrap();
        assert!(dir.path().join("schemas").join(format!("{}.avsc", id)).is_file());
    }
}
