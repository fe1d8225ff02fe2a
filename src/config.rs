//! Configuration management for RAX Storage
//!
//! Storage settings come from an optional TOML file with `RAX_STORAGE_*`
//! environment overrides on top.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::registry::FILESYSTEM_BACKEND;

/// Default config file looked up in the working directory (`storage.toml`)
pub const DEFAULT_CONFIG_NAME: &str = "storage";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "RAX_STORAGE";

fn default_backend() -> String {
    FILESYSTEM_BACKEND.to_string()
}

/// Storage configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Root directory; empty means the current working directory.
    /// Environment: RAX_STORAGE_LOCATION
    #[serde(default)]
    pub location: String,

    /// Prefix for public URIs of stored content.
    /// Environment: RAX_STORAGE_BASE_URI
    #[serde(default)]
    pub base_uri: Option<String>,

    /// Dotted identifier of the backend to use.
    /// Environment: RAX_STORAGE_BACKEND
    #[serde(default = "default_backend")]
    pub backend: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            location: String::new(),
            base_uri: None,
            backend: default_backend(),
        }
    }
}

impl StorageConfig {
    /// Load `storage.toml` from the working directory if present, with
    /// environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::build(File::with_name(DEFAULT_CONFIG_NAME).required(false))
    }

    /// Load from an explicit config file, which must exist
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: StorageConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.backend.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "backend cannot be empty".into(),
            ));
        }

        if matches!(self.base_uri.as_deref(), Some(uri) if uri.is_empty()) {
            return Err(config::ConfigError::Message(
                "base_uri cannot be empty when set".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_use_cwd_and_filesystem_backend() {
        let config = StorageConfig::default();
        assert_eq!(config.location, "");
        assert_eq!(config.base_uri, None);
        assert_eq!(config.backend, FILESYSTEM_BACKEND);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_values_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.toml");
        fs::write(
            &path,
            "location = \"/srv/media\"\nbase_uri = \"/media/\"\n",
        )
        .unwrap();

        let config = StorageConfig::load_from(&path).unwrap();
        assert_eq!(config.location, "/srv/media");
        assert_eq!(config.base_uri.as_deref(), Some("/media/"));
        assert_eq!(config.backend, FILESYSTEM_BACKEND);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StorageConfig::load_from(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn empty_base_uri_is_rejected() {
        let config = StorageConfig {
            base_uri: Some(String::new()),
            ..StorageConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_backend_is_rejected() {
        let config = StorageConfig {
            backend: " ".into(),
            ..StorageConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
