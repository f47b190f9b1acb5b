//! Configuration management for Tome Archive

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Default location of the book table
pub const DEFAULT_CATALOGUE_PATH: &str = "catalogue.txt";
/// Default location of the member table
pub const DEFAULT_REGISTRY_PATH: &str = "registry.txt";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub catalogue_path: String,
    pub registry_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
    /// Log to this file instead of stderr
    pub file: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // TOME_ARCHIVE_STORAGE__CATALOGUE_PATH, TOME_ARCHIVE_LOGGING__LEVEL, ...
            .add_source(
                Environment::with_prefix("TOME_ARCHIVE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("storage.catalogue_path", env::var("CATALOGUE_FILE").ok())?
            .set_override_option("storage.registry_path", env::var("REGISTRY_FILE").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalogue_path: DEFAULT_CATALOGUE_PATH.to_string(),
            registry_path: DEFAULT_REGISTRY_PATH.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}
