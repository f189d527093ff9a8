// ABOUTME: Configuration management for Client Book
// ABOUTME: Database location, schema variant and output preferences in an extensible JSON file

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::db::ClientStore;
use crate::models::SchemaVariant;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Config directory not found")]
    NoDirFound,
}

/// How command results are printed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where the database lives and which table layout it uses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSettings {
    /// File path, or `:memory:`
    #[serde(default = "default_database_path")]
    pub path: String,
    #[serde(default)]
    pub variant: SchemaVariant,
}

fn default_database_path() -> String {
    ClientStore::default_path()
        .unwrap_or_else(|_| PathBuf::from("clients.db"))
        .to_string_lossy()
        .into_owned()
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            variant: SchemaVariant::Normalized,
        }
    }
}

/// Application preferences
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Preferences {
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub preferences: Preferences,
}

fn default_version() -> u32 {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            database: DatabaseSettings::default(),
            preferences: Preferences::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path based on OS
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoDirFound)?;
        Ok(config_dir.join("client-book").join("config.json"))
    }

    /// Load config from the default location, creating it with defaults if missing
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;

        if !path.exists() {
            let config = Self::default();
            config.save_to(&path)?;
            log::info!("created default config at {}", path.display());
            return Ok(config);
        }

        Self::read(&path)
    }

    /// Load config from an explicit file; a missing file yields defaults and is not written
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::warn!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::read(path)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&contents)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Replace file values with the ones given on the command line
    pub fn apply_overrides(
        &mut self,
        database: Option<String>,
        variant: Option<SchemaVariant>,
        format: Option<OutputFormat>,
    ) {
        if let Some(database) = database {
            self.database.path = database;
        }
        if let Some(variant) = variant {
            self.database.variant = variant;
        }
        if let Some(format) = format {
            self.preferences.output_format = format;
        }
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
