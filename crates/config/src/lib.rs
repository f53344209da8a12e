//! Configuration loading and validation for Smelter analytics.
//!
//! Loads configuration from `~/.smelter/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use smelter_core::ErrorCatalog;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.smelter/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmelterConfig {
    /// Usage analytics and error reporting
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Usage analytics and error reporting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Whether analytics are sent at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Stable anonymous client id. A random one is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Version reported alongside every event
    #[serde(default = "default_tool_version")]
    pub tool_version: String,

    /// TOML error catalog extending the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}
fn default_tool_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            client_id: None,
            tool_version: default_tool_version(),
            catalog_path: None,
        }
    }
}

impl AnalyticsConfig {
    /// Apply environment overrides, reading variables through `lookup`:
    /// - `SMELTER_ANALYTICS=0|false|off` disables analytics
    /// - `DO_NOT_TRACK=1` disables analytics
    /// - `SMELTER_CLIENT_ID` sets the client id
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("SMELTER_ANALYTICS") {
            let value = value.trim().to_ascii_lowercase();
            if matches!(value.as_str(), "0" | "false" | "off" | "no") {
                self.enabled = false;
            }
        }

        if lookup("DO_NOT_TRACK").is_some_and(|v| v.trim() == "1") {
            self.enabled = false;
        }

        if let Some(id) = lookup("SMELTER_CLIENT_ID") {
            self.client_id = Some(id);
        }
    }

    /// Load the built-in error catalog, extended by the configured file.
    ///
    /// The file can add categories and errors but never drop or shadow a
    /// built-in one, so every error the toolkit raises stays resolvable.
    pub fn load_catalog(&self) -> Result<ErrorCatalog, ConfigError> {
        let Some(path) = &self.catalog_path else {
            return Ok(ErrorCatalog::with_defaults());
        };

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let catalog = ErrorCatalog::with_defaults().extend_from_toml(&content)?;
        tracing::debug!(
            path = %path.display(),
            errors = catalog.len(),
            "Loaded error catalog"
        );
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "analytics.client_id must not be empty".into(),
            ));
        }

        if self.tool_version.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "analytics.tool_version must not be empty".into(),
            ));
        }

        Ok(())
    }
}

impl SmelterConfig {
    /// Load configuration from the default path (~/.smelter/config.toml),
    /// then apply environment overrides (highest priority).
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.analytics.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".smelter")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.analytics.validate()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid error catalog: {0}")]
    Catalog(#[from] smelter_core::Error),
}
