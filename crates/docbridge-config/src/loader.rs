//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, `.env` files and environment variables.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use docbridge_core::Stage;

use crate::{BridgeConfig, ConfigError};

/// Default prefix for environment overrides.
pub const ENV_PREFIX: &str = "DOCBRIDGE";

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file or string (TOML or JSON)
/// 3. Environment variables (`PREFIX__SECTION__KEY`), including any loaded
///    from a `.env` file
///
/// # Example
///
/// ```no_run
/// use docbridge_config::ConfigLoader;
///
/// # fn main() -> Result<(), docbridge_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("docbridge.toml")?
///     .with_dotenv()?
///     .with_env_prefix("DOCBRIDGE")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: BridgeConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    ///
    /// This is called automatically by `new()`, but can be chained for clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = BridgeConfig::default();
        self
    }

    /// Start with development preset configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use docbridge_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = BridgeConfig::development();
        self
    }

    /// Start with production preset configuration.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = BridgeConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// Supports TOML (.toml) and JSON (.json) formats, chosen by extension.
    /// Sections missing from the file keep their default values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from an optional file.
    ///
    /// If the file exists, loads it. If not, silently continues.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is not `toml` or
    /// `json`.
    ///
    /// # Example
    ///
    /// ```
    /// use docbridge_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [runtime]
    ///     stage_var = "INGEST_STAGE"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.runtime.stage_var, "INGEST_STAGE");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Environment variables use the format `PREFIX__SECTION__KEY`.
    /// For example, with prefix "DOCBRIDGE":
    /// - `DOCBRIDGE__RUNTIME__STAGE=Prod`
    /// - `DOCBRIDGE__LOGGING__LEVEL=debug`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory or its parents.
    ///
    /// A missing file is not an error. Variables already set in the process
    /// environment are not overwritten.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DotenvError` if a `.env` file exists but cannot
    /// be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Load a specific `.env` file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DotenvError` if the file is missing or malformed.
    pub fn with_dotenv_path<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        dotenvy::from_path(path.as_ref())?;
        Ok(self)
    }

    /// Finalize and return the loaded configuration.
    ///
    /// Applies environment variable overrides (if a prefix was set) and
    /// validates the final configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Environment variable parsing fails
    /// - Configuration validation fails
    pub fn load(mut self) -> Result<BridgeConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Finalize without validation.
    #[must_use]
    pub fn load_unvalidated(self) -> BridgeConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<BridgeConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        // Sorted so that override order does not depend on the platform.
        let env_vars: BTreeMap<String, String> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();

        for (key, value) in env_vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let boolean = || {
            parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
        };

        match parts.as_slice() {
            // Runtime section
            ["RUNTIME", "SERVICE_NAME"] => {
                self.config.runtime.service_name = value.to_string();
            }
            ["RUNTIME", "STAGE_VAR"] => {
                self.config.runtime.stage_var = value.to_string();
            }
            ["RUNTIME", "STAGE"] => {
                self.config.runtime.stage = if value.is_empty() {
                    None
                } else {
                    Some(value.parse::<Stage>().map_err(|_| {
                        ConfigError::env_parse_error(key, "expected 'Test' or 'Prod'")
                    })?)
                };
            }
            ["RUNTIME", "DEFAULT_REGION"] => {
                self.config.runtime.default_region = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }

            // Logging section
            ["LOGGING", "ENABLED"] => self.config.logging.enabled = boolean()?,
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "JSON_FORMAT"] => self.config.logging.json_format = boolean()?,
            ["LOGGING", "SPAN_EVENTS"] => self.config.logging.span_events = boolean()?,
            ["LOGGING", "FILE_LINE_INFO"] => self.config.logging.file_line_info = boolean()?,
            ["LOGGING", "THREAD_IDS"] => self.config.logging.thread_ids = boolean()?,
            ["LOGGING", "INCLUDE_TARGET"] => self.config.logging.include_target = boolean()?,

            // Metrics section
            ["METRICS", "ENABLED"] => self.config.metrics.enabled = boolean()?,
            ["METRICS", "DURATION_BUCKETS"] => {
                self.config.metrics.duration_buckets = value
                    .split(',')
                    .map(|bucket| bucket.trim().parse::<f64>())
                    .collect::<Result<_, _>>()
                    .map_err(|_| {
                        ConfigError::env_parse_error(key, "expected comma-separated numbers")
                    })?;
            }

            // Unknown key - ignore
            _ => {}
        }

        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
