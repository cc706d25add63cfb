//! Main configuration types.
//!
//! This module provides the top-level [`BridgeConfig`] struct and its builder.

use docbridge_telemetry::{LogConfig, MetricsConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, RuntimeConfig};

/// Complete Docbridge configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use docbridge_config::BridgeConfig;
///
/// let config = BridgeConfig::default();
/// assert_eq!(config.runtime.stage_var, "DOCBRIDGE_STAGE");
/// assert!(config.logging.json_format);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Runtime configuration.
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LogConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl BridgeConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The stage variable name is empty
    /// - The service name is empty
    /// - The log filter does not parse
    /// - The duration buckets are not positive and increasing
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.service_name.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "runtime.service_name",
                "must not be empty",
            ));
        }

        if self.runtime.stage.is_none() && self.runtime.stage_var.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "runtime.stage_var",
                "must not be empty unless runtime.stage is set",
            ));
        }

        if let Some(region) = &self.runtime.default_region {
            if region.trim().is_empty() {
                return Err(ConfigError::invalid_value(
                    "runtime.default_region",
                    "must not be empty when set",
                ));
            }
        }

        self.logging.validate()?;
        self.metrics.validate()?;
        Ok(())
    }

    /// Returns the telemetry settings, with the runtime service name applied.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig::new(
            self.runtime.service_name.as_str(),
            self.logging.clone(),
            self.metrics.clone(),
        )
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logging and the `Test` stage pinned, so no environment
    /// variable is needed.
    ///
    /// # Example
    ///
    /// ```
    /// use docbridge_config::BridgeConfig;
    /// use docbridge_core::Stage;
    ///
    /// let config = BridgeConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert_eq!(config.runtime.stage, Some(Stage::Test));
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging = LogConfig::development();
        config.runtime.stage = Some(docbridge_core::Stage::Test);
        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON logging at info level; the stage is read from the environment.
    ///
    /// # Example
    ///
    /// ```
    /// use docbridge_config::BridgeConfig;
    ///
    /// let config = BridgeConfig::production();
    /// assert!(config.logging.json_format);
    /// assert!(config.runtime.stage.is_none());
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging = LogConfig::production();
        config
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Debug, Default)]
pub struct BridgeConfigBuilder {
    runtime: Option<RuntimeConfig>,
    logging: Option<LogConfig>,
    metrics: Option<MetricsConfig>,
}

impl BridgeConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the runtime configuration.
    #[must_use]
    pub fn runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LogConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Set the metrics configuration.
    #[must_use]
    pub fn metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> BridgeConfig {
        BridgeConfig {
            runtime: self.runtime.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<BridgeConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
