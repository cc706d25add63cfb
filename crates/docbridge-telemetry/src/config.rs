//! Combined logging and metrics settings.

use crate::logging::LogConfig;
use crate::metrics::MetricsConfig;
use crate::TelemetryResult;

/// Logging and metrics settings that share one service name.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryConfig {
    /// Service name stamped on log lines and metrics.
    pub service_name: String,
    /// Metrics settings.
    pub metrics: MetricsConfig,
    /// Logging settings.
    pub logging: LogConfig,
}

impl TelemetryConfig {
    /// Combines subsystem settings under one service name.
    ///
    /// The name overrides whatever `logging` and `metrics` carried.
    #[must_use]
    pub fn new(
        service_name: impl Into<String>,
        mut logging: LogConfig,
        mut metrics: MetricsConfig,
    ) -> Self {
        let service_name = service_name.into();
        logging.service_name.clone_from(&service_name);
        metrics.service_name.clone_from(&service_name);
        Self {
            service_name,
            metrics,
            logging,
        }
    }

    /// Validates both subsystems.
    pub fn validate(&self) -> TelemetryResult<()> {
        self.logging.validate()?;
        self.metrics.validate()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::new("docbridge", LogConfig::default(), MetricsConfig::default())
    }
}
