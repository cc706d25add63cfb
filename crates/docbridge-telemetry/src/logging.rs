//! Structured logging for Docbridge.
//!
//! Log output always goes to stderr so that stdout stays free for the
//! invocation response.
//!
//! # Example
//!
//! ```rust,ignore
//! use docbridge_telemetry::logging::{LogConfig, init_logging};
//!
//! let config = LogConfig::default();
//! init_logging(&config)?;
//!
//! tracing::info!(interface = "QueueMessageReader", request_id = "r1", "Invocation started");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g., "info", "docbridge=debug,warn").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Service name for log fields.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            service_name: "docbridge".to_string(),
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            ..Self::default()
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Checks that the filter directive parses.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` for a malformed directive.
    pub fn validate(&self) -> TelemetryResult<()> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| TelemetryError::InvalidConfig(format!("invalid log level '{}': {e}", self.level)))
    }
}

/// Initializes the logging subsystem.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter is invalid or a
/// global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_writer(std::io::stderr)
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::debug!(service = %config.service_name, level = %config.level, "logging initialized");
    Ok(())
}

/// Creates an env filter from a string.
///
/// # Errors
///
/// Returns error if the filter string is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}

/// Standard log fields for Docbridge.
///
/// Use these field names for consistency across logs.
pub mod fields {
    /// Envelope request ID field name.
    pub const REQUEST_ID: &str = "request_id";

    /// Per-invocation ID field name.
    pub const INVOCATION_ID: &str = "invocation_id";

    /// Interface name field name.
    pub const INTERFACE: &str = "interface";

    /// Function name field name.
    pub const FUNCTION: &str = "function";

    /// Response status field name (`SUCCESS` or `EXCEPTION`).
    pub const STATUS: &str = "status";

    /// Duration field name (in milliseconds).
    pub const DURATION_MS: &str = "duration_ms";

    /// Error field name.
    pub const ERROR: &str = "error";

    /// Error kind field name.
    pub const ERROR_TYPE: &str = "error_type";

    /// Tenant ID field name.
    pub const TENANT_ID: &str = "tenant_id";

    /// Stage field name.
    pub const STAGE: &str = "stage";
}

/// Logs an invocation start event.
#[macro_export]
macro_rules! log_invocation_start {
    ($request_id:expr, $interface:expr, $function:expr) => {
        tracing::info!(
            request_id = %$request_id,
            interface = %$interface,
            function = %$function,
            "Invocation started"
        );
    };
}

/// Logs an invocation completion event.
#[macro_export]
macro_rules! log_invocation_complete {
    ($request_id:expr, $status:expr, $duration_ms:expr) => {
        tracing::info!(
            request_id = %$request_id,
            status = %$status,
            duration_ms = $duration_ms,
            "Invocation completed"
        );
    };
}

/// Logs an invocation error event.
#[macro_export]
macro_rules! log_invocation_error {
    ($request_id:expr, $error_type:expr, $error:expr) => {
        tracing::error!(
            request_id = %$request_id,
            error_type = %$error_type,
            error = %$error,
            "Invocation failed"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(config.json_format);
        assert_eq!(config.level, "info");
        assert_eq!(config.service_name, "docbridge");
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert!(config.span_events);
        assert!(config.file_line_info);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_production_config() {
        let config = LogConfig::production();
        assert!(config.json_format);
        assert!(!config.span_events);
        assert!(!config.file_line_info);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_validate_level() {
        assert!(LogConfig::default().validate().is_ok());
        let config = LogConfig {
            level: "docbridge=loud".to_string(),
            ..LogConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TelemetryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LogConfig =
            serde_json::from_str(r#"{"level": "debug", "json_format": false}"#).unwrap();
        assert_eq!(config.level, "debug");
        assert!(!config.json_format);
        assert!(config.include_target);

        let unknown = serde_json::from_str::<LogConfig>(r#"{"colour": true}"#);
        assert!(unknown.is_err());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(fields::REQUEST_ID, "request_id");
        assert_eq!(fields::INTERFACE, "interface");
        assert_eq!(fields::DURATION_MS, "duration_ms");
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(init_logging(&config).is_ok());
    }
}
