//! Structured logging and invocation metrics for Docbridge.
//!
//! - **Logging**: `tracing` events rendered by `tracing-subscriber`, JSON in
//!   production and pretty-printed in development, always on stderr
//! - **Metrics**: counters and histograms through the `metrics` facade,
//!   optionally backed by a Prometheus recorder rendered on demand
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  Bridge::handle                      │
//! │                                                      │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │              docbridge-telemetry               │  │
//! │  │                                                │  │
//! │  │   ┌───────────────┐      ┌────────────────┐    │  │
//! │  │   │    Logging    │      │    Metrics     │    │  │
//! │  │   │ (JSON/pretty) │      │  (Prometheus)  │    │  │
//! │  │   └───────┬───────┘      └────────┬───────┘    │  │
//! │  └───────────┼───────────────────────┼────────────┘  │
//! └──────────────┼───────────────────────┼───────────────┘
//!                ▼                       ▼
//!          ┌──────────┐          ┌──────────────┐
//!          │  stderr  │          │ render_metrics│
//!          └──────────┘          └──────────────┘
//! ```
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `docbridge_invocations_total` | Counter | `interface`, `function`, `status` | Total invocations |
//! | `docbridge_invocation_duration_seconds` | Histogram | `interface`, `function` | Invocation latency |
//! | `docbridge_validation_failures_total` | Counter | `interface` | Rejected payloads |
//! | `docbridge_in_flight_invocations` | Gauge | - | Invocations currently running |
//!
//! # Example
//!
//! ```rust,ignore
//! use docbridge_telemetry::{init_telemetry, LogConfig, MetricsConfig, TelemetryConfig};
//!
//! let config =
//!     TelemetryConfig::new("ingest-bridge", LogConfig::development(), MetricsConfig::default());
//!
//! init_telemetry(&config)?;
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};
pub use crate::metrics::{init_metrics, render_metrics, InFlightGuard, MetricsConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_disabled_telemetry() {
        let mut config = TelemetryConfig::default();
        config.logging.enabled = false;
        config.metrics.enabled = false;
        assert!(init_telemetry(&config).is_ok());
    }
}
