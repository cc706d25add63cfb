//! Invocation metrics for Docbridge.
//!
//! Metrics are recorded through the `metrics` facade. When a Prometheus
//! recorder is installed with [`init_metrics`], the current values can be
//! rendered on demand with [`render_metrics`]; no HTTP listener is started.
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
//! ```
//! use docbridge_telemetry::metrics::record_invocation;
//! use std::time::Duration;
//!
//! // Without an installed recorder this is a no-op.
//! record_invocation("QueueMessageReader", "parseMessage", "SUCCESS", Duration::from_millis(4));
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

/// Total invocations by interface, function and response status.
pub const INVOCATIONS_TOTAL: &str = "docbridge_invocations_total";

/// Invocation latency histogram.
pub const INVOCATION_DURATION_SECONDS: &str = "docbridge_invocation_duration_seconds";

/// Payloads rejected by schema validation.
pub const VALIDATION_FAILURES_TOTAL: &str = "docbridge_validation_failures_total";

/// Invocations currently running.
pub const IN_FLIGHT_INVOCATIONS: &str = "docbridge_in_flight_invocations";

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Service name, attached to every metric as the `service` label.
    pub service_name: String,

    /// Histogram buckets for invocation duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "docbridge".to_string(),
            // 1ms .. 10s
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

impl MetricsConfig {
    /// Checks the bucket list.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` if the buckets are empty, not
    /// positive, or not strictly increasing.
    pub fn validate(&self) -> TelemetryResult<()> {
        if self.duration_buckets.is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "duration_buckets must not be empty".to_string(),
            ));
        }
        if self.duration_buckets.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            return Err(TelemetryError::InvalidConfig(
                "duration_buckets must be positive".to_string(),
            ));
        }
        if self.duration_buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TelemetryError::InvalidConfig(
                "duration_buckets must be strictly increasing".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builds a Prometheus exporter from the configuration.
fn builder(config: &MetricsConfig) -> TelemetryResult<PrometheusBuilder> {
    config.validate()?;
    PrometheusBuilder::new()
        .add_global_label("service", config.service_name.clone())
        .set_buckets_for_metric(
            Matcher::Full(INVOCATION_DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Installs the Prometheus recorder as the global metrics recorder.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if a recorder is already installed
/// or the configuration is rejected.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let handle = builder(config)?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();

    Ok(())
}

/// Returns the global metrics handle if initialized.
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers descriptions for all standard metrics.
fn register_metric_descriptions() {
    describe_counter!(INVOCATIONS_TOTAL, "Total number of invocations handled");
    describe_histogram!(
        INVOCATION_DURATION_SECONDS,
        "Invocation duration in seconds"
    );
    describe_counter!(
        VALIDATION_FAILURES_TOTAL,
        "Total payloads rejected by schema validation"
    );
    describe_gauge!(
        IN_FLIGHT_INVOCATIONS,
        "Number of invocations currently being processed"
    );
}

/// Records a completed invocation.
///
/// Updates `docbridge_invocations_total` and
/// `docbridge_invocation_duration_seconds`. Unresolved interface or
/// function names should be passed as `"unknown"` to keep label
/// cardinality bounded.
pub fn record_invocation(interface: &str, function: &str, status: &str, duration: Duration) {
    counter!(
        INVOCATIONS_TOTAL,
        "interface" => interface.to_string(),
        "function" => function.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        INVOCATION_DURATION_SECONDS,
        "interface" => interface.to_string(),
        "function" => function.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a payload rejected by schema validation.
pub fn record_validation_failure(interface: &str) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "interface" => interface.to_string()
    )
    .increment(1);
}

/// Guard that tracks an in-flight invocation.
///
/// The gauge is incremented on creation and decremented on drop, so it is
/// restored even when the invocation unwinds.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_INVOCATIONS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_INVOCATIONS).decrement(1.0);
    }
}
