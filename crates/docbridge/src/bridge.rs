//! The outermost invocation boundary.
//!
//! [`Bridge::handle`] runs one invocation end to end and always returns a
//! response. Every failure, including a panicking handler, is converted to
//! the `500` failure shape here and nowhere else.
//!
//! The bridge also owns the process's [`SecretCache`]. Compute job calls
//! resolve their credentials through it, so each secret is fetched once no
//! matter how many invocations reference it.

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use docbridge_config::BridgeConfig;
use docbridge_core::{
    BridgeError, BridgeResult, ErrorCategory, HandlerRegistry, InterfaceName, SecretCache,
    StageSource,
};
use docbridge_telemetry::metrics::{record_invocation, record_validation_failure, InFlightGuard};
use docbridge_telemetry::{log_invocation_complete, log_invocation_error, log_invocation_start};
use serde_json::Value;
use tracing::{debug, field, info_span};
use uuid::Uuid;

use crate::envelope::Envelope;
use crate::marshal::to_json_safe;
use crate::request::{ExecutionContext, HandlerOutput, ServiceRequest};
use crate::response::{InvocationResponse, EXCEPTION, SUCCESS};
use crate::router::route;

/// Label used before the interface, function or request ID is known.
const UNKNOWN: &str = "unknown";

/// Routes envelopes to registered handlers and builds responses.
///
/// The bridge holds no per-invocation state and can be shared across
/// threads.
///
/// # Example
///
/// ```
/// use docbridge::Bridge;
/// use docbridge_core::fixtures::{self, JsonBodyQueueReader};
/// use docbridge_core::{HandlerRegistry, Stage, StageSource};
/// use serde_json::json;
///
/// let bridge = Bridge::new(HandlerRegistry::new().with_queue_message_reader(JsonBodyQueueReader))
///     .with_stage_source(StageSource::Fixed(Stage::Test));
///
/// let response = bridge.handle(&json!({
///     "requestId": "r1",
///     "interface": "QueueMessageReader",
///     "function": "parseMessage",
///     "auth": fixtures::auth_json(),
///     "data": {
///         "messageId": "m1",
///         "messageAttributes": {},
///         "messageBody": "{\"documentId\":\"d1\",\"partitionKey\":\"p1\"}"
///     }
/// }));
///
/// assert!(response.is_success());
/// assert_eq!(response.data().unwrap()["document"]["documentId"], "d1");
/// ```
#[derive(Debug, Clone)]
pub struct Bridge {
    registry: HandlerRegistry,
    stage_source: StageSource,
    secrets: Option<SecretCache>,
    default_region: Option<String>,
}

/// Metric and log labels, filled in as the invocation progresses.
struct Labels {
    request_id: String,
    interface: &'static str,
    function: &'static str,
}

impl Labels {
    fn unresolved() -> Self {
        Self {
            request_id: UNKNOWN.to_string(),
            interface: UNKNOWN,
            function: UNKNOWN,
        }
    }
}

impl Bridge {
    /// Creates a bridge that reads the stage from `DOCBRIDGE_STAGE`.
    #[must_use]
    pub fn new(registry: HandlerRegistry) -> Self {
        Self {
            registry,
            stage_source: StageSource::default(),
            secrets: None,
            default_region: None,
        }
    }

    /// Creates a bridge using the runtime section of a configuration.
    ///
    /// The secret cache is not part of the configuration; attach one with
    /// [`Bridge::with_secret_cache`].
    #[must_use]
    pub fn from_config(registry: HandlerRegistry, config: &BridgeConfig) -> Self {
        Self {
            registry,
            stage_source: config.runtime.stage_source(),
            secrets: None,
            default_region: config.runtime.default_region.clone(),
        }
    }

    /// Sets where the stage is read from.
    #[must_use]
    pub fn with_stage_source(mut self, stage_source: StageSource) -> Self {
        self.stage_source = stage_source;
        self
    }

    /// Sets the cache compute job credentials are resolved through.
    #[must_use]
    pub fn with_secret_cache(mut self, secrets: SecretCache) -> Self {
        self.secrets = Some(secrets);
        self
    }

    /// Sets the region for secret ARNs that carry none.
    #[must_use]
    pub fn with_default_region(mut self, region: impl Into<String>) -> Self {
        self.default_region = Some(region.into());
        self
    }

    /// Returns the secret cache, if one is attached.
    pub const fn secrets(&self) -> Option<&SecretCache> {
        self.secrets.as_ref()
    }

    /// Returns the handler registry.
    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Returns the stage source.
    pub const fn stage_source(&self) -> &StageSource {
        &self.stage_source
    }

    /// Handles one invocation event.
    ///
    /// Resolves the stage, parses the envelope, routes it, executes the
    /// request, and marshals the result. Never panics.
    pub fn handle(&self, event: &Value) -> InvocationResponse {
        let invocation_id = Uuid::now_v7();
        let span = info_span!("invocation", invocation_id = %invocation_id, stage = field::Empty);
        let _entered = span.enter();
        let _in_flight = InFlightGuard::new();

        let start = Instant::now();
        let mut labels = Labels::unresolved();
        let outcome = self.invoke(event, &span, &mut labels);
        let elapsed = start.elapsed();
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(data) => {
                record_invocation(labels.interface, labels.function, SUCCESS, elapsed);
                log_invocation_complete!(labels.request_id, SUCCESS, duration_ms);
                InvocationResponse::success(data)
            }
            Err(error) => {
                if error.category() == ErrorCategory::Validation {
                    record_validation_failure(labels.interface);
                }
                record_invocation(labels.interface, labels.function, EXCEPTION, elapsed);
                log_invocation_error!(labels.request_id, error.error_type(), error);
                log_invocation_complete!(labels.request_id, EXCEPTION, duration_ms);
                InvocationResponse::failure(&error)
            }
        }
    }

    /// Runs one invocation and returns the marshaled result.
    ///
    /// This is [`Bridge::handle`] without the response shaping, metrics and
    /// completion logs.
    pub fn invoke_value(&self, event: &Value) -> BridgeResult<Value> {
        self.invoke(event, &tracing::Span::current(), &mut Labels::unresolved())
    }

    fn invoke(
        &self,
        event: &Value,
        span: &tracing::Span,
        labels: &mut Labels,
    ) -> BridgeResult<Value> {
        let stage = self.stage_source.resolve()?;
        span.record("stage", field::display(stage));

        let envelope = Envelope::from_value(event)?;
        labels.request_id.clone_from(&envelope.request_id);
        if let Ok(interface) = InterfaceName::from_name(&envelope.interface) {
            labels.interface = interface.as_str();
        }
        log_invocation_start!(envelope.request_id, envelope.interface, envelope.function);

        let request = route(envelope)?;
        labels.function = request.function();

        let output = execute_guarded(request, self.context())?;
        let data = to_json_safe(&output)?;
        debug!(request_id = %labels.request_id, "marshaled result");
        Ok(data)
    }

    fn context(&self) -> ExecutionContext<'_> {
        let mut context = ExecutionContext::new(&self.registry);
        if let Some(secrets) = &self.secrets {
            context = context.with_secrets(secrets);
        }
        if let Some(region) = &self.default_region {
            context = context.with_default_region(region);
        }
        context
    }
}

/// Executes a request, converting a handler panic into a `HandlerError`.
fn execute_guarded(
    request: ServiceRequest,
    context: ExecutionContext<'_>,
) -> BridgeResult<HandlerOutput> {
    let interface = request.interface();
    let function = request.function();
    panic::catch_unwind(AssertUnwindSafe(|| request.execute(context))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Err(BridgeError::handler(
            interface,
            function,
            anyhow::anyhow!("handler panicked: {message}"),
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbridge_core::fixtures::{self, LineParser};
    use docbridge_core::{HandlerResult, KinesisRecordReader, ParseDocumentResult, Stage};
    use serde_json::json;

    struct PanickingReader;

    impl KinesisRecordReader for PanickingReader {
        fn parse_message(
            &self,
            _stream_arn: &str,
            _shard_id: &str,
            _partition_key: &str,
            _sequence_number: &str,
            _approximate_arrival_timestamp: i64,
            _data: &[u8],
        ) -> HandlerResult<ParseDocumentResult> {
            panic!("reader state corrupted")
        }
    }

    fn bridge(registry: HandlerRegistry) -> Bridge {
        Bridge::new(registry).with_stage_source(StageSource::Fixed(Stage::Test))
    }

    fn file_type_event() -> Value {
        json!({
            "requestId": "r1",
            "interface": "SingleFileParser",
            "function": "getS3FileType",
            "auth": fixtures::auth_json()
        })
    }

    #[test]
    fn test_success_response() {
        let bridge = bridge(HandlerRegistry::new().with_single_file_parser(LineParser::new("DATALOG")));
        let response = bridge.handle(&file_type_event());
        assert_eq!(
            response.to_value(),
            json!({"statusCode": 200, "body": {"statusCode": "SUCCESS", "data": "DATALOG"}})
        );
    }

    #[test]
    fn test_invalid_stage_fails_before_parsing() {
        let bridge = Bridge::new(HandlerRegistry::new())
            .with_stage_source(StageSource::Env("DOCBRIDGE_TEST_UNSET_STAGE_VAR".to_string()));
        let response = bridge.handle(&json!("not even an envelope"));
        assert_eq!(response.exception().unwrap().error_type, "InvalidStageError");
    }

    #[test]
    fn test_non_object_event() {
        let response = bridge(HandlerRegistry::new()).handle(&json!(null));
        assert_eq!(response.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.exception().unwrap().error_type, "ValidationError");
    }

    #[test]
    fn test_missing_handler() {
        let response = bridge(HandlerRegistry::new()).handle(&file_type_event());
        assert_eq!(
            response.exception().unwrap().error_type,
            "HandlerNotRegisteredError"
        );
    }

    #[test]
    fn test_panicking_handler_becomes_handler_error() {
        let bridge = bridge(HandlerRegistry::new().with_kinesis_record_reader(PanickingReader));
        let response = bridge.handle(&json!({
            "requestId": "r1",
            "interface": "KinesisRecordReader",
            "function": "parseMessage",
            "auth": fixtures::auth_json(),
            "data": {
                "streamArn": "arn",
                "shardId": "s",
                "partitionKey": "pk",
                "sequenceNumber": "1",
                "approximateArrivalTimestamp": 0,
                "data": "{}"
            }
        }));
        let exception = response.exception().unwrap();
        assert_eq!(exception.error_type, "HandlerError");
        assert_eq!(exception.error_message, "handler panicked: reader state corrupted");
    }

    #[test]
    fn test_invoke_value() {
        let bridge = bridge(HandlerRegistry::new().with_single_file_parser(LineParser::new("CSV")));
        assert_eq!(bridge.invoke_value(&file_type_event()).unwrap(), json!("CSV"));
    }

    #[test]
    fn test_from_config() {
        let mut config = BridgeConfig::development();
        config.runtime.default_region = Some("eu-west-1".to_string());
        let bridge = Bridge::from_config(HandlerRegistry::new(), &config);
        assert_eq!(bridge.stage_source(), &StageSource::Fixed(Stage::Test));
        assert!(bridge.registry().registered().is_empty());
        assert_eq!(bridge.default_region.as_deref(), Some("eu-west-1"));
        assert!(bridge.secrets().is_none());
    }
}
