//! Parameter bundles for handler functions that take many fields.
//!
//! Functions with a handful of parameters receive them positionally. The
//! table-stream reader and the compute job interfaces receive one of these
//! bundles instead, with fields in the documented order.

use serde::Serialize;
use serde_json::{Map, Value};

/// One change record read from a table stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamoDbStreamRecord {
    /// ARN of the stream.
    pub stream_arn: String,
    /// Shard the record was read from.
    pub shard_id: String,
    /// Unique id of the change event.
    pub event_id: String,
    /// `INSERT`, `MODIFY` or `REMOVE`.
    pub event_name: String,
    /// Principal that made the change, if recorded.
    pub identity_principal_id: Option<String>,
    /// Type of that principal, if recorded.
    pub identity_type: Option<String>,
    /// Sequence number of the record within the shard.
    pub sequence_number: String,
    /// Size of the record in bytes.
    pub size_bytes: i64,
    /// Which images the stream carries.
    pub stream_view_type: String,
    /// Approximate creation time, epoch milliseconds.
    pub approximate_creation_date_time: i64,
    /// Key attributes of the changed item.
    pub keys: Map<String, Value>,
    /// Item image before the change.
    pub old_image: Map<String, Value>,
    /// Item image after the change.
    pub new_image: Map<String, Value>,
}

/// Parameters of a map-phase compute job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SparkMapperJob {
    /// Application name of the compute session.
    pub app_name: String,
    /// Where the input lives, e.g. `S3`.
    pub read_destination: String,
    /// Input location.
    pub read_uri: String,
    /// Input format, e.g. `json`.
    pub read_format: String,
    /// Reader options.
    pub read_options: Map<String, Value>,
    /// Where the output goes.
    pub write_destination: String,
    /// Output location.
    pub write_uri: String,
    /// Output format.
    pub write_format: String,
    /// Write mode, e.g. `overwrite`.
    pub write_mode: String,
    /// Writer options.
    pub write_options: Map<String, Value>,
    /// ARN of the secret holding read/write credentials.
    pub spark_credentials_secret_arn: String,
}

/// Parameters of a reduce-phase compute job.
///
/// Same as [`SparkMapperJob`] except the input is a list of locations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SparkReducerJob {
    /// Application name of the compute session.
    pub app_name: String,
    /// Where the input lives.
    pub read_destination: String,
    /// Input locations.
    pub read_uris: Vec<String>,
    /// Input format.
    pub read_format: String,
    /// Reader options.
    pub read_options: Map<String, Value>,
    /// Where the output goes.
    pub write_destination: String,
    /// Output location.
    pub write_uri: String,
    /// Output format.
    pub write_format: String,
    /// Write mode.
    pub write_mode: String,
    /// Writer options.
    pub write_options: Map<String, Value>,
    /// ARN of the secret holding read/write credentials.
    pub spark_credentials_secret_arn: String,
}
