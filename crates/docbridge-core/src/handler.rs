//! Handler traits, one per interface.
//!
//! A handler is the user-supplied implementation of an interface's
//! functions. The bridge calls it synchronously and treats any blocking I/O
//! inside it as opaque; no timeout or retry is imposed here.
//!
//! Handlers return [`HandlerResult`]. Any error they return is surfaced
//! unchanged as a `HandlerError` in the failure response.
//!
//! # Example
//!
//! ```
//! use docbridge_core::{
//!     DocumentFields, HandlerResult, ParseDocumentResult, QueueMessageReader,
//! };
//! use serde_json::{Map, Value};
//!
//! struct EchoReader;
//!
//! impl QueueMessageReader for EchoReader {
//!     fn parse_message(
//!         &self,
//!         message_id: &str,
//!         _message_group_id: Option<&str>,
//!         _message_deduplication_id: Option<&str>,
//!         _message_attributes: &Map<String, Value>,
//!         message_body: &str,
//!     ) -> HandlerResult<ParseDocumentResult> {
//!         let fields = DocumentFields::new(message_id, "Message", message_id)
//!             .with_value("body", message_body);
//!         Ok(ParseDocumentResult::success(fields))
//!     }
//! }
//! ```

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::document::Document;
use crate::hint::RecordParseHint;
use crate::records::{DynamoDbStreamRecord, SparkMapperJob, SparkReducerJob};
use crate::result::ParseDocumentResult;
use crate::secrets::SparkCredentials;

/// Result type returned by handler functions.
pub type HandlerResult<T> = anyhow::Result<T>;

/// Parses delimited byte ranges of a single file.
pub trait SingleFileParser: Send + Sync + 'static {
    /// Returns the logical file type this parser reads.
    fn get_s3_file_type(&self) -> HandlerResult<String>;

    /// Resolves the physical file name for a logical file type.
    fn get_resolved_s3_file_name(&self, s3_file_type: &str, file_name: &str)
        -> HandlerResult<String>;

    /// Returns the hint that locates the start of a record.
    fn get_record_start_pattern(&self, s3_file_type: &str) -> HandlerResult<RecordParseHint>;

    /// Returns the hint that locates the end of a record.
    fn get_record_end_pattern(&self, s3_file_type: &str) -> HandlerResult<RecordParseHint>;

    /// Parses one already-delimited record.
    ///
    /// `content[start_index..end_index]` is the record; the bridge
    /// guarantees `start_index == 0` and `end_index == content.len()`.
    fn parse_document(
        &self,
        s3_file_type: &str,
        file_name: &str,
        offset_bytes: i64,
        content: &[u8],
        start_index: usize,
        end_index: usize,
    ) -> HandlerResult<ParseDocumentResult>;
}

/// Parses messages read from a queue.
pub trait QueueMessageReader: Send + Sync + 'static {
    /// Parses one message.
    fn parse_message(
        &self,
        message_id: &str,
        message_group_id: Option<&str>,
        message_deduplication_id: Option<&str>,
        message_attributes: &Map<String, Value>,
        message_body: &str,
    ) -> HandlerResult<ParseDocumentResult>;
}

/// Parses records read from a stream shard.
pub trait KinesisRecordReader: Send + Sync + 'static {
    /// Parses one record. `data` is the record payload.
    fn parse_message(
        &self,
        stream_arn: &str,
        shard_id: &str,
        partition_key: &str,
        sequence_number: &str,
        approximate_arrival_timestamp: i64,
        data: &[u8],
    ) -> HandlerResult<ParseDocumentResult>;
}

/// Extracts document elements for vectorization and builds vector documents.
pub trait SagemakerVectorsInterface: Send + Sync + 'static {
    /// Returns the elements to vectorize, keyed by a friendly name.
    fn extract_document_elements_for_vectorization(
        &self,
        document: &Map<String, Value>,
    ) -> HandlerResult<BTreeMap<String, String>>;

    /// Builds the output document from the source document and its vectors.
    fn construct_vector_doc(
        &self,
        document_interface: &Map<String, Value>,
        vectors_map: &Map<String, Value>,
    ) -> HandlerResult<Document>;
}

/// Parses change records read from a table stream.
pub trait DynamoDbStreamsRecordReader: Send + Sync + 'static {
    /// Parses one change record.
    fn parse_record(&self, record: &DynamoDbStreamRecord) -> HandlerResult<ParseDocumentResult>;
}

/// Parses items read from a table scan segment.
pub trait DynamoDbTableItemReader: Send + Sync + 'static {
    /// Parses one item.
    fn parse_dynamodb_item(
        &self,
        table_name: &str,
        segment_number: i64,
        keys: &Map<String, Value>,
        item: &Map<String, Value>,
    ) -> HandlerResult<ParseDocumentResult>;
}

/// Runs the map phase of a distributed compute job.
///
/// The job writes its own output; nothing is returned. `credentials` are the
/// mapper's read and write credentials, resolved from the job's
/// `spark_credentials_secret_arn` through the bridge's secret cache.
pub trait SparkMapperInterface: Send + Sync + 'static {
    /// Runs the mapper.
    fn mapper(&self, job: &SparkMapperJob, credentials: &SparkCredentials) -> HandlerResult<()>;
}

/// Runs the reduce phase of a distributed compute job.
pub trait SparkReducerInterface: Send + Sync + 'static {
    /// Runs the reducer with the reducer's read and write credentials.
    fn reducer(&self, job: &SparkReducerJob, credentials: &SparkCredentials) -> HandlerResult<()>;
}
