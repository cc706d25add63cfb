//! Typed request objects and their execution against registered handlers.
//!
//! A [`ServiceRequest`] is built by the router from a validated envelope,
//! executed exactly once, then discarded. Execution forwards the typed
//! fields to the one handler function the envelope named, in the order that
//! interface documents, and returns whatever the handler returns.
//!
//! Handler failures are wrapped into `HandlerError` with their message and
//! cause chain intact. Nothing here retries or translates them.
//!
//! Compute job calls resolve their read and write credentials through the
//! [`ExecutionContext`]'s secret cache before the handler runs.

use std::collections::BTreeMap;

use docbridge_core::{
    AuthParams, BridgeError, BridgeResult, Document, DynamoDbStreamRecord,
    DynamoDbStreamsRecordReader, DynamoDbTableItemReader, HandlerRegistry, HandlerResult,
    InterfaceName, KinesisRecordReader, ParseDocumentResult, QueueMessageReader, RecordParseHint,
    SagemakerVectorsInterface, SecretCache, SingleFileParser, SparkCredentials,
    SparkMapperInterface, SparkMapperJob, SparkMethod, SparkReducerInterface, SparkReducerJob,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// What a handler function returned.
///
/// Serializes as the bare value, so `Unit` becomes `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HandlerOutput {
    /// A plain string, e.g. a file type or resolved file name.
    Text(String),
    /// A record boundary hint.
    Hint(RecordParseHint),
    /// A parsed record.
    Parsed(ParseDocumentResult),
    /// A bare document.
    Document(Document),
    /// A string-to-string mapping.
    Elements(BTreeMap<String, String>),
    /// The function returns nothing.
    Unit,
}

/// Everything a request borrows from the bridge while it executes.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionContext<'a> {
    registry: &'a HandlerRegistry,
    secrets: Option<&'a SecretCache>,
    default_region: Option<&'a str>,
}

impl<'a> ExecutionContext<'a> {
    /// Creates a context with handlers only and no secret cache.
    #[must_use]
    pub const fn new(registry: &'a HandlerRegistry) -> Self {
        Self {
            registry,
            secrets: None,
            default_region: None,
        }
    }

    /// Sets the cache compute job credentials are read through.
    #[must_use]
    pub const fn with_secrets(mut self, secrets: &'a SecretCache) -> Self {
        self.secrets = Some(secrets);
        self
    }

    /// Sets the region used for secret ARNs that carry none.
    #[must_use]
    pub const fn with_default_region(mut self, region: &'a str) -> Self {
        self.default_region = Some(region);
        self
    }

    /// Returns the handler registry.
    pub const fn registry(&self) -> &'a HandlerRegistry {
        self.registry
    }

    fn spark_credentials(
        &self,
        secret_arn: &str,
        method: SparkMethod,
    ) -> BridgeResult<SparkCredentials> {
        let Some(secrets) = self.secrets else {
            return Err(BridgeError::credentials(format!(
                "no secret cache configured to resolve {} credentials",
                method.as_str()
            )));
        };
        secrets
            .spark_job_credentials(secret_arn, self.default_region, method)
            .map_err(|source| {
                BridgeError::credentials_with_source(
                    format!("cannot resolve {} credentials from '{secret_arn}'", method.as_str()),
                    source,
                )
            })
    }
}

/// A validated request, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    request_id: String,
    auth: AuthParams,
    call: Call,
}

impl ServiceRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(request_id: impl Into<String>, auth: AuthParams, call: Call) -> Self {
        Self {
            request_id: request_id.into(),
            auth,
            call,
        }
    }

    /// Returns the caller's request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the caller's auth params.
    pub const fn auth(&self) -> &AuthParams {
        &self.auth
    }

    /// Returns the interface this request targets.
    pub const fn interface(&self) -> InterfaceName {
        self.call.interface()
    }

    /// Returns the canonical function name.
    pub fn function(&self) -> &'static str {
        self.call.function()
    }

    /// Returns the typed call.
    pub const fn call(&self) -> &Call {
        &self.call
    }

    /// Invokes the registered handler.
    ///
    /// # Errors
    ///
    /// - `HandlerNotRegisteredError` if the registry has no handler for the
    ///   interface
    /// - `CredentialsError` if a compute job's credentials cannot be resolved
    /// - `HandlerError` wrapping whatever the handler returned
    pub fn execute(self, context: ExecutionContext<'_>) -> BridgeResult<HandlerOutput> {
        let registry = context.registry();
        let interface = self.interface();
        let function = self.function();
        debug!(request_id = %self.request_id, interface = %interface, function, "executing request");

        let output = match &self.call {
            Call::SingleFileParser(call) => call.execute(registry.single_file_parser()?),
            Call::QueueMessageReader(message) => message.execute(registry.queue_message_reader()?),
            Call::KinesisRecordReader(record) => {
                record.execute(registry.kinesis_record_reader()?)
            }
            Call::SagemakerVectors(call) => call.execute(registry.sagemaker_vectors()?),
            Call::DynamoDbStreamsRecordReader(record) => registry
                .dynamodb_streams_reader()?
                .parse_record(record)
                .map(HandlerOutput::Parsed),
            Call::DynamoDbTableItemReader(item) => item.execute(registry.dynamodb_table_reader()?),
            Call::SparkMapper(job) => {
                let handler = registry.spark_mapper()?;
                let credentials = context
                    .spark_credentials(&job.spark_credentials_secret_arn, SparkMethod::Mapper)?;
                handler.mapper(job, &credentials).map(|()| HandlerOutput::Unit)
            }
            Call::SparkReducer(job) => {
                let handler = registry.spark_reducer()?;
                let credentials = context
                    .spark_credentials(&job.spark_credentials_secret_arn, SparkMethod::Reducer)?;
                handler.reducer(job, &credentials).map(|()| HandlerOutput::Unit)
            }
        };

        output.map_err(|source| BridgeError::handler(interface, function, source))
    }
}

/// The typed call of a request, one variant per interface.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// A byte-range file parser call.
    SingleFileParser(SingleFileParserCall),
    /// `QueueMessageReader.parseMessage`.
    QueueMessageReader(QueueMessage),
    /// `KinesisRecordReader.parseMessage`.
    KinesisRecordReader(KinesisRecord),
    /// A vectorization call.
    SagemakerVectors(SagemakerVectorsCall),
    /// `DynamoDBStreamsRecordReader.parseRecord`.
    DynamoDbStreamsRecordReader(DynamoDbStreamRecord),
    /// `DynamoDBTableItemReader.parseDynamoDBItem`.
    DynamoDbTableItemReader(TableItem),
    /// `SparkMapperInterface.mapper`.
    SparkMapper(SparkMapperJob),
    /// `SparkReducerInterface.reducer`.
    SparkReducer(SparkReducerJob),
}

impl Call {
    /// Returns the interface this call targets.
    pub const fn interface(&self) -> InterfaceName {
        match self {
            Self::SingleFileParser(_) => InterfaceName::SingleFileParser,
            Self::QueueMessageReader(_) => InterfaceName::QueueMessageReader,
            Self::KinesisRecordReader(_) => InterfaceName::KinesisRecordReader,
            Self::SagemakerVectors(_) => InterfaceName::SagemakerVectorsInterface,
            Self::DynamoDbStreamsRecordReader(_) => InterfaceName::DynamoDbStreamsRecordReader,
            Self::DynamoDbTableItemReader(_) => InterfaceName::DynamoDbTableItemReader,
            Self::SparkMapper(_) => InterfaceName::SparkMapperInterface,
            Self::SparkReducer(_) => InterfaceName::SparkReducerInterface,
        }
    }

    /// Returns the canonical function name.
    pub const fn function(&self) -> &'static str {
        match self {
            Self::SingleFileParser(call) => call.function(),
            Self::QueueMessageReader(_) | Self::KinesisRecordReader(_) => "parseMessage",
            Self::SagemakerVectors(call) => call.function(),
            Self::DynamoDbStreamsRecordReader(_) => "parseRecord",
            Self::DynamoDbTableItemReader(_) => "parseDynamoDBItem",
            Self::SparkMapper(_) => "mapper",
            Self::SparkReducer(_) => "reducer",
        }
    }
}

/// Calls on the byte-range file parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleFileParserCall {
    /// `getS3FileType()`.
    GetS3FileType,
    /// `getResolvedS3FileName(s3FileType, fileName)`.
    GetResolvedS3FileName {
        /// Logical file type.
        s3_file_type: String,
        /// File name as listed by the platform.
        file_name: String,
    },
    /// `getRecordStartPattern(s3FileType)`.
    GetRecordStartPattern {
        /// Logical file type.
        s3_file_type: String,
    },
    /// `getRecordEndPattern(s3FileType)`.
    GetRecordEndPattern {
        /// Logical file type.
        s3_file_type: String,
    },
    /// `parseDocument(...)`.
    ParseDocument(ParseDocumentRequest),
}

impl SingleFileParserCall {
    const fn function(&self) -> &'static str {
        match self {
            Self::GetS3FileType => "getS3FileType",
            Self::GetResolvedS3FileName { .. } => "getResolvedS3FileName",
            Self::GetRecordStartPattern { .. } => "getRecordStartPattern",
            Self::GetRecordEndPattern { .. } => "getRecordEndPattern",
            Self::ParseDocument(_) => "parseDocument",
        }
    }

    fn execute(&self, handler: &dyn SingleFileParser) -> HandlerResult<HandlerOutput> {
        match self {
            Self::GetS3FileType => handler.get_s3_file_type().map(HandlerOutput::Text),
            Self::GetResolvedS3FileName {
                s3_file_type,
                file_name,
            } => handler
                .get_resolved_s3_file_name(s3_file_type, file_name)
                .map(HandlerOutput::Text),
            Self::GetRecordStartPattern { s3_file_type } => handler
                .get_record_start_pattern(s3_file_type)
                .map(HandlerOutput::Hint),
            Self::GetRecordEndPattern { s3_file_type } => handler
                .get_record_end_pattern(s3_file_type)
                .map(HandlerOutput::Hint),
            Self::ParseDocument(request) => handler
                .parse_document(
                    &request.s3_file_type,
                    &request.file_name,
                    request.offset_bytes,
                    &request.content,
                    request.start_index,
                    request.end_index,
                )
                .map(HandlerOutput::Parsed),
        }
    }
}

/// Parameters of `SingleFileParser.parseDocument`.
///
/// The content arrives as a string and is forwarded as its UTF-8 bytes. The
/// declared range must cover exactly those bytes: `startIndex` is 0 and
/// `endIndex` is the byte length. Any other range is rejected here, so the
/// handler only ever sees a range it can slice safely.
///
/// # Example
///
/// ```
/// use docbridge::ParseDocumentRequest;
///
/// let request = ParseDocumentRequest::new("DATALOG", "log.txt", 0, "héllo\n", 0, 7).unwrap();
/// assert_eq!(request.content().len(), 7);
///
/// let err = ParseDocumentRequest::new("DATALOG", "log.txt", 0, "héllo\n", 0, 6).unwrap_err();
/// assert!(err.to_string().contains("expected: 7, actual: 6"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDocumentRequest {
    s3_file_type: String,
    file_name: String,
    offset_bytes: i64,
    content: Vec<u8>,
    start_index: usize,
    end_index: usize,
}

impl ParseDocumentRequest {
    /// Builds the request, checking the declared byte range.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `start_index` is not 0 or `end_index` is
    /// not the UTF-8 byte length of `content`.
    pub fn new(
        s3_file_type: impl Into<String>,
        file_name: impl Into<String>,
        offset_bytes: i64,
        content: &str,
        start_index: i64,
        end_index: i64,
    ) -> BridgeResult<Self> {
        let content = content.as_bytes().to_vec();
        if start_index != 0 {
            return Err(range_error("startIndex", 0, start_index));
        }
        let length = content.len();
        if usize::try_from(end_index).ok() != Some(length) {
            return Err(range_error("endIndex", length, end_index));
        }

        Ok(Self {
            s3_file_type: s3_file_type.into(),
            file_name: file_name.into(),
            offset_bytes,
            content,
            start_index: 0,
            end_index: length,
        })
    }

    /// Returns the logical file type.
    pub fn s3_file_type(&self) -> &str {
        &self.s3_file_type
    }

    /// Returns the file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns the offset of the content within the file, in bytes.
    pub const fn offset_bytes(&self) -> i64 {
        self.offset_bytes
    }

    /// Returns the content bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns the start of the record within the content. Always 0.
    pub const fn start_index(&self) -> usize {
        self.start_index
    }

    /// Returns the end of the record within the content.
    pub const fn end_index(&self) -> usize {
        self.end_index
    }
}

fn range_error(field: &str, expected: usize, actual: i64) -> BridgeError {
    BridgeError::validation(format!(
        "SingleFileParser.parseDocument - invalid {field} for content bytes - \
         expected: {expected}, actual: {actual}"
    ))
}

/// Parameters of `QueueMessageReader.parseMessage`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueMessage {
    /// Queue message ID.
    pub message_id: String,
    /// FIFO message group, if any.
    pub message_group_id: Option<String>,
    /// FIFO deduplication ID, if any.
    pub message_deduplication_id: Option<String>,
    /// Message attributes.
    pub message_attributes: Map<String, Value>,
    /// Message body.
    pub message_body: String,
}

impl QueueMessage {
    fn execute(&self, handler: &dyn QueueMessageReader) -> HandlerResult<HandlerOutput> {
        handler
            .parse_message(
                &self.message_id,
                self.message_group_id.as_deref(),
                self.message_deduplication_id.as_deref(),
                &self.message_attributes,
                &self.message_body,
            )
            .map(HandlerOutput::Parsed)
    }
}

/// Parameters of `KinesisRecordReader.parseMessage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KinesisRecord {
    /// Stream ARN.
    pub stream_arn: String,
    /// Shard ID.
    pub shard_id: String,
    /// Partition key.
    pub partition_key: String,
    /// Sequence number.
    pub sequence_number: String,
    /// Arrival time, in epoch milliseconds.
    pub approximate_arrival_timestamp: i64,
    /// Record payload, the UTF-8 bytes of the envelope's `data` string.
    pub data: Vec<u8>,
}

impl KinesisRecord {
    fn execute(&self, handler: &dyn KinesisRecordReader) -> HandlerResult<HandlerOutput> {
        handler
            .parse_message(
                &self.stream_arn,
                &self.shard_id,
                &self.partition_key,
                &self.sequence_number,
                self.approximate_arrival_timestamp,
                &self.data,
            )
            .map(HandlerOutput::Parsed)
    }
}

/// Calls on the vectorization interface.
#[derive(Debug, Clone, PartialEq)]
pub enum SagemakerVectorsCall {
    /// `extractDocumentElementsForVectorization(document)`.
    ExtractDocumentElements {
        /// The document to extract from.
        document: Map<String, Value>,
    },
    /// `constructVectorDoc(documentInterface, vectorsMap)`.
    ConstructVectorDoc {
        /// The source document.
        document_interface: Map<String, Value>,
        /// Computed vectors, keyed by element name.
        vectors_map: Map<String, Value>,
    },
}

impl SagemakerVectorsCall {
    const fn function(&self) -> &'static str {
        match self {
            Self::ExtractDocumentElements { .. } => "extractDocumentElementsForVectorization",
            Self::ConstructVectorDoc { .. } => "constructVectorDoc",
        }
    }

    fn execute(&self, handler: &dyn SagemakerVectorsInterface) -> HandlerResult<HandlerOutput> {
        match self {
            Self::ExtractDocumentElements { document } => handler
                .extract_document_elements_for_vectorization(document)
                .map(HandlerOutput::Elements),
            Self::ConstructVectorDoc {
                document_interface,
                vectors_map,
            } => handler
                .construct_vector_doc(document_interface, vectors_map)
                .map(HandlerOutput::Document),
        }
    }
}

/// Parameters of `DynamoDBTableItemReader.parseDynamoDBItem`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableItem {
    /// Table name.
    pub table_name: String,
    /// Scan segment the item came from.
    pub segment_number: i64,
    /// Primary key attributes.
    pub keys: Map<String, Value>,
    /// The full item.
    pub item: Map<String, Value>,
}

impl TableItem {
    fn execute(&self, handler: &dyn DynamoDbTableItemReader) -> HandlerResult<HandlerOutput> {
        handler
            .parse_dynamodb_item(&self.table_name, self.segment_number, &self.keys, &self.item)
            .map(HandlerOutput::Parsed)
    }
}
