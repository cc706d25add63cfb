//! Registry of handler implementations.
//!
//! Handlers are registered once at startup and looked up by interface for
//! every invocation. At most one handler is held per interface.
//!
//! # Example
//!
//! ```
//! use docbridge_core::{HandlerRegistry, InterfaceName};
//! use docbridge_core::fixtures::JsonBodyQueueReader;
//!
//! let registry = HandlerRegistry::new().with_queue_message_reader(JsonBodyQueueReader);
//! assert!(registry.is_registered(InterfaceName::QueueMessageReader));
//! assert!(registry.single_file_parser().is_err());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::BridgeError;
use crate::handler::{
    DynamoDbStreamsRecordReader, DynamoDbTableItemReader, KinesisRecordReader,
    QueueMessageReader, SagemakerVectorsInterface, SingleFileParser, SparkMapperInterface,
    SparkReducerInterface,
};
use crate::interface::InterfaceName;

/// Handler implementations keyed by interface.
///
/// Cloning is cheap; handlers are shared behind `Arc`.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    single_file_parser: Option<Arc<dyn SingleFileParser>>,
    queue_message_reader: Option<Arc<dyn QueueMessageReader>>,
    kinesis_record_reader: Option<Arc<dyn KinesisRecordReader>>,
    sagemaker_vectors: Option<Arc<dyn SagemakerVectorsInterface>>,
    dynamodb_streams_reader: Option<Arc<dyn DynamoDbStreamsRecordReader>>,
    dynamodb_table_reader: Option<Arc<dyn DynamoDbTableItemReader>>,
    spark_mapper: Option<Arc<dyn SparkMapperInterface>>,
    spark_reducer: Option<Arc<dyn SparkReducerInterface>>,
}

fn lookup<'a, T: ?Sized>(
    slot: Option<&'a Arc<T>>,
    interface: InterfaceName,
) -> Result<&'a T, BridgeError> {
    slot.map(|handler| &**handler)
        .ok_or(BridgeError::HandlerNotRegistered { interface })
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the single-file parser.
    #[must_use]
    pub fn with_single_file_parser(mut self, handler: impl SingleFileParser) -> Self {
        self.single_file_parser = Some(Arc::new(handler));
        self
    }

    /// Registers the queue message reader.
    #[must_use]
    pub fn with_queue_message_reader(mut self, handler: impl QueueMessageReader) -> Self {
        self.queue_message_reader = Some(Arc::new(handler));
        self
    }

    /// Registers the stream record reader.
    #[must_use]
    pub fn with_kinesis_record_reader(mut self, handler: impl KinesisRecordReader) -> Self {
        self.kinesis_record_reader = Some(Arc::new(handler));
        self
    }

    /// Registers the vectorization interface.
    #[must_use]
    pub fn with_sagemaker_vectors(mut self, handler: impl SagemakerVectorsInterface) -> Self {
        self.sagemaker_vectors = Some(Arc::new(handler));
        self
    }

    /// Registers the table-stream record reader.
    #[must_use]
    pub fn with_dynamodb_streams_reader(
        mut self,
        handler: impl DynamoDbStreamsRecordReader,
    ) -> Self {
        self.dynamodb_streams_reader = Some(Arc::new(handler));
        self
    }

    /// Registers the table item reader.
    #[must_use]
    pub fn with_dynamodb_table_reader(mut self, handler: impl DynamoDbTableItemReader) -> Self {
        self.dynamodb_table_reader = Some(Arc::new(handler));
        self
    }

    /// Registers the compute job mapper.
    #[must_use]
    pub fn with_spark_mapper(mut self, handler: impl SparkMapperInterface) -> Self {
        self.spark_mapper = Some(Arc::new(handler));
        self
    }

    /// Registers the compute job reducer.
    #[must_use]
    pub fn with_spark_reducer(mut self, handler: impl SparkReducerInterface) -> Self {
        self.spark_reducer = Some(Arc::new(handler));
        self
    }

    /// Returns the single-file parser.
    pub fn single_file_parser(&self) -> Result<&dyn SingleFileParser, BridgeError> {
        lookup(
            self.single_file_parser.as_ref(),
            InterfaceName::SingleFileParser,
        )
    }

    /// Returns the queue message reader.
    pub fn queue_message_reader(&self) -> Result<&dyn QueueMessageReader, BridgeError> {
        lookup(
            self.queue_message_reader.as_ref(),
            InterfaceName::QueueMessageReader,
        )
    }

    /// Returns the stream record reader.
    pub fn kinesis_record_reader(&self) -> Result<&dyn KinesisRecordReader, BridgeError> {
        lookup(
            self.kinesis_record_reader.as_ref(),
            InterfaceName::KinesisRecordReader,
        )
    }

    /// Returns the vectorization interface.
    pub fn sagemaker_vectors(&self) -> Result<&dyn SagemakerVectorsInterface, BridgeError> {
        lookup(
            self.sagemaker_vectors.as_ref(),
            InterfaceName::SagemakerVectorsInterface,
        )
    }

    /// Returns the table-stream record reader.
    pub fn dynamodb_streams_reader(
        &self,
    ) -> Result<&dyn DynamoDbStreamsRecordReader, BridgeError> {
        lookup(
            self.dynamodb_streams_reader.as_ref(),
            InterfaceName::DynamoDbStreamsRecordReader,
        )
    }

    /// Returns the table item reader.
    pub fn dynamodb_table_reader(&self) -> Result<&dyn DynamoDbTableItemReader, BridgeError> {
        lookup(
            self.dynamodb_table_reader.as_ref(),
            InterfaceName::DynamoDbTableItemReader,
        )
    }

    /// Returns the compute job mapper.
    pub fn spark_mapper(&self) -> Result<&dyn SparkMapperInterface, BridgeError> {
        lookup(
            self.spark_mapper.as_ref(),
            InterfaceName::SparkMapperInterface,
        )
    }

    /// Returns the compute job reducer.
    pub fn spark_reducer(&self) -> Result<&dyn SparkReducerInterface, BridgeError> {
        lookup(
            self.spark_reducer.as_ref(),
            InterfaceName::SparkReducerInterface,
        )
    }

    /// Returns `true` if a handler is registered for the interface.
    #[must_use]
    pub const fn is_registered(&self, interface: InterfaceName) -> bool {
        match interface {
            InterfaceName::SingleFileParser => self.single_file_parser.is_some(),
            InterfaceName::QueueMessageReader => self.queue_message_reader.is_some(),
            InterfaceName::KinesisRecordReader => self.kinesis_record_reader.is_some(),
            InterfaceName::SagemakerVectorsInterface => self.sagemaker_vectors.is_some(),
            InterfaceName::DynamoDbStreamsRecordReader => self.dynamodb_streams_reader.is_some(),
            InterfaceName::DynamoDbTableItemReader => self.dynamodb_table_reader.is_some(),
            InterfaceName::SparkMapperInterface => self.spark_mapper.is_some(),
            InterfaceName::SparkReducerInterface => self.spark_reducer.is_some(),
        }
    }

    /// Returns the interfaces that have a handler.
    #[must_use]
    pub fn registered(&self) -> Vec<InterfaceName> {
        InterfaceName::ALL
            .into_iter()
            .filter(|interface| self.is_registered(*interface))
            .collect()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("registered", &self.registered())
            .finish()
    }
}
