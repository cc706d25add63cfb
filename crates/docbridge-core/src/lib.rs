//! # Docbridge Core
//!
//! Core types and traits for the Docbridge invocation bridge.
//!
//! This crate provides the foundational types used throughout Docbridge:
//!
//! - [`Document`] - The document taxonomy (`Document`, `SingleDoc`, `ErrorDoc`, `SkipDoc`, `CompositeDoc`)
//! - [`ParseDocumentResult`] - A parsed document with its `SUCCESS`/`ERROR`/`SKIP` status
//! - [`RecordParseHint`] - Pattern- or offset-based record boundaries
//! - [`BridgeError`] - Standard error type
//! - [`InterfaceName`] and the per-interface handler traits
//! - [`HandlerRegistry`] - Handler implementations keyed by interface
//! - [`SecretCache`] - Process-wide `(region, secret id)` cache

#![doc(html_root_url = "https://docs.rs/docbridge-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod arn;
mod auth;
mod document;
mod error;
pub mod fixtures;
mod handler;
mod hint;
mod interface;
pub mod records;
mod registry;
mod result;
mod secrets;
mod stage;

pub use arn::{s3a_bucket_name, Arn, ArnError};
pub use auth::{json_kind, AuthParams};
pub use document::{
    CompositeDoc, Document, DocumentFields, DocumentType, ErrorDoc, RecordOffsets, SingleDoc,
    SkipDoc,
};
pub use error::{BridgeError, BridgeResult, ErrorCategory, ExceptionDetail, FieldErrors, ModelError};
pub use handler::{
    DynamoDbStreamsRecordReader, DynamoDbTableItemReader, HandlerResult, KinesisRecordReader,
    QueueMessageReader, SagemakerVectorsInterface, SingleFileParser, SparkMapperInterface,
    SparkReducerInterface,
};
pub use hint::{RecordHintType, RecordParseHint};
pub use interface::InterfaceName;
pub use records::{DynamoDbStreamRecord, SparkMapperJob, SparkReducerJob};
pub use registry::HandlerRegistry;
pub use result::{ParseDocumentResult, ParseDocumentResultStatus};
pub use secrets::{
    AwsCredentials, SecretCache, SecretError, SecretStore, SparkCredentials, SparkDestination,
    SparkMethod,
};
pub use stage::{Stage, StageSource, DEFAULT_STAGE_VAR};
