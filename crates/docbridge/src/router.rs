//! Routing of envelopes to typed requests.
//!
//! ```text
//! Envelope ──▶ InterfaceName::from_name ──▶ catalog::lookup ──▶ validate ──▶ build ──▶ ServiceRequest
//!                (case-insensitive)          (exact name)        (exact keys)   (typed fields)
//! ```
//!
//! Routing performs no I/O and never touches a handler.

use docbridge_core::{
    BridgeError, BridgeResult, DynamoDbStreamRecord, InterfaceName, SparkMapperJob,
    SparkReducerJob,
};
use docbridge_schema::{catalog, validate, FunctionSchema, Payload};
use tracing::debug;

use crate::envelope::Envelope;
use crate::request::{
    Call, KinesisRecord, ParseDocumentRequest, QueueMessage, SagemakerVectorsCall,
    ServiceRequest, SingleFileParserCall, TableItem,
};

/// Routes an envelope to a typed request.
///
/// # Errors
///
/// - `UnsupportedInterfaceError` if the interface is not one of the
///   supported names
/// - `UnknownFunctionError` if the interface has no such function
/// - `ValidationError` if `data` or `batchedData` does not match the
///   function's schema, or a declared byte range is inconsistent
///
/// # Example
///
/// ```
/// use docbridge::{route, Envelope};
/// use docbridge_core::{fixtures, InterfaceName};
/// use serde_json::json;
///
/// let envelope = Envelope::from_value(&json!({
///     "requestId": "r1",
///     "interface": "SINGLEFILEPARSER",
///     "function": "getRecordStartPattern",
///     "auth": fixtures::auth_json(),
///     "data": {"s3FileType": "DATALOG"}
/// }))
/// .unwrap();
///
/// let request = route(envelope).unwrap();
/// assert_eq!(request.interface(), InterfaceName::SingleFileParser);
/// assert_eq!(request.function(), "getRecordStartPattern");
/// ```
pub fn route(envelope: Envelope) -> BridgeResult<ServiceRequest> {
    let interface = InterfaceName::from_name(&envelope.interface)?;
    let schema = catalog::lookup(interface, &envelope.function)?;
    let payload = validate(
        schema,
        envelope.data.as_ref(),
        envelope.batched_data.as_ref(),
    )?;
    let call = build(schema, &payload)?;

    debug!(
        request_id = %envelope.request_id,
        interface = %interface,
        function = schema.function,
        "routed request"
    );
    Ok(ServiceRequest::new(envelope.request_id, envelope.auth, call))
}

fn build(schema: &FunctionSchema, p: &Payload) -> BridgeResult<Call> {
    let call = match (schema.interface, schema.function) {
        (InterfaceName::SingleFileParser, function) => {
            Call::SingleFileParser(single_file_parser(function, p)?)
        }
        (InterfaceName::QueueMessageReader, "parseMessage") => {
            Call::QueueMessageReader(QueueMessage {
                message_id: p.string("messageId")?.to_string(),
                message_group_id: p.optional_string("messageGroupId")?.map(ToString::to_string),
                message_deduplication_id: p
                    .optional_string("messageDeduplicationId")?
                    .map(ToString::to_string),
                message_attributes: p.mapping("messageAttributes")?.clone(),
                message_body: p.string("messageBody")?.to_string(),
            })
        }
        (InterfaceName::KinesisRecordReader, "parseMessage") => {
            Call::KinesisRecordReader(KinesisRecord {
                stream_arn: p.string("streamArn")?.to_string(),
                shard_id: p.string("shardId")?.to_string(),
                partition_key: p.string("partitionKey")?.to_string(),
                sequence_number: p.string("sequenceNumber")?.to_string(),
                approximate_arrival_timestamp: p.integer("approximateArrivalTimestamp")?,
                data: p.string("data")?.as_bytes().to_vec(),
            })
        }
        (InterfaceName::SagemakerVectorsInterface, "extractDocumentElementsForVectorization") => {
            Call::SagemakerVectors(SagemakerVectorsCall::ExtractDocumentElements {
                document: p.mapping("document")?.clone(),
            })
        }
        (InterfaceName::SagemakerVectorsInterface, "constructVectorDoc") => {
            Call::SagemakerVectors(SagemakerVectorsCall::ConstructVectorDoc {
                document_interface: p.mapping("documentInterface")?.clone(),
                vectors_map: p.mapping("vectorsMap")?.clone(),
            })
        }
        (InterfaceName::DynamoDbStreamsRecordReader, "parseRecord") => {
            let images = p.object("data")?;
            Call::DynamoDbStreamsRecordReader(DynamoDbStreamRecord {
                stream_arn: p.string("streamArn")?.to_string(),
                shard_id: p.string("shardId")?.to_string(),
                event_id: p.string("eventId")?.to_string(),
                event_name: p.string("eventName")?.to_string(),
                identity_principal_id: p
                    .nullable_string("identityPrincipalId")?
                    .map(ToString::to_string),
                identity_type: p.nullable_string("identityType")?.map(ToString::to_string),
                sequence_number: p.string("sequenceNumber")?.to_string(),
                size_bytes: p.integer("sizeBytes")?,
                stream_view_type: p.string("streamViewType")?.to_string(),
                approximate_creation_date_time: p.integer("approximateCreationDateTime")?,
                keys: images.mapping("keys")?.clone(),
                old_image: images.mapping("oldImage")?.clone(),
                new_image: images.mapping("newImage")?.clone(),
            })
        }
        (InterfaceName::DynamoDbTableItemReader, "parseDynamoDBItem") => {
            let data = p.object("data")?;
            Call::DynamoDbTableItemReader(TableItem {
                table_name: p.string("tableName")?.to_string(),
                segment_number: p.integer("segmentNumber")?,
                keys: data.mapping("keys")?.clone(),
                item: data.mapping("item")?.clone(),
            })
        }
        (InterfaceName::SparkMapperInterface, "mapper") => Call::SparkMapper(SparkMapperJob {
            app_name: p.string("appName")?.to_string(),
            read_destination: p.string("readDestination")?.to_string(),
            read_uri: p.string("readUri")?.to_string(),
            read_format: p.string("readFormat")?.to_string(),
            read_options: p.mapping("readOptions")?.clone(),
            write_destination: p.string("writeDestination")?.to_string(),
            write_uri: p.string("writeUri")?.to_string(),
            write_format: p.string("writeFormat")?.to_string(),
            write_mode: p.string("writeMode")?.to_string(),
            write_options: p.mapping("writeOptions")?.clone(),
            spark_credentials_secret_arn: p.string("sparkCredentialsSecretArn")?.to_string(),
        }),
        (InterfaceName::SparkReducerInterface, "reducer") => Call::SparkReducer(SparkReducerJob {
            app_name: p.string("appName")?.to_string(),
            read_destination: p.string("readDestination")?.to_string(),
            read_uris: p.string_sequence("readUris")?,
            read_format: p.string("readFormat")?.to_string(),
            read_options: p.mapping("readOptions")?.clone(),
            write_destination: p.string("writeDestination")?.to_string(),
            write_uri: p.string("writeUri")?.to_string(),
            write_format: p.string("writeFormat")?.to_string(),
            write_mode: p.string("writeMode")?.to_string(),
            write_options: p.mapping("writeOptions")?.clone(),
            spark_credentials_secret_arn: p.string("sparkCredentialsSecretArn")?.to_string(),
        }),
        (interface, function) => return Err(BridgeError::unknown_function(interface, function)),
    };
    Ok(call)
}

fn single_file_parser(function: &str, p: &Payload) -> BridgeResult<SingleFileParserCall> {
    let call = match function {
        "getS3FileType" => SingleFileParserCall::GetS3FileType,
        "getResolvedS3FileName" => SingleFileParserCall::GetResolvedS3FileName {
            s3_file_type: p.string("s3FileType")?.to_string(),
            file_name: p.string("fileName")?.to_string(),
        },
        "getRecordStartPattern" => SingleFileParserCall::GetRecordStartPattern {
            s3_file_type: p.string("s3FileType")?.to_string(),
        },
        "getRecordEndPattern" => SingleFileParserCall::GetRecordEndPattern {
            s3_file_type: p.string("s3FileType")?.to_string(),
        },
        "parseDocument" => SingleFileParserCall::ParseDocument(ParseDocumentRequest::new(
            p.string("s3FileType")?,
            p.string("fileName")?,
            p.integer("offsetBytes")?,
            p.string("content")?,
            p.integer("startIndex")?,
            p.integer("endIndex")?,
        )?),
        other => {
            return Err(BridgeError::unknown_function(
                InterfaceName::SingleFileParser,
                other,
            ))
        }
    };
    Ok(call)
}
