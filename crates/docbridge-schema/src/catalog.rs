//! Payload schemas of every supported `(interface, function)` pair.
//!
//! No function accepts `batchedData`; the validator rejects any non-empty
//! value for all of them.

use docbridge_core::{BridgeError, InterfaceName};
use tracing::debug;

use crate::schema::{FieldSpec, FieldType, FunctionSchema};

const STRING_SEQUENCE: FieldType = FieldType::Sequence(&FieldType::String);

const RESOLVED_FILE_NAME: &[FieldSpec] = &[
    FieldSpec::required("s3FileType", FieldType::String),
    FieldSpec::required("fileName", FieldType::String),
];

const FILE_TYPE_ONLY: &[FieldSpec] = &[FieldSpec::required("s3FileType", FieldType::String)];

const PARSE_DOCUMENT: &[FieldSpec] = &[
    FieldSpec::required("s3FileType", FieldType::String),
    FieldSpec::required("fileName", FieldType::String),
    FieldSpec::required("offsetBytes", FieldType::Integer),
    FieldSpec::required("content", FieldType::String),
    FieldSpec::required("startIndex", FieldType::Integer),
    FieldSpec::required("endIndex", FieldType::Integer),
];

const QUEUE_MESSAGE: &[FieldSpec] = &[
    FieldSpec::required("messageId", FieldType::String),
    FieldSpec::optional("messageGroupId", FieldType::String),
    FieldSpec::optional("messageDeduplicationId", FieldType::String),
    FieldSpec::required("messageAttributes", FieldType::Mapping),
    FieldSpec::required("messageBody", FieldType::String),
];

const STREAM_RECORD: &[FieldSpec] = &[
    FieldSpec::required("streamArn", FieldType::String),
    FieldSpec::required("shardId", FieldType::String),
    FieldSpec::required("partitionKey", FieldType::String),
    FieldSpec::required("sequenceNumber", FieldType::String),
    FieldSpec::required("approximateArrivalTimestamp", FieldType::Integer),
    FieldSpec::required("data", FieldType::String),
];

const VECTOR_ELEMENTS: &[FieldSpec] = &[FieldSpec::required("document", FieldType::Mapping)];

const VECTOR_DOC: &[FieldSpec] = &[
    FieldSpec::required("documentInterface", FieldType::Mapping),
    FieldSpec::required("vectorsMap", FieldType::Mapping),
];

const CHANGE_IMAGES: &[FieldSpec] = &[
    FieldSpec::required("keys", FieldType::Mapping),
    FieldSpec::required("oldImage", FieldType::Mapping),
    FieldSpec::required("newImage", FieldType::Mapping),
];

const CHANGE_RECORD: &[FieldSpec] = &[
    FieldSpec::required("streamArn", FieldType::String),
    FieldSpec::required("shardId", FieldType::String),
    FieldSpec::required("eventId", FieldType::String),
    FieldSpec::required("eventName", FieldType::String),
    FieldSpec::nullable("identityPrincipalId", FieldType::String),
    FieldSpec::nullable("identityType", FieldType::String),
    FieldSpec::required("sequenceNumber", FieldType::String),
    FieldSpec::required("sizeBytes", FieldType::Integer),
    FieldSpec::required("streamViewType", FieldType::String),
    FieldSpec::required("approximateCreationDateTime", FieldType::Integer),
    FieldSpec::required("data", FieldType::Object(CHANGE_IMAGES)),
];

const TABLE_ITEM_DATA: &[FieldSpec] = &[
    FieldSpec::required("keys", FieldType::Mapping),
    FieldSpec::required("item", FieldType::Mapping),
];

const TABLE_ITEM: &[FieldSpec] = &[
    FieldSpec::required("tableName", FieldType::String),
    FieldSpec::required("segmentNumber", FieldType::Integer),
    FieldSpec::required("data", FieldType::Object(TABLE_ITEM_DATA)),
];

const MAPPER_JOB: &[FieldSpec] = &[
    FieldSpec::required("appName", FieldType::String),
    FieldSpec::required("readDestination", FieldType::String),
    FieldSpec::required("readUri", FieldType::String),
    FieldSpec::required("readFormat", FieldType::String),
    FieldSpec::required("readOptions", FieldType::Mapping),
    FieldSpec::required("writeDestination", FieldType::String),
    FieldSpec::required("writeUri", FieldType::String),
    FieldSpec::required("writeFormat", FieldType::String),
    FieldSpec::required("writeMode", FieldType::String),
    FieldSpec::required("writeOptions", FieldType::Mapping),
    FieldSpec::required("sparkCredentialsSecretArn", FieldType::String),
];

const REDUCER_JOB: &[FieldSpec] = &[
    FieldSpec::required("appName", FieldType::String),
    FieldSpec::required("readDestination", FieldType::String),
    FieldSpec::required("readUris", STRING_SEQUENCE),
    FieldSpec::required("readFormat", FieldType::String),
    FieldSpec::required("readOptions", FieldType::Mapping),
    FieldSpec::required("writeDestination", FieldType::String),
    FieldSpec::required("writeUri", FieldType::String),
    FieldSpec::required("writeFormat", FieldType::String),
    FieldSpec::required("writeMode", FieldType::String),
    FieldSpec::required("writeOptions", FieldType::Mapping),
    FieldSpec::required("sparkCredentialsSecretArn", FieldType::String),
];

const fn schema(
    interface: InterfaceName,
    function: &'static str,
    fields: &'static [FieldSpec],
) -> FunctionSchema {
    FunctionSchema {
        interface,
        function,
        fields,
    }
}

/// Every function schema, grouped by interface.
pub static SCHEMAS: &[FunctionSchema] = &[
    schema(InterfaceName::SingleFileParser, "getS3FileType", &[]),
    schema(
        InterfaceName::SingleFileParser,
        "getResolvedS3FileName",
        RESOLVED_FILE_NAME,
    ),
    schema(
        InterfaceName::SingleFileParser,
        "getRecordStartPattern",
        FILE_TYPE_ONLY,
    ),
    schema(
        InterfaceName::SingleFileParser,
        "getRecordEndPattern",
        FILE_TYPE_ONLY,
    ),
    schema(
        InterfaceName::SingleFileParser,
        "parseDocument",
        PARSE_DOCUMENT,
    ),
    schema(
        InterfaceName::QueueMessageReader,
        "parseMessage",
        QUEUE_MESSAGE,
    ),
    schema(
        InterfaceName::SagemakerVectorsInterface,
        "extractDocumentElementsForVectorization",
        VECTOR_ELEMENTS,
    ),
    schema(
        InterfaceName::SagemakerVectorsInterface,
        "constructVectorDoc",
        VECTOR_DOC,
    ),
    schema(
        InterfaceName::KinesisRecordReader,
        "parseMessage",
        STREAM_RECORD,
    ),
    schema(
        InterfaceName::DynamoDbStreamsRecordReader,
        "parseRecord",
        CHANGE_RECORD,
    ),
    schema(
        InterfaceName::DynamoDbTableItemReader,
        "parseDynamoDBItem",
        TABLE_ITEM,
    ),
    schema(InterfaceName::SparkMapperInterface, "mapper", MAPPER_JOB),
    schema(InterfaceName::SparkReducerInterface, "reducer", REDUCER_JOB),
];

/// Returns the schema of a function, matching the function name exactly.
///
/// # Errors
///
/// Returns [`BridgeError::UnknownFunction`] if the interface does not
/// recognise the function name.
pub fn lookup(interface: InterfaceName, function: &str) -> Result<&'static FunctionSchema, BridgeError> {
    let found = SCHEMAS
        .iter()
        .find(|schema| schema.interface == interface && schema.function == function);
    match found {
        Some(schema) => Ok(schema),
        None => {
            debug!(interface = %interface, function, "unknown function");
            Err(BridgeError::unknown_function(interface, function))
        }
    }
}

/// Returns the function names an interface recognises.
#[must_use]
pub fn functions(interface: InterfaceName) -> Vec<&'static str> {
    SCHEMAS
        .iter()
        .filter(|schema| schema.interface == interface)
        .map(|schema| schema.function)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_interface_has_functions() {
        for interface in InterfaceName::ALL {
            assert!(!functions(interface).is_empty(), "{interface} has no functions");
        }
    }

    #[test]
    fn test_single_file_parser_functions() {
        assert_eq!(
            functions(InterfaceName::SingleFileParser),
            vec![
                "getS3FileType",
                "getResolvedS3FileName",
                "getRecordStartPattern",
                "getRecordEndPattern",
                "parseDocument"
            ]
        );
    }

    #[test]
    fn test_pairs_are_unique() {
        let pairs: HashSet<_> = SCHEMAS.iter().map(|s| (s.interface, s.function)).collect();
        assert_eq!(pairs.len(), SCHEMAS.len());
    }

    #[test]
    fn test_keys_are_unique_per_schema() {
        for schema in SCHEMAS {
            let keys: HashSet<_> = schema.fields.iter().map(|f| f.key).collect();
            assert_eq!(keys.len(), schema.fields.len(), "{}", schema.function);
        }
    }

    #[test]
    fn test_lookup_is_exact() {
        assert!(lookup(InterfaceName::QueueMessageReader, "parseMessage").is_ok());
        assert!(lookup(InterfaceName::KinesisRecordReader, "parseMessage").is_ok());

        let err = lookup(InterfaceName::QueueMessageReader, "parsemessage").unwrap_err();
        assert_eq!(err.error_type(), "UnknownFunctionError");
        assert_eq!(
            err.to_string(),
            "invalid functionName 'parsemessage' for interface QueueMessageReader"
        );

        assert!(lookup(InterfaceName::SparkMapperInterface, "reducer").is_err());
    }

    #[test]
    fn test_reducer_reads_many_uris() {
        let reducer = lookup(InterfaceName::SparkReducerInterface, "reducer").unwrap();
        assert_eq!(
            reducer.field("readUris").map(|f| f.field_type),
            Some(STRING_SEQUENCE)
        );
        assert!(reducer.field("readUri").is_none());
    }
}
