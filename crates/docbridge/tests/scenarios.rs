//! End-to-end invocations through `Bridge::handle`.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use docbridge::config::ConfigLoader;
use docbridge::Bridge;
use docbridge_core::fixtures::{self, JsonBodyQueueReader, LineParser, MemorySecretStore};
use docbridge_core::{
    CompositeDoc, Document, DocumentFields, DynamoDbStreamRecord, DynamoDbStreamsRecordReader,
    DynamoDbTableItemReader, ErrorDoc, HandlerRegistry, HandlerResult, KinesisRecordReader,
    ParseDocumentResult, QueueMessageReader, RecordOffsets, SagemakerVectorsInterface, SecretCache,
    SingleDoc, SparkCredentials, SparkMapperInterface, SparkMapperJob, SparkReducerInterface,
    SparkReducerJob, Stage, StageSource,
};
use serde_json::{json, Map, Value};

const SPARK_SECRET_ARN: &str = "arn:aws:secretsmanager:us-east-1:123:secret:spark";

/// Joins a table item with two failed lookups.
struct JoiningTableReader;

impl DynamoDbTableItemReader for JoiningTableReader {
    fn parse_dynamodb_item(
        &self,
        table_name: &str,
        segment_number: i64,
        keys: &Map<String, Value>,
        item: &Map<String, Value>,
    ) -> HandlerResult<ParseDocumentResult> {
        let id = keys["id"].as_str().unwrap_or_default().to_string();
        let single = SingleDoc::new(
            DocumentFields::new(&id, "Item", table_name).with_key_values(item.clone()),
        );
        let errors = (0..2)
            .map(|i| {
                ErrorDoc::new(
                    DocumentFields::new(format!("{id}-lookup-{i}"), "Lookup", table_name),
                    RecordOffsets::single("LOOKUP", i * 10, i * 10 + 10),
                    format!("lookup {i} failed in segment {segment_number}"),
                )
            })
            .collect();
        let composite = CompositeDoc::new(&id, "Joined", table_name, Map::new(), single, errors);
        Ok(ParseDocumentResult::success(composite))
    }
}

/// Builds error offsets from the record's keys, as a handler would.
struct OffsetReportingStreamReader;

impl DynamoDbStreamsRecordReader for OffsetReportingStreamReader {
    fn parse_record(&self, record: &DynamoDbStreamRecord) -> HandlerResult<ParseDocumentResult> {
        let start = BTreeMap::from([("DATALOG".to_string(), "100".to_string())]);
        let end = if record.event_name == "REMOVE" {
            BTreeMap::from([("METADATALOG".to_string(), "200".to_string())])
        } else {
            BTreeMap::from([("DATALOG".to_string(), "200".to_string())])
        };
        let doc = ErrorDoc::from_offset_maps(
            DocumentFields::new(&record.event_id, "Change", &record.shard_id),
            start,
            end,
            "unsupported change",
        )?;
        Ok(ParseDocumentResult::error(doc))
    }
}

struct LengthReader;

impl KinesisRecordReader for LengthReader {
    fn parse_message(
        &self,
        _stream_arn: &str,
        shard_id: &str,
        partition_key: &str,
        sequence_number: &str,
        _approximate_arrival_timestamp: i64,
        data: &[u8],
    ) -> HandlerResult<ParseDocumentResult> {
        let fields = DocumentFields::new(sequence_number, "Event", partition_key)
            .with_value("shard", shard_id)
            .with_value("bytes", data.len());
        Ok(ParseDocumentResult::success(fields).with_next_record_type("Event"))
    }
}

struct WordVectors;

impl SagemakerVectorsInterface for WordVectors {
    fn extract_document_elements_for_vectorization(
        &self,
        document: &Map<String, Value>,
    ) -> HandlerResult<BTreeMap<String, String>> {
        Ok(document
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect())
    }

    fn construct_vector_doc(
        &self,
        document_interface: &Map<String, Value>,
        vectors_map: &Map<String, Value>,
    ) -> HandlerResult<Document> {
        let id = document_interface
            .get("documentId")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow::anyhow!("document has no documentId"))?;
        Ok(DocumentFields::new(id, "Vector", id)
            .with_key_values(vectors_map.clone())
            .into())
    }
}

#[derive(Clone, Default)]
struct CountingJobs {
    runs: Arc<AtomicUsize>,
}

impl SparkMapperInterface for CountingJobs {
    fn mapper(&self, job: &SparkMapperJob, credentials: &SparkCredentials) -> HandlerResult<()> {
        anyhow::ensure!(job.read_uri.starts_with("s3a://"), "readUri must be an s3a URI");
        anyhow::ensure!(
            credentials.read.access_key_id == "mapper-read-key"
                && credentials.write.access_key_id == "mapper-write-key",
            "mapper received the wrong credentials"
        );
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl SparkReducerInterface for CountingJobs {
    fn reducer(&self, job: &SparkReducerJob, credentials: &SparkCredentials) -> HandlerResult<()> {
        anyhow::ensure!(
            credentials.read.session_token == "reducer-read-token"
                && credentials.write.session_token == "reducer-write-token",
            "reducer received the wrong credentials"
        );
        self.runs.fetch_add(job.read_uris.len(), Ordering::SeqCst);
        Ok(())
    }
}

/// Queue reader that counts calls, to prove validation runs first.
#[derive(Clone, Default)]
struct CountingQueueReader {
    calls: Arc<AtomicUsize>,
}

impl QueueMessageReader for CountingQueueReader {
    fn parse_message(
        &self,
        message_id: &str,
        message_group_id: Option<&str>,
        message_deduplication_id: Option<&str>,
        message_attributes: &Map<String, Value>,
        message_body: &str,
    ) -> HandlerResult<ParseDocumentResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        JsonBodyQueueReader.parse_message(
            message_id,
            message_group_id,
            message_deduplication_id,
            message_attributes,
            message_body,
        )
    }
}

fn bridge(registry: HandlerRegistry) -> Bridge {
    Bridge::new(registry).with_stage_source(StageSource::Fixed(Stage::Test))
}

/// A bridge whose secret cache holds the compute job credentials, plus the
/// store's fetch counter.
fn spark_bridge(jobs: &CountingJobs) -> (Bridge, Arc<AtomicUsize>) {
    let store = MemorySecretStore::new().with_secret(
        "us-east-1",
        SPARK_SECRET_ARN,
        &fixtures::spark_secret_json(),
    );
    let fetches = store.fetch_counter();
    let bridge = bridge(full_registry(jobs)).with_secret_cache(SecretCache::new(store));
    (bridge, fetches)
}

fn full_registry(jobs: &CountingJobs) -> HandlerRegistry {
    HandlerRegistry::new()
        .with_single_file_parser(LineParser::new("DATALOG"))
        .with_queue_message_reader(JsonBodyQueueReader)
        .with_kinesis_record_reader(LengthReader)
        .with_sagemaker_vectors(WordVectors)
        .with_dynamodb_streams_reader(OffsetReportingStreamReader)
        .with_dynamodb_table_reader(JoiningTableReader)
        .with_spark_mapper(jobs.clone())
        .with_spark_reducer(jobs.clone())
}

fn event(interface: &str, function: &str, data: Value) -> Value {
    json!({
        "requestId": "req-1",
        "interface": interface,
        "function": function,
        "auth": fixtures::auth_json(),
        "data": data,
        "batchedData": null
    })
}

fn queue_event(data: Value) -> Value {
    event("QueueMessageReader", "parseMessage", data)
}

fn job_data(read_key: &str, read_value: Value) -> Value {
    let mut data = json!({
        "appName": "nightly",
        "readDestination": "S3",
        "readFormat": "json",
        "readOptions": {"multiline": "true"},
        "writeDestination": "S3",
        "writeUri": "s3a://out/",
        "writeFormat": "parquet",
        "writeMode": "overwrite",
        "writeOptions": {},
        "sparkCredentialsSecretArn": SPARK_SECRET_ARN
    });
    data[read_key] = read_value;
    data
}

fn keys(value: &Value) -> BTreeSet<String> {
    value.as_object().unwrap().keys().cloned().collect()
}

#[test]
fn scenario_a_queue_message_success() {
    let response = bridge(full_registry(&CountingJobs::default())).handle(&queue_event(json!({
        "messageId": "m1",
        "messageAttributes": {},
        "messageBody": "{\"documentId\":\"d1\",\"partitionKey\":\"p1\"}"
    })));

    let value = response.to_value();
    assert_eq!(value["statusCode"], 200);
    assert_eq!(value["body"]["statusCode"], "SUCCESS");
    assert_eq!(value["body"]["data"]["status"], "SUCCESS");
    assert_eq!(value["body"]["data"]["document"]["documentId"], "d1");
    assert_eq!(value["body"]["data"]["document"]["partitionKey"], "p1");
}

#[test]
fn scenario_b_empty_message_body() {
    let response = bridge(full_registry(&CountingJobs::default())).handle(&queue_event(json!({
        "messageId": "m1",
        "messageAttributes": {},
        "messageBody": ""
    })));

    assert!(response.is_success());
    let data = response.data().unwrap();
    assert_eq!(data["status"], "ERROR");
    assert_eq!(data["document"]["documentType"], "ErrorDoc");
    assert!(data["document"]["errorMessage"]
        .as_str()
        .unwrap()
        .contains("empty message body"));
}

#[test]
fn scenario_c_missing_body_never_reaches_handler() {
    let reader = CountingQueueReader::default();
    let calls = Arc::clone(&reader.calls);
    let response = bridge(HandlerRegistry::new().with_queue_message_reader(reader)).handle(
        &queue_event(json!({
            "messageId": "m1",
            "messageAttributes": {}
        })),
    );

    let value = response.to_value();
    assert_eq!(value["statusCode"], 500);
    assert_eq!(value["body"]["statusCode"], "EXCEPTION");
    assert_eq!(value["body"]["exception"]["errorType"], "ValidationError");
    let message = value["body"]["errorMessage"].as_str().unwrap();
    assert!(message.starts_with(
        "invalid data - QueueMessageReader.parseMessage requires data keys \
         [messageId, messageAttributes, messageBody]"
    ));
    assert!(message.contains("data.messageBody: missing required key"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn scenario_d_composite_documents_survive_marshaling() {
    let response = bridge(full_registry(&CountingJobs::default())).handle(&event(
        "DynamoDBTableItemReader",
        "parseDynamoDBItem",
        json!({
            "tableName": "orders",
            "segmentNumber": 3,
            "data": {"keys": {"id": "o1"}, "item": {"id": "o1", "total": 12}}
        }),
    ));

    let data = response.data().unwrap();
    assert_eq!(data["status"], "SUCCESS");
    let document = &data["document"];
    assert_eq!(document["documentType"], "CompositeDoc");
    assert_eq!(document["document"]["documentType"], "SingleDoc");
    assert_eq!(document["document"]["documentId"], "o1");
    assert_eq!(document["document"]["documentKeyValuesMap"]["total"], 12);

    let errors = document["errorDocList"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["documentId"], "o1-lookup-0");
    assert_eq!(errors[1]["documentId"], "o1-lookup-1");
    assert_eq!(errors[1]["errorMessage"], "lookup 1 failed in segment 3");
    assert_eq!(errors[1]["errorStartoffsetMap"], json!({"LOOKUP": "10"}));
    assert_eq!(errors[1]["errorEndoffsetMap"], json!({"LOOKUP": "20"}));
}

#[test]
fn scenario_e_offset_key_sets_must_match() {
    let bridge = bridge(full_registry(&CountingJobs::default()));
    let change = |event_name: &str| {
        event(
            "DynamoDBStreamsRecordReader",
            "parseRecord",
            json!({
                "streamArn": "arn:aws:dynamodb:us-east-1:1:table/t/stream/s",
                "shardId": "shard-1",
                "eventId": "e1",
                "eventName": event_name,
                "identityPrincipalId": null,
                "identityType": null,
                "sequenceNumber": "100",
                "sizeBytes": 64,
                "streamViewType": "NEW_IMAGE",
                "approximateCreationDateTime": 1_700_000_000,
                "data": {"keys": {}, "oldImage": {}, "newImage": {}}
            }),
        )
    };

    let response = bridge.handle(&change("MODIFY"));
    let document = &response.data().unwrap()["document"];
    assert_eq!(document["errorStartoffsetMap"], json!({"DATALOG": "100"}));
    assert_eq!(document["errorEndoffsetMap"], json!({"DATALOG": "200"}));

    let response = bridge.handle(&change("REMOVE"));
    let exception = response.exception().unwrap();
    assert_eq!(exception.error_type, "HandlerError");
    assert!(exception
        .error_message
        .starts_with("offset maps must be keyed by the same file types"));
}

#[test]
fn single_file_parser_functions() {
    let bridge = bridge(full_registry(&CountingJobs::default()));

    let response = bridge.handle(&event("SingleFileParser", "getS3FileType", Value::Null));
    assert_eq!(response.data(), Some(&json!("DATALOG")));

    let response = bridge.handle(&event(
        "SingleFileParser",
        "getResolvedS3FileName",
        json!({"s3FileType": "DATALOG", "fileName": "2024/app.log"}),
    ));
    assert_eq!(response.data(), Some(&json!("2024/app.log")));

    let response = bridge.handle(&event(
        "SingleFileParser",
        "getRecordStartPattern",
        json!({"s3FileType": "DATALOG"}),
    ));
    assert_eq!(
        response.data(),
        Some(&json!({"recordHintType": "OFFSET", "pattern": null, "offset": 0}))
    );

    let response = bridge.handle(&event(
        "SingleFileParser",
        "getRecordEndPattern",
        json!({"s3FileType": "DATALOG"}),
    ));
    assert_eq!(
        response.data(),
        Some(&json!({"recordHintType": "PATTERN", "pattern": "\n", "offset": null}))
    );

    let response = bridge.handle(&event(
        "SingleFileParser",
        "parseDocument",
        json!({
            "s3FileType": "DATALOG",
            "fileName": "app.log",
            "offsetBytes": 10,
            "content": "   \n",
            "startIndex": 0,
            "endIndex": 4
        }),
    ));
    let data = response.data().unwrap();
    assert_eq!(data["status"], "SKIP");
    assert_eq!(data["document"]["errorStartoffsetMap"], json!({"DATALOG": "10"}));
    assert_eq!(data["document"]["errorEndoffsetMap"], json!({"DATALOG": "14"}));
}

#[test]
fn kinesis_and_vectors() {
    let bridge = bridge(full_registry(&CountingJobs::default()));

    let response = bridge.handle(&event(
        "kinesisrecordreader",
        "parseMessage",
        json!({
            "streamArn": "arn:aws:kinesis:us-east-1:1:stream/clicks",
            "shardId": "shard-7",
            "partitionKey": "user-9",
            "sequenceNumber": "4955",
            "approximateArrivalTimestamp": 1_700_000_000_000_i64,
            "data": "ünïcode"
        }),
    ));
    let data = response.data().unwrap();
    assert_eq!(data["nextRecordType"], "Event");
    assert_eq!(data["document"]["documentKeyValuesMap"]["bytes"], "ünïcode".len());

    let response = bridge.handle(&event(
        "SagemakerVectorsInterface",
        "extractDocumentElementsForVectorization",
        json!({"document": {"title": "hello", "views": 3}}),
    ));
    assert_eq!(response.data(), Some(&json!({"title": "hello"})));

    let response = bridge.handle(&event(
        "SagemakerVectorsInterface",
        "constructVectorDoc",
        json!({"documentInterface": {"documentId": "d9"}, "vectorsMap": {"title": [0.5, 0.25]}}),
    ));
    let data = response.data().unwrap();
    assert_eq!(data["documentType"], "Document");
    assert_eq!(data["documentKeyValuesMap"]["title"], json!([0.5, 0.25]));

    let response = bridge.handle(&event(
        "SagemakerVectorsInterface",
        "constructVectorDoc",
        json!({"documentInterface": {}, "vectorsMap": {}}),
    ));
    assert_eq!(
        response.exception().unwrap().error_message,
        "document has no documentId"
    );
}

#[test]
fn spark_jobs_return_null() {
    let jobs = CountingJobs::default();
    let (bridge, fetches) = spark_bridge(&jobs);

    let response = bridge.handle(&event(
        "SparkMapperInterface",
        "mapper",
        job_data("readUri", json!("s3a://in/part-0")),
    ));
    assert_eq!(
        response.to_value(),
        json!({"statusCode": 200, "body": {"statusCode": "SUCCESS", "data": null}})
    );

    let response = bridge.handle(&event(
        "SparkReducerInterface",
        "reducer",
        job_data("readUris", json!(["s3a://in/a", "s3a://in/b"])),
    ));
    assert!(response.is_success());
    assert_eq!(jobs.runs.load(Ordering::SeqCst), 3);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    let response = bridge.handle(&event(
        "SparkMapperInterface",
        "mapper",
        job_data("readUri", json!("hdfs://in")),
    ));
    assert_eq!(response.exception().unwrap().error_type, "HandlerError");
}

#[test]
fn spark_credentials_are_fetched_once_across_invocations() {
    let jobs = CountingJobs::default();
    let (bridge, fetches) = spark_bridge(&jobs);
    let mapper = event("SparkMapperInterface", "mapper", job_data("readUri", json!("s3a://in/0")));

    assert!(bridge.handle(&mapper).is_success());
    assert!(bridge.handle(&mapper).is_success());
    assert_eq!(jobs.runs.load(Ordering::SeqCst), 2);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(bridge.secrets().map(SecretCache::len), Some(1));
}

#[test]
fn spark_job_without_secret_cache_is_a_credentials_error() {
    let jobs = CountingJobs::default();
    let response = bridge(full_registry(&jobs)).handle(&event(
        "SparkMapperInterface",
        "mapper",
        job_data("readUri", json!("s3a://in/0")),
    ));

    let exception = response.exception().unwrap();
    assert_eq!(exception.error_type, "CredentialsError");
    assert!(exception.error_message.contains("no secret cache configured"));
    assert_eq!(jobs.runs.load(Ordering::SeqCst), 0);
}

#[test]
fn spark_secret_region_falls_back_to_default() {
    let regionless = "arn:aws:secretsmanager::123:secret:spark";
    let store = MemorySecretStore::new().with_secret(
        "eu-west-1",
        regionless,
        &fixtures::spark_secret_json(),
    );
    let jobs = CountingJobs::default();
    let mut data = job_data("readUri", json!("s3a://in/0"));
    data["sparkCredentialsSecretArn"] = json!(regionless);
    let mapper = event("SparkMapperInterface", "mapper", data);

    let without_region =
        bridge(full_registry(&jobs)).with_secret_cache(SecretCache::new(store.clone()));
    let exception = without_region.handle(&mapper).exception().cloned().unwrap();
    assert_eq!(exception.error_type, "CredentialsError");
    assert!(exception.stack_trace.contains("no default region is configured"));

    let with_region = bridge(full_registry(&jobs))
        .with_secret_cache(SecretCache::new(store))
        .with_default_region("eu-west-1");
    assert!(with_region.handle(&mapper).is_success());
    assert_eq!(jobs.runs.load(Ordering::SeqCst), 1);
}

#[test]
fn failure_shape_is_fixed_for_every_error_kind() {
    let bridge = bridge(HandlerRegistry::new());
    let cases = [
        (
            event("FtpReader", "read", json!({})),
            "UnsupportedInterfaceError",
        ),
        (
            event("SingleFileParser", "parse", json!({})),
            "UnknownFunctionError",
        ),
        (
            event("SingleFileParser", "getS3FileType", json!({"extra": 1})),
            "ValidationError",
        ),
        (
            event("SingleFileParser", "getS3FileType", Value::Null),
            "HandlerNotRegisteredError",
        ),
        (
            json!({"requestId": "r", "interface": "SingleFileParser", "function": "getS3FileType"}),
            "MissingAuthError",
        ),
    ];

    for (event, error_type) in cases {
        let value = bridge.handle(&event).to_value();
        assert_eq!(keys(&value), BTreeSet::from(["body".into(), "statusCode".into()]));
        assert_eq!(value["statusCode"], 500);
        assert_eq!(
            keys(&value["body"]),
            BTreeSet::from(["errorMessage".into(), "exception".into(), "statusCode".into()])
        );
        assert_eq!(value["body"]["exception"]["errorType"], error_type);
        assert_eq!(
            value["body"]["errorMessage"],
            value["body"]["exception"]["errorMessage"]
        );
        assert!(value["body"]["exception"]["stackTrace"]
            .as_str()
            .unwrap()
            .starts_with(error_type));
    }
}

#[test]
fn legacy_auth_key_is_accepted() {
    let mut value = event("SingleFileParser", "getS3FileType", Value::Null);
    let auth = value.as_object_mut().unwrap().remove("auth").unwrap();
    value["letsdataAuth"] = auth;

    let response = bridge(full_registry(&CountingJobs::default())).handle(&value);
    assert!(response.is_success());
}

#[test]
fn bridge_is_shareable_across_threads() {
    let bridge = Arc::new(bridge(full_registry(&CountingJobs::default())));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let bridge = Arc::clone(&bridge);
            std::thread::spawn(move || {
                bridge
                    .handle(&queue_event(json!({
                        "messageId": format!("m{i}"),
                        "messageAttributes": {},
                        "messageBody": format!("{{\"documentId\":\"d{i}\",\"partitionKey\":\"p\"}}")
                    })))
                    .data()
                    .map(|data| data["document"]["documentId"].clone())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(json!(format!("d{i}"))));
    }
}

#[test]
fn stage_pinned_by_config_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[runtime]\nservice_name = \"ingest\"\nstage = \"Prod\"\n").unwrap();
    let config = ConfigLoader::new()
        .with_defaults()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    let bridge = Bridge::from_config(
        HandlerRegistry::new().with_single_file_parser(LineParser::new("DATALOG")),
        &config,
    );
    assert_eq!(bridge.stage_source(), &StageSource::Fixed(Stage::Prod));
    assert!(bridge
        .handle(&event("SingleFileParser", "getS3FileType", Value::Null))
        .is_success());
}
