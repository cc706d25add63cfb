//! Test fixtures for Docbridge development and testing.
//!
//! This module provides ready-made auth params, small handler
//! implementations and an in-memory secret store that can be used in tests
//! across the workspace.
//!
//! # Example
//!
//! ```
//! use docbridge_core::fixtures;
//!
//! let auth = fixtures::auth_params();
//! assert_eq!(auth.tenant_id, "tenant-1");
//! assert_eq!(fixtures::auth_json()["tenantId"], "tenant-1");
//! ```

use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::auth::AuthParams;
use crate::document::{DocumentFields, ErrorDoc, RecordOffsets, SingleDoc, SkipDoc};
use crate::handler::{HandlerResult, QueueMessageReader, SingleFileParser};
use crate::hint::RecordParseHint;
use crate::result::ParseDocumentResult;
use crate::secrets::SecretStore;

/// Auth params for a test tenant.
#[must_use]
pub fn auth_params() -> AuthParams {
    AuthParams {
        tenant_id: "tenant-1".to_string(),
        user_id: "user-1".to_string(),
        dataset_name: "test-dataset".to_string(),
        dataset_id: "dataset-1".to_string(),
    }
}

/// The JSON form of [`auth_params`], as it appears on an envelope.
#[must_use]
pub fn auth_json() -> Value {
    json!({
        "tenantId": "tenant-1",
        "userId": "user-1",
        "datasetName": "test-dataset",
        "datasetId": "dataset-1"
    })
}

/// A queue reader whose message bodies are JSON documents.
///
/// The body must be an object with string `documentId` and `partitionKey`
/// keys; the whole object becomes the document's key/value payload. An
/// empty body produces an `ERROR` result whose message contains
/// `"empty message body"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBodyQueueReader;

impl JsonBodyQueueReader {
    fn error(message_id: &str, message: String) -> ParseDocumentResult {
        let fields = DocumentFields::new(message_id, "Message", message_id);
        ParseDocumentResult::error(ErrorDoc::new(fields, RecordOffsets::default(), message))
    }
}

impl QueueMessageReader for JsonBodyQueueReader {
    fn parse_message(
        &self,
        message_id: &str,
        _message_group_id: Option<&str>,
        _message_deduplication_id: Option<&str>,
        message_attributes: &Map<String, Value>,
        message_body: &str,
    ) -> HandlerResult<ParseDocumentResult> {
        if message_body.is_empty() {
            return Ok(Self::error(
                message_id,
                format!("empty message body for message {message_id}"),
            ));
        }

        let body = match serde_json::from_str::<Value>(message_body) {
            Ok(Value::Object(body)) => body,
            Ok(_) => {
                return Ok(Self::error(
                    message_id,
                    "message body is not a JSON object".to_string(),
                ))
            }
            Err(e) => return Ok(Self::error(message_id, format!("invalid message body: {e}"))),
        };

        let text = |key: &str| body.get(key).and_then(Value::as_str).map(ToString::to_string);
        let (Some(document_id), Some(partition_key)) = (text("documentId"), text("partitionKey"))
        else {
            return Ok(Self::error(
                message_id,
                "message body requires string documentId and partitionKey".to_string(),
            ));
        };

        let fields = DocumentFields::new(document_id, "Message", partition_key)
            .with_metadata(message_attributes.clone())
            .with_key_values(body);
        Ok(ParseDocumentResult::success(fields))
    }
}

/// A single-file parser for newline-delimited UTF-8 text.
///
/// Each record becomes a [`SingleDoc`] holding the line. Blank lines are
/// skipped and invalid UTF-8 produces an error document spanning the
/// record's bytes.
#[derive(Debug, Clone)]
pub struct LineParser {
    file_type: String,
}

impl LineParser {
    /// Creates a parser for the given logical file type.
    #[must_use]
    pub fn new(file_type: impl Into<String>) -> Self {
        Self {
            file_type: file_type.into(),
        }
    }
}

impl SingleFileParser for LineParser {
    fn get_s3_file_type(&self) -> HandlerResult<String> {
        Ok(self.file_type.clone())
    }

    fn get_resolved_s3_file_name(
        &self,
        s3_file_type: &str,
        file_name: &str,
    ) -> HandlerResult<String> {
        anyhow::ensure!(
            s3_file_type == self.file_type,
            "unknown file type {s3_file_type}"
        );
        Ok(file_name.to_string())
    }

    fn get_record_start_pattern(&self, _s3_file_type: &str) -> HandlerResult<RecordParseHint> {
        Ok(RecordParseHint::offset_hint(0))
    }

    fn get_record_end_pattern(&self, _s3_file_type: &str) -> HandlerResult<RecordParseHint> {
        Ok(RecordParseHint::pattern_hint("\n"))
    }

    fn parse_document(
        &self,
        s3_file_type: &str,
        file_name: &str,
        offset_bytes: i64,
        content: &[u8],
        start_index: usize,
        end_index: usize,
    ) -> HandlerResult<ParseDocumentResult> {
        let record = content
            .get(start_index..end_index)
            .ok_or_else(|| anyhow::anyhow!("record range {start_index}..{end_index} out of bounds"))?;
        let start = u64::try_from(offset_bytes)?;
        let end = start + u64::try_from(record.len())?;
        let offsets = RecordOffsets::single(s3_file_type, start, end);
        let fields = DocumentFields::new(format!("{file_name}:{start}"), "Line", file_name);

        let Ok(line) = std::str::from_utf8(record) else {
            return Ok(ParseDocumentResult::error(ErrorDoc::new(
                fields,
                offsets,
                "record is not valid UTF-8",
            )));
        };
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Ok(ParseDocumentResult::skip(SkipDoc::new(
                fields,
                offsets,
                "blank line",
            )));
        }

        Ok(ParseDocumentResult::success(SingleDoc::new(
            fields.with_value("line", line),
        )))
    }
}

/// A compute job credentials secret with every phase and side filled in.
///
/// Access key ids are `"<phase>-<side>-key"`, e.g. `"mapper-write-key"`.
#[must_use]
pub fn spark_secret_json() -> String {
    let side = |phase: &str, side: &str| {
        json!({
            "AWS_ACCESS_KEY_ID": format!("{phase}-{side}-key"),
            "AWS_SECRET_ACCESS_KEY": format!("{phase}-{side}-secret"),
            "AWS_SESSION_TOKEN": format!("{phase}-{side}-token")
        })
    };
    json!({
        "mapper": {"read": side("mapper", "read"), "write": side("mapper", "write")},
        "reducer": {"read": side("reducer", "read"), "write": side("reducer", "write")}
    })
    .to_string()
}

/// An in-memory [`SecretStore`] that counts fetches.
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    secrets: HashMap<(String, String), String>,
    fetches: Arc<AtomicUsize>,
}

impl MemorySecretStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a secret.
    #[must_use]
    pub fn with_secret(mut self, region: &str, secret_id: &str, value: &str) -> Self {
        self.secrets.insert(
            (region.to_string(), secret_id.to_string()),
            value.to_string(),
        );
        self
    }

    /// Returns a handle to the number of fetches made so far.
    #[must_use]
    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }
}

impl SecretStore for MemorySecretStore {
    fn fetch(&self, region: &str, secret_id: &str) -> anyhow::Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.secrets
            .get(&(region.to_string(), secret_id.to_string()))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("secret {secret_id} not found in {region}"))
    }
}
