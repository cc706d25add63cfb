//! Typed access to validated payloads.

use docbridge_core::{BridgeError, BridgeResult};
use serde_json::{Map, Value};

/// The `data` object of an envelope after it passed validation.
///
/// Accessors never panic. A key that does not have the requested shape
/// yields [`BridgeError::Internal`], which only happens when a request
/// builder disagrees with its own schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    path: String,
    fields: Map<String, Value>,
}

impl Payload {
    pub(crate) fn new(path: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            path: path.into(),
            fields,
        }
    }

    fn mismatch(&self, key: &str, expected: &str) -> BridgeError {
        BridgeError::internal(format!(
            "validated payload has no {expected} at {}.{key}",
            self.path
        ))
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns a required string.
    pub fn string(&self, key: &str) -> BridgeResult<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| self.mismatch(key, "string"))
    }

    /// Returns a string that may be absent.
    pub fn optional_string(&self, key: &str) -> BridgeResult<Option<&str>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| self.mismatch(key, "string")),
        }
    }

    /// Returns a string whose key is present but whose value may be null.
    pub fn nullable_string(&self, key: &str) -> BridgeResult<Option<&str>> {
        match self.get(key) {
            Some(Value::Null) => Ok(None),
            Some(Value::String(text)) => Ok(Some(text)),
            _ => Err(self.mismatch(key, "nullable string")),
        }
    }

    /// Returns a required integer.
    pub fn integer(&self, key: &str) -> BridgeResult<i64> {
        self.get(key)
            .and_then(Value::as_i64)
            .ok_or_else(|| self.mismatch(key, "integer"))
    }

    /// Returns a required mapping.
    pub fn mapping(&self, key: &str) -> BridgeResult<&Map<String, Value>> {
        self.get(key)
            .and_then(Value::as_object)
            .ok_or_else(|| self.mismatch(key, "mapping"))
    }

    /// Returns a required sequence of strings.
    pub fn string_sequence(&self, key: &str) -> BridgeResult<Vec<String>> {
        self.get(key)
            .and_then(Value::as_array)
            .and_then(|items| {
                items
                    .iter()
                    .map(|item| item.as_str().map(ToString::to_string))
                    .collect::<Option<Vec<_>>>()
            })
            .ok_or_else(|| self.mismatch(key, "sequence<string>"))
    }

    /// Returns a nested object as its own payload.
    pub fn object(&self, key: &str) -> BridgeResult<Self> {
        self.mapping(key)
            .map(|map| Self::new(format!("{}.{key}", self.path), map.clone()))
    }

    /// Returns the raw fields.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns `true` if the payload has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
