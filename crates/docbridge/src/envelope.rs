//! The inbound invocation envelope.

use docbridge_core::{json_kind, AuthParams, BridgeError, BridgeResult};
use serde_json::{Map, Value};

/// Key of the auth params object.
pub const AUTH_KEY: &str = "auth";

/// Older callers send the auth params under this key.
pub const LEGACY_AUTH_KEY: &str = "letsdataAuth";

/// A parsed invocation envelope.
///
/// Only the top-level shape is checked here. `data` and `batchedData` are
/// kept as raw JSON because their shape depends on the function, and are
/// checked by the schema validator during routing.
///
/// # Example
///
/// ```
/// use docbridge::Envelope;
/// use serde_json::json;
///
/// let envelope = Envelope::from_value(&json!({
///     "requestId": "r1",
///     "interface": "singlefileparser",
///     "function": "getS3FileType",
///     "auth": {
///         "tenantId": "t", "userId": "u", "datasetName": "n", "datasetId": "d"
///     },
///     "traceHeader": "ignored"
/// }))
/// .unwrap();
/// assert_eq!(envelope.request_id, "r1");
/// assert!(envelope.data.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Caller-assigned request ID.
    pub request_id: String,
    /// Interface name as sent, matched case-insensitively during routing.
    pub interface: String,
    /// Function name as sent.
    pub function: String,
    /// Caller auth params.
    pub auth: AuthParams,
    /// The function payload, if any.
    pub data: Option<Value>,
    /// Batched payloads, if any. No current function accepts them.
    pub batched_data: Option<Value>,
}

impl Envelope {
    /// Parses an envelope from an event.
    ///
    /// Unknown top-level keys are ignored. A missing or non-string
    /// `requestId`, `interface` or `function` is a `ValidationError`; absent
    /// or malformed auth params are a `MissingAuthError`.
    pub fn from_value(event: &Value) -> BridgeResult<Self> {
        let Some(object) = event.as_object() else {
            return Err(BridgeError::validation(format!(
                "invalid event - expected a mapping, got {}",
                json_kind(event)
            )));
        };

        let request_id = required_string(object, "requestId")?;
        let interface = required_string(object, "interface")?;
        let function = required_string(object, "function")?;

        let non_null = |key: &str| object.get(key).filter(|value| !value.is_null());
        let auth = match non_null(AUTH_KEY).or_else(|| non_null(LEGACY_AUTH_KEY)) {
            None => {
                return Err(BridgeError::missing_auth(format!(
                    "invalid event - missing {AUTH_KEY}"
                )))
            }
            Some(value) => AuthParams::from_value(value)?,
        };

        Ok(Self {
            request_id,
            interface,
            function,
            auth,
            data: present(object, "data"),
            batched_data: present(object, "batchedData"),
        })
    }
}

fn required_string(object: &Map<String, Value>, key: &str) -> BridgeResult<String> {
    match object.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(BridgeError::validation(format!(
            "invalid event - {key} must be a string, got {}",
            json_kind(other)
        ))),
        None => Err(BridgeError::validation(format!(
            "invalid event - missing {key}"
        ))),
    }
}

fn present(object: &Map<String, Value>, key: &str) -> Option<Value> {
    object.get(key).filter(|value| !value.is_null()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbridge_core::fixtures;
    use serde_json::json;

    fn event() -> Value {
        json!({
            "requestId": "r1",
            "interface": "QueueMessageReader",
            "function": "parseMessage",
            "auth": fixtures::auth_json(),
            "data": {"messageId": "m1"},
            "batchedData": []
        })
    }

    #[test]
    fn test_parse_envelope() {
        let envelope = Envelope::from_value(&event()).unwrap();
        assert_eq!(envelope.interface, "QueueMessageReader");
        assert_eq!(envelope.function, "parseMessage");
        assert_eq!(envelope.auth, fixtures::auth_params());
        assert_eq!(envelope.data, Some(json!({"messageId": "m1"})));
        assert_eq!(envelope.batched_data, Some(json!([])));
    }

    #[test]
    fn test_legacy_auth_key() {
        let mut value = event();
        let auth = value.as_object_mut().unwrap().remove("auth").unwrap();
        value[LEGACY_AUTH_KEY] = auth;
        let envelope = Envelope::from_value(&value).unwrap();
        assert_eq!(envelope.auth.tenant_id, "tenant-1");
    }

    #[test]
    fn test_null_auth_falls_back_to_legacy_key() {
        let mut value = event();
        value[LEGACY_AUTH_KEY] = value["auth"].take();
        assert!(value["auth"].is_null());

        let envelope = Envelope::from_value(&value).unwrap();
        assert_eq!(envelope.auth.dataset_id, "dataset-1");
    }

    #[test]
    fn test_missing_header_fields() {
        for key in ["requestId", "interface", "function"] {
            let mut value = event();
            value.as_object_mut().unwrap().remove(key);
            let err = Envelope::from_value(&value).unwrap_err();
            assert_eq!(err.error_type(), "ValidationError");
            assert_eq!(err.to_string(), format!("invalid event - missing {key}"));
        }

        let mut value = event();
        value["requestId"] = json!(7);
        let err = Envelope::from_value(&value).unwrap_err();
        assert!(err.to_string().contains("requestId must be a string, got integer"));
    }

    #[test]
    fn test_missing_auth() {
        let mut value = event();
        value.as_object_mut().unwrap().remove("auth");
        let err = Envelope::from_value(&value).unwrap_err();
        assert_eq!(err.error_type(), "MissingAuthError");

        value["auth"] = json!(null);
        assert_eq!(
            Envelope::from_value(&value).unwrap_err().error_type(),
            "MissingAuthError"
        );

        value["auth"] = json!({"tenantId": "t"});
        assert_eq!(
            Envelope::from_value(&value).unwrap_err().error_type(),
            "MissingAuthError"
        );
    }

    #[test]
    fn test_null_payloads_are_absent() {
        let mut value = event();
        value["data"] = json!(null);
        value["batchedData"] = json!(null);
        let envelope = Envelope::from_value(&value).unwrap();
        assert!(envelope.data.is_none());
        assert!(envelope.batched_data.is_none());
    }

    #[test]
    fn test_non_object_event() {
        let err = Envelope::from_value(&json!(["r1"])).unwrap_err();
        assert_eq!(err.to_string(), "invalid event - expected a mapping, got sequence");
    }
}
