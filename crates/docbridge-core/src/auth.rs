//! Caller auth params carried on every envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;

/// The tenant and dataset an invocation is made on behalf of.
///
/// Reconstructed from every envelope and never cached across invocations.
///
/// # Example
///
/// ```
/// use docbridge_core::AuthParams;
/// use serde_json::json;
///
/// let auth = AuthParams::from_value(&json!({
///     "tenantId": "t-1",
///     "userId": "u-1",
///     "datasetName": "logs",
///     "datasetId": "ds-1"
/// }))
/// .unwrap();
/// assert_eq!(auth.tenant_id, "t-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthParams {
    /// The tenant that owns the dataset.
    pub tenant_id: String,
    /// The user that initiated the work.
    pub user_id: String,
    /// The dataset's display name.
    pub dataset_name: String,
    /// The dataset's identifier.
    pub dataset_id: String,
}

impl AuthParams {
    const KEYS: [&'static str; 4] = ["tenantId", "userId", "datasetName", "datasetId"];

    /// Parses auth params from the envelope's `auth` value.
    ///
    /// All four keys must be present and hold strings. Extra keys are
    /// ignored.
    pub fn from_value(value: &Value) -> Result<Self, BridgeError> {
        let Some(object) = value.as_object() else {
            return Err(BridgeError::missing_auth(format!(
                "invalid auth - expected an object with keys [{}], got {}",
                Self::KEYS.join(", "),
                json_kind(value)
            )));
        };

        let field = |key: &str| -> Result<String, BridgeError> {
            match object.get(key) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(other) => Err(BridgeError::missing_auth(format!(
                    "invalid auth - {key} must be a string, got {}",
                    json_kind(other)
                ))),
                None => Err(BridgeError::missing_auth(format!(
                    "invalid auth - missing {key}, requires keys [{}]",
                    Self::KEYS.join(", ")
                ))),
            }
        };

        Ok(Self {
            tenant_id: field("tenantId")?,
            user_id: field("userId")?,
            dataset_name: field("datasetName")?,
            dataset_id: field("datasetId")?,
        })
    }
}

/// Returns a short name for the JSON kind of a value, for error messages.
#[must_use]
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
