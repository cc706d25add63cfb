//! Conversion of handler results into JSON-safe values.
//!
//! Every result type derives `Serialize` with the wire attribute names, so a
//! single serde pass flattens any document variant, parse result or status
//! without per-type marshaling code. The document taxonomy is a closed enum,
//! so adding a variant is checked at compile time rather than discovered by
//! inspecting attributes at runtime.

use docbridge_core::{BridgeError, BridgeResult};
use serde::Serialize;
use serde_json::Value;

/// Converts a value into a JSON-safe structure.
///
/// Primitives pass through unchanged and structured values become plain
/// mappings and sequences. Marshaling the same value twice yields identical
/// output.
///
/// # Errors
///
/// Returns `NotSerializableError` if the value cannot be represented as
/// JSON, e.g. a map with non-string keys.
///
/// # Example
///
/// ```
/// use docbridge::to_json_safe;
/// use docbridge_core::RecordParseHint;
/// use serde_json::json;
///
/// let value = to_json_safe(&RecordParseHint::offset_hint(64)).unwrap();
/// assert_eq!(value, json!({"recordHintType": "OFFSET", "pattern": null, "offset": 64}));
/// ```
pub fn to_json_safe<T: Serialize + ?Sized>(value: &T) -> BridgeResult<Value> {
    serde_json::to_value(value).map_err(|e| BridgeError::not_serializable(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HandlerOutput;
    use docbridge_core::{
        CompositeDoc, Document, DocumentFields, ErrorDoc, ParseDocumentResult, RecordOffsets,
        SingleDoc,
    };
    use serde_json::{json, Map};
    use std::collections::HashMap;

    #[test]
    fn test_primitives_pass_through() {
        assert_eq!(to_json_safe("text").unwrap(), json!("text"));
        assert_eq!(to_json_safe(&42).unwrap(), json!(42));
        assert_eq!(to_json_safe(&true).unwrap(), json!(true));
        assert_eq!(to_json_safe(&()).unwrap(), Value::Null);
    }

    #[test]
    fn test_status_marshals_to_name() {
        let result = ParseDocumentResult::success(DocumentFields::new("d1", "Record", "p1"));
        let value = to_json_safe(&HandlerOutput::Parsed(result)).unwrap();
        assert_eq!(value["status"], "SUCCESS");
        assert_eq!(value["document"]["documentId"], "d1");
    }

    #[test]
    fn test_composite_marshals_nested_documents() {
        let single = SingleDoc::new(DocumentFields::new("d1", "Record", "p1"));
        let error = ErrorDoc::new(
            DocumentFields::new("e1", "Record", "p1"),
            RecordOffsets::single("DATALOG", 100, 200),
            "bad record",
        );
        let composite = CompositeDoc::new("c1", "Joined", "p1", Map::new(), single, vec![error]);
        let value = to_json_safe(&Document::from(composite)).unwrap();

        assert_eq!(value["documentType"], "CompositeDoc");
        assert_eq!(value["document"]["documentId"], "d1");
        assert_eq!(value["errorDocList"][0]["errorMessage"], "bad record");
        assert_eq!(value["errorDocList"][0]["errorStartoffsetMap"]["DATALOG"], "100");
    }

    #[test]
    fn test_idempotent() {
        let doc = Document::from(DocumentFields::new("d1", "Record", "p1").with_value("n", 1));
        let first = serde_json::to_string(&to_json_safe(&doc).unwrap()).unwrap();
        let second = serde_json::to_string(&to_json_safe(&doc).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_string_keys_are_not_serializable() {
        let mut map = HashMap::new();
        map.insert((1, 2), "pair");
        let err = to_json_safe(&map).unwrap_err();
        assert_eq!(err.error_type(), "NotSerializableError");
        assert!(err.to_string().starts_with("result is not serializable: "));
    }
}
