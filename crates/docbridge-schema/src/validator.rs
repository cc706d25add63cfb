//! The generic payload validator.
//!
//! One routine walks a [`FunctionSchema`] against the envelope's `data` and
//! `batchedData`, collecting every violation instead of stopping at the first.

use docbridge_core::{json_kind, BridgeError, FieldErrors};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

use crate::payload::Payload;
use crate::schema::{FieldSpec, FieldType, FunctionSchema, Presence};

/// What was wrong at a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// A mandatory key is absent.
    MissingKey,
    /// A key not declared by the schema is present.
    UnexpectedKey,
    /// A key that must hold a value holds null.
    NullValue,
    /// The value has the wrong JSON type.
    WrongType {
        /// Expected type, e.g. `sequence<string>`.
        expected: String,
        /// Actual JSON kind.
        actual: &'static str,
    },
    /// `batchedData` is present and non-empty.
    BatchedData,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey => f.write_str("missing required key"),
            Self::UnexpectedKey => f.write_str("unexpected key"),
            Self::NullValue => f.write_str("value must not be null"),
            Self::WrongType { expected, actual } => write!(f, "expected {expected}, got {actual}"),
            Self::BatchedData => f.write_str("batched data is not supported"),
        }
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending value, e.g. `data.data.keys`.
    pub path: String,
    /// What was wrong.
    pub kind: ViolationKind,
}

impl Violation {
    fn new(path: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    fn wrong_type(path: &str, expected: &FieldType, value: &Value) -> Self {
        Self::new(
            path,
            ViolationKind::WrongType {
                expected: expected.to_string(),
                actual: json_kind(value),
            },
        )
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// Returns every violation of `schema` by the given `data` and `batchedData`.
///
/// Absent or null `data` is treated as an empty object and absent, null or
/// empty `batchedData` is accepted.
#[must_use]
pub fn check(
    schema: &FunctionSchema,
    data: Option<&Value>,
    batched_data: Option<&Value>,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    match batched_data {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) if items.is_empty() => {}
        Some(_) => violations.push(Violation::new("batchedData", ViolationKind::BatchedData)),
    }

    let empty = Map::new();
    match data {
        None | Some(Value::Null) => check_object(schema.fields, &empty, "data", &mut violations),
        Some(Value::Object(map)) => check_object(schema.fields, map, "data", &mut violations),
        Some(other) => violations.push(Violation::wrong_type("data", &FieldType::Mapping, other)),
    }

    violations
}

/// Validates `data` and `batchedData` against a function schema.
///
/// # Errors
///
/// Returns [`BridgeError::Validation`] listing every violation, with one
/// field error per offending path and a message describing the expected
/// shape.
pub fn validate(
    schema: &FunctionSchema,
    data: Option<&Value>,
    batched_data: Option<&Value>,
) -> Result<Payload, BridgeError> {
    let violations = check(schema, data, batched_data);

    if violations.is_empty() {
        debug!(
            interface = %schema.interface,
            function = schema.function,
            "payload validated"
        );
        let fields = match data {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        return Ok(Payload::new("data", fields));
    }

    debug!(
        interface = %schema.interface,
        function = schema.function,
        violations = violations.len(),
        "payload rejected"
    );

    let mut field_errors = FieldErrors::new();
    for violation in &violations {
        field_errors.add(violation.path.clone(), violation.kind.to_string());
    }
    let details: Vec<String> = violations.iter().map(ToString::to_string).collect();
    Err(BridgeError::validation_with_fields(
        format!("{} ({})", schema.describe(), details.join("; ")),
        field_errors,
    ))
}

fn check_object(
    fields: &[FieldSpec],
    map: &Map<String, Value>,
    path: &str,
    violations: &mut Vec<Violation>,
) {
    for field in fields {
        let field_path = format!("{path}.{}", field.key);
        match (map.get(field.key), field.presence) {
            (None, Presence::Optional) => {}
            (None, _) => violations.push(Violation::new(field_path, ViolationKind::MissingKey)),
            (Some(Value::Null), Presence::Nullable) => {}
            (Some(Value::Null), Presence::Required) => {
                violations.push(Violation::new(field_path, ViolationKind::NullValue));
            }
            (Some(value), _) => check_value(&field.field_type, value, &field_path, violations),
        }
    }

    for key in map.keys() {
        if !fields.iter().any(|field| field.key == key.as_str()) {
            violations.push(Violation::new(
                format!("{path}.{key}"),
                ViolationKind::UnexpectedKey,
            ));
        }
    }
}

fn check_value(expected: &FieldType, value: &Value, path: &str, violations: &mut Vec<Violation>) {
    match (expected, value) {
        (FieldType::String, Value::String(_)) | (FieldType::Mapping, Value::Object(_)) => {}
        (FieldType::Integer, Value::Number(n)) if n.as_i64().is_some() => {}
        (FieldType::Sequence(element), Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                check_value(element, item, &format!("{path}[{index}]"), violations);
            }
        }
        (FieldType::Object(nested), Value::Object(map)) => {
            check_object(nested, map, path, violations);
        }
        _ => violations.push(Violation::wrong_type(path, expected, value)),
    }
}
