//! Schema building blocks.

use docbridge_core::InterfaceName;
use std::fmt;

/// The JSON shape a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// A JSON string.
    String,
    /// A JSON number with an exact `i64` value.
    Integer,
    /// Any JSON object.
    Mapping,
    /// A JSON array whose elements all have the given type.
    Sequence(&'static FieldType),
    /// A JSON object with an exact nested key set.
    Object(&'static [FieldSpec]),
}

impl FieldType {
    /// Returns the name used in validation messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Mapping | Self::Object(_) => "mapping",
            Self::Sequence(_) => "sequence",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence(element) => write!(f, "sequence<{element}>"),
            other => f.write_str(other.name()),
        }
    }
}

/// Whether a key must be present and whether its value may be null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Key must be present with a non-null value.
    Required,
    /// Key may be absent; if present it must type-check.
    Optional,
    /// Key must be present; its value may be null.
    Nullable,
}

/// One key of a payload schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// The key in the `data` object.
    pub key: &'static str,
    /// The expected value type.
    pub field_type: FieldType,
    /// Presence rule.
    pub presence: Presence,
}

impl FieldSpec {
    /// A key that must be present with a non-null value.
    #[must_use]
    pub const fn required(key: &'static str, field_type: FieldType) -> Self {
        Self {
            key,
            field_type,
            presence: Presence::Required,
        }
    }

    /// A key that may be absent.
    #[must_use]
    pub const fn optional(key: &'static str, field_type: FieldType) -> Self {
        Self {
            key,
            field_type,
            presence: Presence::Optional,
        }
    }

    /// A key that must be present but may hold null.
    #[must_use]
    pub const fn nullable(key: &'static str, field_type: FieldType) -> Self {
        Self {
            key,
            field_type,
            presence: Presence::Nullable,
        }
    }

    /// Returns `true` unless the key may be absent.
    #[must_use]
    pub const fn is_mandatory(&self) -> bool {
        !matches!(self.presence, Presence::Optional)
    }
}

/// The payload schema of one `(interface, function)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSchema {
    /// Interface the function belongs to.
    pub interface: InterfaceName,
    /// Function name, matched exactly.
    pub function: &'static str,
    /// Exact key set of `data`.
    pub fields: &'static [FieldSpec],
}

impl FunctionSchema {
    /// Returns the keys that must be present, in declaration order.
    pub fn mandatory_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|field| field.is_mandatory())
            .map(|field| field.key)
    }

    /// Returns the keys that may be absent, in declaration order.
    pub fn optional_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .filter(|field| !field.is_mandatory())
            .map(|field| field.key)
    }

    /// Looks up the field declared for a top-level key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Describes the expected `data` shape.
    ///
    /// The text mirrors what callers see in a failed invocation, for example
    /// `"invalid data - SingleFileParser.getRecordStartPattern requires data keys [s3FileType]"`.
    #[must_use]
    pub fn describe(&self) -> String {
        let qualified = format!("{}.{}", self.interface, self.function);
        if self.fields.is_empty() {
            return format!("invalid data - {qualified} requires empty data");
        }

        let mandatory: Vec<&str> = self.mandatory_keys().collect();
        let optional: Vec<&str> = self.optional_keys().collect();
        let mut text = format!(
            "invalid data - {qualified} requires data keys [{}]",
            mandatory.join(", ")
        );
        if !optional.is_empty() {
            text.push_str(&format!(" and optionally [{}]", optional.join(", ")));
        }
        text
    }
}
