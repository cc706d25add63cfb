//! Record boundary hints.

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::fmt;

use crate::error::ModelError;

/// How a record boundary is located in a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordHintType {
    /// The boundary is a fixed byte offset.
    Offset,
    /// The boundary is the next match of a literal pattern.
    Pattern,
}

impl RecordHintType {
    /// Returns the serialized name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Offset => "OFFSET",
            Self::Pattern => "PATTERN",
        }
    }
}

impl fmt::Display for RecordHintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pattern- or offset-based record delimiter.
///
/// The platform scans files with these before it calls `parseDocument`.
/// Asking for the field of the other variant is a contract violation and
/// returns [`ModelError::HintAccessor`].
///
/// Serializes flat with all three keys present, the unused one as `null`:
/// `{"recordHintType": "OFFSET", "pattern": null, "offset": 64}`.
///
/// # Example
///
/// ```
/// use docbridge_core::RecordParseHint;
///
/// let hint = RecordParseHint::pattern_hint("{\"event\":");
/// assert_eq!(hint.pattern().unwrap(), "{\"event\":");
/// assert!(hint.offset().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordParseHint {
    /// Match a literal pattern.
    Pattern {
        /// The pattern to match.
        pattern: String,
    },
    /// Use a fixed byte offset.
    Offset {
        /// The byte offset.
        offset: i64,
    },
}

impl RecordParseHint {
    /// Creates a pattern hint.
    #[must_use]
    pub fn pattern_hint(pattern: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
        }
    }

    /// Creates an offset hint.
    #[must_use]
    pub const fn offset_hint(offset: i64) -> Self {
        Self::Offset { offset }
    }

    /// Returns the hint's variant.
    #[must_use]
    pub const fn hint_type(&self) -> RecordHintType {
        match self {
            Self::Pattern { .. } => RecordHintType::Pattern,
            Self::Offset { .. } => RecordHintType::Offset,
        }
    }

    /// Returns the pattern of a `PATTERN` hint.
    pub fn pattern(&self) -> Result<&str, ModelError> {
        match self {
            Self::Pattern { pattern } => Ok(pattern),
            Self::Offset { .. } => Err(ModelError::HintAccessor {
                accessor: "pattern",
                actual: RecordHintType::Offset.as_str(),
            }),
        }
    }

    /// Returns the offset of an `OFFSET` hint.
    pub fn offset(&self) -> Result<i64, ModelError> {
        match self {
            Self::Offset { offset } => Ok(*offset),
            Self::Pattern { .. } => Err(ModelError::HintAccessor {
                accessor: "offset",
                actual: RecordHintType::Pattern.as_str(),
            }),
        }
    }
}

impl Serialize for RecordParseHint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (pattern, offset) = match self {
            Self::Pattern { pattern } => (Some(pattern.as_str()), None),
            Self::Offset { offset } => (None, Some(*offset)),
        };
        let mut state = serializer.serialize_struct("RecordParseHint", 3)?;
        state.serialize_field("recordHintType", &self.hint_type())?;
        state.serialize_field("pattern", &pattern)?;
        state.serialize_field("offset", &offset)?;
        state.end()
    }
}
