//! The outcome of a record parse.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::{Document, ErrorDoc, SkipDoc};
use crate::error::ModelError;

/// Status of a [`ParseDocumentResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParseDocumentResultStatus {
    /// The record was parsed.
    Success,
    /// The record failed parsing.
    Error,
    /// The record was intentionally excluded.
    Skip,
}

impl ParseDocumentResultStatus {
    /// Returns the serialized name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::Skip => "SKIP",
        }
    }
}

impl fmt::Display for ParseDocumentResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed document, its status and the record type expected next.
///
/// The status always agrees with the document:
///
/// - `ERROR` carries an [`ErrorDoc`], or a `CompositeDoc` with at least one
/// - `SKIP` carries a [`SkipDoc`]
/// - `SUCCESS` carries anything except a bare `ErrorDoc` or `SkipDoc`
///
/// `nextRecordType` is only meaningful to state-machine readers, where one
/// record determines the pattern of the next.
///
/// # Example
///
/// ```
/// use docbridge_core::{DocumentFields, ParseDocumentResult, ParseDocumentResultStatus};
///
/// let result = ParseDocumentResult::success(DocumentFields::new("d1", "Record", "p1"))
///     .with_next_record_type("Header");
/// assert_eq!(result.status(), ParseDocumentResultStatus::Success);
/// assert_eq!(result.next_record_type(), Some("Header"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseDocumentResult {
    next_record_type: Option<String>,
    document: Document,
    status: ParseDocumentResultStatus,
}

impl ParseDocumentResult {
    /// Creates a result, checking that the status agrees with the document.
    pub fn new(
        next_record_type: Option<String>,
        document: Document,
        status: ParseDocumentResultStatus,
    ) -> Result<Self, ModelError> {
        let consistent = match status {
            ParseDocumentResultStatus::Error => document.contains_error(),
            ParseDocumentResultStatus::Skip => matches!(document, Document::SkipDoc(_)),
            ParseDocumentResultStatus::Success => {
                !matches!(document, Document::ErrorDoc(_) | Document::SkipDoc(_))
            }
        };
        if !consistent {
            return Err(ModelError::StatusMismatch {
                status: status.as_str(),
                document_type: document.document_type().as_str(),
            });
        }
        Ok(Self {
            next_record_type,
            document,
            status,
        })
    }

    /// Creates a `SUCCESS` result.
    ///
    /// Passing an `ErrorDoc` or `SkipDoc` here routes to [`Self::error`] or
    /// [`Self::skip`] so the status stays consistent.
    #[must_use]
    pub fn success(document: impl Into<Document>) -> Self {
        let document = document.into();
        let status = match document {
            Document::ErrorDoc(_) => ParseDocumentResultStatus::Error,
            Document::SkipDoc(_) => ParseDocumentResultStatus::Skip,
            _ => ParseDocumentResultStatus::Success,
        };
        Self {
            next_record_type: None,
            document,
            status,
        }
    }

    /// Creates an `ERROR` result.
    #[must_use]
    pub fn error(document: ErrorDoc) -> Self {
        Self {
            next_record_type: None,
            document: Document::ErrorDoc(document),
            status: ParseDocumentResultStatus::Error,
        }
    }

    /// Creates a `SKIP` result.
    #[must_use]
    pub fn skip(document: SkipDoc) -> Self {
        Self {
            next_record_type: None,
            document: Document::SkipDoc(document),
            status: ParseDocumentResultStatus::Skip,
        }
    }

    /// Sets the record type the next parse should expect.
    #[must_use]
    pub fn with_next_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.next_record_type = Some(record_type.into());
        self
    }

    /// Returns the record type expected next, if any.
    #[must_use]
    pub fn next_record_type(&self) -> Option<&str> {
        self.next_record_type.as_deref()
    }

    /// Returns the parsed document.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> ParseDocumentResultStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{CompositeDoc, DocumentFields, RecordOffsets, SingleDoc};
    use serde_json::{json, Map, Value};

    fn error_doc() -> ErrorDoc {
        ErrorDoc::new(
            DocumentFields::default(),
            RecordOffsets::single("DATALOG", 0, 4),
            "bad",
        )
    }

    fn skip_doc() -> SkipDoc {
        SkipDoc::new(
            DocumentFields::default(),
            RecordOffsets::single("DATALOG", 0, 4),
            "comment line",
        )
    }

    #[test]
    fn test_constructors_set_status() {
        assert_eq!(
            ParseDocumentResult::success(DocumentFields::new("d", "r", "p")).status(),
            ParseDocumentResultStatus::Success
        );
        assert_eq!(
            ParseDocumentResult::error(error_doc()).status(),
            ParseDocumentResultStatus::Error
        );
        assert_eq!(
            ParseDocumentResult::skip(skip_doc()).status(),
            ParseDocumentResultStatus::Skip
        );
        assert_eq!(
            ParseDocumentResult::success(error_doc()).status(),
            ParseDocumentResultStatus::Error
        );
    }

    #[test]
    fn test_new_rejects_inconsistent_status() {
        let plain = Document::from(DocumentFields::new("d", "r", "p"));
        assert!(ParseDocumentResult::new(None, plain.clone(), ParseDocumentResultStatus::Error)
            .is_err());
        assert!(
            ParseDocumentResult::new(None, plain, ParseDocumentResultStatus::Skip).is_err()
        );

        let err = ParseDocumentResult::new(
            None,
            error_doc().into(),
            ParseDocumentResultStatus::Success,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "status SUCCESS is inconsistent with document type ErrorDoc"
        );
    }

    #[test]
    fn test_composite_status_follows_error_list() {
        let with_errors = CompositeDoc::new(
            "c",
            "r",
            "p",
            Map::new(),
            SingleDoc::default(),
            vec![error_doc()],
        );
        assert!(ParseDocumentResult::new(
            None,
            with_errors.clone().into(),
            ParseDocumentResultStatus::Error
        )
        .is_ok());
        assert!(ParseDocumentResult::new(
            None,
            with_errors.into(),
            ParseDocumentResultStatus::Success
        )
        .is_ok());

        let clean = CompositeDoc::new("c", "r", "p", Map::new(), SingleDoc::default(), vec![]);
        assert!(
            ParseDocumentResult::new(None, clean.into(), ParseDocumentResultStatus::Error)
                .is_err()
        );
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(
            ParseDocumentResult::skip(skip_doc()).with_next_record_type("Body"),
        )
        .unwrap();
        assert_eq!(value["status"], json!("SKIP"));
        assert_eq!(value["nextRecordType"], json!("Body"));
        assert_eq!(value["document"]["documentType"], json!("SkipDoc"));

        let value =
            serde_json::to_value(ParseDocumentResult::success(SingleDoc::default())).unwrap();
        assert_eq!(value["nextRecordType"], Value::Null);
        assert_eq!(value.as_object().unwrap().len(), 3);
    }
}
