//! The document taxonomy every handler result conforms to.
//!
//! A record can be parsed into a plain [`Document`] or a [`SingleDoc`], fail
//! with byte-exact offsets as an [`ErrorDoc`], be intentionally excluded as a
//! [`SkipDoc`], or be the join of several single-record parses as a
//! [`CompositeDoc`]. The variants form a closed enum so every consumer
//! matches them exhaustively.
//!
//! Serialized forms use the attribute names the orchestrating platform reads:
//!
//! | Variant | Attributes |
//! |---|---|
//! | `Document`, `SingleDoc` | `documentType`, `documentId`, `recordType`, `partitionKey`, `documentMetadata`, `documentKeyValuesMap` |
//! | `ErrorDoc` | the above plus `errorStartoffsetMap`, `errorEndoffsetMap`, `errorMessage` |
//! | `SkipDoc` | the above plus `errorStartoffsetMap`, `errorEndoffsetMap`, `skipMessage` |
//! | `CompositeDoc` | the base attributes plus `document`, `errorDocList` |
//!
//! # Example
//!
//! ```
//! use docbridge_core::{Document, DocumentFields, DocumentType, ErrorDoc, RecordOffsets};
//!
//! let offsets = RecordOffsets::single("DATALOG", 100, 200);
//! let doc: Document = ErrorDoc::new(DocumentFields::default(), offsets, "bad record").into();
//!
//! assert_eq!(doc.document_type(), DocumentType::ErrorDoc);
//! let json = serde_json::to_value(&doc).unwrap();
//! assert_eq!(json["errorStartoffsetMap"]["DATALOG"], "100");
//! ```

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::ModelError;

/// Discriminant of a [`Document`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DocumentType {
    /// A document joined from several single-record parses.
    CompositeDoc,
    /// A generic extracted record.
    Document,
    /// A record that failed parsing.
    ErrorDoc,
    /// A document derived from exactly one input record.
    SingleDoc,
    /// A record intentionally excluded from output.
    SkipDoc,
}

impl DocumentType {
    /// Returns the variant name as serialized.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CompositeDoc => "CompositeDoc",
            Self::Document => "Document",
            Self::ErrorDoc => "ErrorDoc",
            Self::SingleDoc => "SingleDoc",
            Self::SkipDoc => "SkipDoc",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes shared by every document variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFields {
    /// Identifier of the document.
    pub document_id: String,
    /// Logical record type of the document.
    pub record_type: String,
    /// Partition key the platform writes the document under.
    pub partition_key: String,
    /// Free-form metadata.
    pub document_metadata: Map<String, Value>,
    /// The serializable payload of the document.
    pub document_key_values_map: Map<String, Value>,
}

impl DocumentFields {
    /// Creates fields with empty metadata and payload.
    #[must_use]
    pub fn new(
        document_id: impl Into<String>,
        record_type: impl Into<String>,
        partition_key: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            record_type: record_type.into(),
            partition_key: partition_key.into(),
            document_metadata: Map::new(),
            document_key_values_map: Map::new(),
        }
    }

    /// Replaces the metadata mapping.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.document_metadata = metadata;
        self
    }

    /// Replaces the key/value payload.
    #[must_use]
    pub fn with_key_values(mut self, key_values: Map<String, Value>) -> Self {
        self.document_key_values_map = key_values;
        self
    }

    /// Adds one entry to the key/value payload.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.document_key_values_map.insert(key.into(), value.into());
        self
    }
}

/// Start and end byte offsets of a record, keyed by logical file type.
///
/// Both maps always have the same key set: the file types involved in
/// producing the record. Offsets are kept as decimal strings, the form the
/// platform persists them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordOffsets {
    #[serde(rename = "errorStartoffsetMap")]
    start: BTreeMap<String, String>,
    #[serde(rename = "errorEndoffsetMap")]
    end: BTreeMap<String, String>,
}

impl RecordOffsets {
    /// Creates offsets from start and end maps.
    ///
    /// Fails with [`ModelError::OffsetKeyMismatch`] if the maps are keyed by
    /// different file types.
    pub fn new(
        start: BTreeMap<String, String>,
        end: BTreeMap<String, String>,
    ) -> Result<Self, ModelError> {
        if !start.keys().eq(end.keys()) {
            return Err(ModelError::OffsetKeyMismatch {
                start: start.keys().cloned().collect(),
                end: end.keys().cloned().collect(),
            });
        }
        Ok(Self { start, end })
    }

    /// Creates offsets for a record read from one file type.
    #[must_use]
    pub fn single(file_type: impl Into<String>, start: u64, end: u64) -> Self {
        let file_type = file_type.into();
        Self {
            start: BTreeMap::from([(file_type.clone(), start.to_string())]),
            end: BTreeMap::from([(file_type, end.to_string())]),
        }
    }

    /// Adds a file type's byte range.
    #[must_use]
    pub fn with_range(mut self, file_type: impl Into<String>, start: u64, end: u64) -> Self {
        let file_type = file_type.into();
        self.start.insert(file_type.clone(), start.to_string());
        self.end.insert(file_type, end.to_string());
        self
    }

    /// Returns the start-offset map.
    #[must_use]
    pub const fn start(&self) -> &BTreeMap<String, String> {
        &self.start
    }

    /// Returns the end-offset map.
    #[must_use]
    pub const fn end(&self) -> &BTreeMap<String, String> {
        &self.end
    }

    /// Returns the file types the offsets are keyed by.
    pub fn file_types(&self) -> impl Iterator<Item = &str> {
        self.start.keys().map(String::as_str)
    }
}

/// A document derived from exactly one input record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SingleDoc {
    fields: DocumentFields,
}

impl SingleDoc {
    /// Creates a single-record document.
    #[must_use]
    pub const fn new(fields: DocumentFields) -> Self {
        Self { fields }
    }

    /// Returns the document's attributes.
    #[must_use]
    pub const fn fields(&self) -> &DocumentFields {
        &self.fields
    }

    /// Consumes the document, returning its attributes.
    #[must_use]
    pub fn into_fields(self) -> DocumentFields {
        self.fields
    }
}

/// A record that failed parsing, with the byte ranges it spanned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDoc {
    #[serde(flatten)]
    fields: DocumentFields,
    #[serde(flatten)]
    offsets: RecordOffsets,
    error_message: String,
}

impl ErrorDoc {
    /// Creates an error document.
    #[must_use]
    pub fn new(fields: DocumentFields, offsets: RecordOffsets, message: impl Into<String>) -> Self {
        Self {
            fields,
            offsets,
            error_message: message.into(),
        }
    }

    /// Creates an error document from raw offset maps.
    pub fn from_offset_maps(
        fields: DocumentFields,
        start: BTreeMap<String, String>,
        end: BTreeMap<String, String>,
        message: impl Into<String>,
    ) -> Result<Self, ModelError> {
        Ok(Self::new(fields, RecordOffsets::new(start, end)?, message))
    }

    /// Returns the document's attributes.
    #[must_use]
    pub const fn fields(&self) -> &DocumentFields {
        &self.fields
    }

    /// Returns the offsets of the failed record.
    #[must_use]
    pub const fn offsets(&self) -> &RecordOffsets {
        &self.offsets
    }

    /// Returns the error message.
    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

/// A record intentionally excluded from output.
///
/// Structurally identical to [`ErrorDoc`]; the skip is not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipDoc {
    #[serde(flatten)]
    fields: DocumentFields,
    #[serde(flatten)]
    offsets: RecordOffsets,
    skip_message: String,
}

impl SkipDoc {
    /// Creates a skip document.
    #[must_use]
    pub fn new(fields: DocumentFields, offsets: RecordOffsets, message: impl Into<String>) -> Self {
        Self {
            fields,
            offsets,
            skip_message: message.into(),
        }
    }

    /// Creates a skip document from raw offset maps.
    pub fn from_offset_maps(
        fields: DocumentFields,
        start: BTreeMap<String, String>,
        end: BTreeMap<String, String>,
        message: impl Into<String>,
    ) -> Result<Self, ModelError> {
        Ok(Self::new(fields, RecordOffsets::new(start, end)?, message))
    }

    /// Returns the document's attributes.
    #[must_use]
    pub const fn fields(&self) -> &DocumentFields {
        &self.fields
    }

    /// Returns the offsets of the skipped record.
    #[must_use]
    pub const fn offsets(&self) -> &RecordOffsets {
        &self.offsets
    }

    /// Returns the reason the record was skipped.
    #[must_use]
    pub fn skip_message(&self) -> &str {
        &self.skip_message
    }
}

/// A record built by joining several single-record inputs.
///
/// Carries the joined [`SingleDoc`] and the [`ErrorDoc`]s of the inputs that
/// did not make it into the join. A non-empty error list is still a
/// structurally successful result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeDoc {
    #[serde(flatten)]
    fields: DocumentFields,
    #[serde(serialize_with = "serialize_single_doc")]
    document: SingleDoc,
    #[serde(serialize_with = "serialize_error_docs")]
    error_doc_list: Vec<ErrorDoc>,
}

impl CompositeDoc {
    /// Creates a composite document.
    ///
    /// The composite's key/value payload is the joined document's payload.
    #[must_use]
    pub fn new(
        document_id: impl Into<String>,
        record_type: impl Into<String>,
        partition_key: impl Into<String>,
        document_metadata: Map<String, Value>,
        document: SingleDoc,
        error_docs: Vec<ErrorDoc>,
    ) -> Self {
        let fields = DocumentFields::new(document_id, record_type, partition_key)
            .with_metadata(document_metadata)
            .with_key_values(document.fields().document_key_values_map.clone());
        Self {
            fields,
            document,
            error_doc_list: error_docs,
        }
    }

    /// Returns the composite's own attributes.
    #[must_use]
    pub const fn fields(&self) -> &DocumentFields {
        &self.fields
    }

    /// Returns the joined document and the partial-failure list, exactly as
    /// constructed.
    #[must_use]
    pub fn document_list(&self) -> (&SingleDoc, &[ErrorDoc]) {
        (&self.document, &self.error_doc_list)
    }

    /// Consumes the composite, returning the joined document and the
    /// partial-failure list.
    #[must_use]
    pub fn into_document_list(self) -> (SingleDoc, Vec<ErrorDoc>) {
        (self.document, self.error_doc_list)
    }

    /// Returns `true` if any input failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.error_doc_list.is_empty()
    }
}

/// The polymorphic outcome of parsing one logical record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "documentType")]
pub enum Document {
    /// A generic extracted record.
    #[serde(rename = "Document")]
    Plain(DocumentFields),
    /// A document derived from exactly one input record.
    SingleDoc(SingleDoc),
    /// A record that failed parsing.
    ErrorDoc(ErrorDoc),
    /// A record intentionally excluded from output.
    SkipDoc(SkipDoc),
    /// A record joined from several single-record inputs.
    CompositeDoc(CompositeDoc),
}

impl Document {
    /// Returns the variant's discriminant.
    #[must_use]
    pub const fn document_type(&self) -> DocumentType {
        match self {
            Self::Plain(_) => DocumentType::Document,
            Self::SingleDoc(_) => DocumentType::SingleDoc,
            Self::ErrorDoc(_) => DocumentType::ErrorDoc,
            Self::SkipDoc(_) => DocumentType::SkipDoc,
            Self::CompositeDoc(_) => DocumentType::CompositeDoc,
        }
    }

    /// Returns the attributes shared by every variant.
    #[must_use]
    pub const fn fields(&self) -> &DocumentFields {
        match self {
            Self::Plain(fields) => fields,
            Self::SingleDoc(doc) => doc.fields(),
            Self::ErrorDoc(doc) => doc.fields(),
            Self::SkipDoc(doc) => doc.fields(),
            Self::CompositeDoc(doc) => doc.fields(),
        }
    }

    /// Returns the document id.
    #[must_use]
    pub fn document_id(&self) -> &str {
        &self.fields().document_id
    }

    /// Returns `true` if this is an [`ErrorDoc`] or a [`CompositeDoc`]
    /// carrying at least one.
    #[must_use]
    pub fn contains_error(&self) -> bool {
        match self {
            Self::ErrorDoc(_) => true,
            Self::CompositeDoc(doc) => doc.has_errors(),
            Self::Plain(_) | Self::SingleDoc(_) | Self::SkipDoc(_) => false,
        }
    }
}

impl From<DocumentFields> for Document {
    fn from(fields: DocumentFields) -> Self {
        Self::Plain(fields)
    }
}

impl From<SingleDoc> for Document {
    fn from(doc: SingleDoc) -> Self {
        Self::SingleDoc(doc)
    }
}

impl From<ErrorDoc> for Document {
    fn from(doc: ErrorDoc) -> Self {
        Self::ErrorDoc(doc)
    }
}

impl From<SkipDoc> for Document {
    fn from(doc: SkipDoc) -> Self {
        Self::SkipDoc(doc)
    }
}

impl From<CompositeDoc> for Document {
    fn from(doc: CompositeDoc) -> Self {
        Self::CompositeDoc(doc)
    }
}

// Nested documents inside a composite carry their own documentType tag.
#[derive(Serialize)]
#[serde(tag = "documentType")]
enum TaggedRef<'a> {
    SingleDoc(&'a SingleDoc),
    ErrorDoc(&'a ErrorDoc),
}

fn serialize_single_doc<S: Serializer>(doc: &SingleDoc, serializer: S) -> Result<S::Ok, S::Error> {
    TaggedRef::SingleDoc(doc).serialize(serializer)
}

fn serialize_error_docs<S: Serializer>(
    docs: &[ErrorDoc],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(docs.iter().map(TaggedRef::ErrorDoc))
}
