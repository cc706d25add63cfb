//! Error types for Docbridge.
//!
//! This module provides the [`BridgeError`] type, the single error type that
//! flows out of envelope parsing, routing, validation, handler execution and
//! marshaling. It also provides [`ModelError`] for violations of the result
//! model's construction rules.
//!
//! # Error kinds
//!
//! Every [`BridgeError`] has a stable kind name, returned by
//! [`BridgeError::error_type`], which is what the failure response reports
//! as `exception.errorType`:
//!
//! | Variant | `errorType` | Category |
//! |---|---|---|
//! | `Validation` | `ValidationError` | `validation` |
//! | `MissingAuth` | `MissingAuthError` | `validation` |
//! | `UnsupportedInterface` | `UnsupportedInterfaceError` | `routing` |
//! | `UnknownFunction` | `UnknownFunctionError` | `routing` |
//! | `HandlerNotRegistered` | `HandlerNotRegisteredError` | `routing` |
//! | `Handler` | `HandlerError` | `handler` |
//! | `NotSerializable` | `NotSerializableError` | `marshaling` |
//! | `InvalidStage` | `InvalidStageError` | `configuration` |
//! | `Credentials` | `CredentialsError` | `configuration` |
//! | `Internal` | `InternalError` | `internal` |

use crate::interface::InterfaceName;
use crate::secrets::SecretError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use thiserror::Error;

/// Result type alias using [`BridgeError`].
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Categories of errors for classification, logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed or incomplete envelope or payload. Always a caller defect.
    Validation,
    /// The envelope named an interface or function this bridge cannot serve.
    Routing,
    /// The pluggable handler failed.
    Handler,
    /// The handler result could not be flattened to JSON.
    Marshaling,
    /// The process environment is misconfigured.
    Configuration,
    /// An unexpected internal failure.
    Internal,
}

impl ErrorCategory {
    /// Returns the snake_case label used in logs and metric labels.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Routing => "routing",
            Self::Handler => "handler",
            Self::Marshaling => "marshaling",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }

    /// Returns `true` if errors of this category are caused by the caller.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::Validation | Self::Routing)
    }
}

/// Standard error type for Docbridge.
///
/// Nothing in the bridge retries on any of these. They are all caught at the
/// outermost boundary and rendered into the fixed failure response shape.
///
/// # Example
///
/// ```
/// use docbridge_core::{BridgeError, ErrorCategory};
///
/// fn check_body(body: &str) -> Result<(), BridgeError> {
///     if body.is_empty() {
///         return Err(BridgeError::validation("messageBody must not be empty"));
///     }
///     Ok(())
/// }
///
/// let err = check_body("").unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::Validation);
/// assert_eq!(err.error_type(), "ValidationError");
/// ```
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Envelope or payload validation failed.
    #[error("{message}")]
    Validation {
        /// Human-readable description of the expected shape.
        message: String,
        /// Per-field violations, keyed by payload path.
        #[source]
        field_errors: Option<FieldErrors>,
    },

    /// The envelope's auth params were absent or malformed.
    #[error("{message}")]
    MissingAuth {
        /// Human-readable error message.
        message: String,
    },

    /// The envelope named an interface outside the supported set.
    #[error("unsupported interface '{interface}'")]
    UnsupportedInterface {
        /// The interface name as it appeared in the envelope.
        interface: String,
    },

    /// The function is not recognized by the named interface.
    #[error("invalid functionName '{function}' for interface {interface}")]
    UnknownFunction {
        /// The resolved interface.
        interface: InterfaceName,
        /// The function name as it appeared in the envelope.
        function: String,
    },

    /// No handler implementation was registered for the interface.
    #[error("no handler registered for interface {interface}")]
    HandlerNotRegistered {
        /// The interface without a handler.
        interface: InterfaceName,
    },

    /// The pluggable handler returned an error.
    ///
    /// The handler's error is carried unchanged and its message is surfaced
    /// verbatim.
    #[error("{source}")]
    Handler {
        /// The interface whose handler failed.
        interface: InterfaceName,
        /// The function that was invoked.
        function: &'static str,
        /// The handler's own error.
        #[source]
        source: anyhow::Error,
    },

    /// The handler returned a value that cannot be flattened to JSON.
    #[error("result is not serializable: {message}")]
    NotSerializable {
        /// Human-readable error message.
        message: String,
    },

    /// The stage value in the environment was absent or not recognized.
    #[error("{message}")]
    InvalidStage {
        /// Human-readable error message.
        message: String,
    },

    /// Compute job credentials could not be resolved.
    #[error("{message}")]
    Credentials {
        /// Human-readable error message.
        message: String,
        /// The secret lookup failure, if there was one.
        #[source]
        source: Option<SecretError>,
    },

    /// Internal error.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl BridgeError {
    /// Creates a validation error with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Creates a validation error with field-specific errors.
    #[must_use]
    pub fn validation_with_fields(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }

    /// Creates a missing-auth error.
    #[must_use]
    pub fn missing_auth(message: impl Into<String>) -> Self {
        Self::MissingAuth {
            message: message.into(),
        }
    }

    /// Creates an unsupported-interface error.
    #[must_use]
    pub fn unsupported_interface(interface: impl Into<String>) -> Self {
        Self::UnsupportedInterface {
            interface: interface.into(),
        }
    }

    /// Creates an unknown-function error.
    #[must_use]
    pub fn unknown_function(interface: InterfaceName, function: impl Into<String>) -> Self {
        Self::UnknownFunction {
            interface,
            function: function.into(),
        }
    }

    /// Wraps a handler failure without translating it.
    pub fn handler(
        interface: InterfaceName,
        function: &'static str,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Handler {
            interface,
            function,
            source: source.into(),
        }
    }

    /// Creates a not-serializable error.
    #[must_use]
    pub fn not_serializable(message: impl Into<String>) -> Self {
        Self::NotSerializable {
            message: message.into(),
        }
    }

    /// Creates an invalid-stage error.
    #[must_use]
    pub fn invalid_stage(message: impl Into<String>) -> Self {
        Self::InvalidStage {
            message: message.into(),
        }
    }

    /// Creates a credentials error.
    #[must_use]
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a credentials error caused by a failed secret lookup.
    #[must_use]
    pub fn credentials_with_source(message: impl Into<String>, source: SecretError) -> Self {
        Self::Credentials {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::MissingAuth { .. } => ErrorCategory::Validation,
            Self::UnsupportedInterface { .. }
            | Self::UnknownFunction { .. }
            | Self::HandlerNotRegistered { .. } => ErrorCategory::Routing,
            Self::Handler { .. } => ErrorCategory::Handler,
            Self::NotSerializable { .. } => ErrorCategory::Marshaling,
            Self::InvalidStage { .. } | Self::Credentials { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the kind name reported as `exception.errorType`.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "ValidationError",
            Self::MissingAuth { .. } => "MissingAuthError",
            Self::UnsupportedInterface { .. } => "UnsupportedInterfaceError",
            Self::UnknownFunction { .. } => "UnknownFunctionError",
            Self::HandlerNotRegistered { .. } => "HandlerNotRegisteredError",
            Self::Handler { .. } => "HandlerError",
            Self::NotSerializable { .. } => "NotSerializableError",
            Self::InvalidStage { .. } => "InvalidStageError",
            Self::Credentials { .. } => "CredentialsError",
            Self::Internal { .. } => "InternalError",
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::MissingAuth { .. } => "MISSING_AUTH",
            Self::UnsupportedInterface { .. } => "UNSUPPORTED_INTERFACE",
            Self::UnknownFunction { .. } => "UNKNOWN_FUNCTION",
            Self::HandlerNotRegistered { .. } => "HANDLER_NOT_REGISTERED",
            Self::Handler { .. } => "HANDLER_ERROR",
            Self::NotSerializable { .. } => "NOT_SERIALIZABLE",
            Self::InvalidStage { .. } => "INVALID_STAGE",
            Self::Credentials { .. } => "CREDENTIALS_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns the per-field violations of a validation error.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation {
                field_errors: Some(errors),
                ..
            } => Some(errors),
            _ => None,
        }
    }

    /// Renders this error and its full source chain.
    ///
    /// Rust errors carry no stack; the chain of causes is the closest
    /// equivalent and is what the failure response reports as `stackTrace`.
    #[must_use]
    pub fn render_chain(&self) -> String {
        let mut last = self.to_string();
        let mut out = format!("{}: {last}", self.error_type());
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let rendered = cause.to_string();
            if rendered != last {
                let _ = write!(out, "\ncaused by: {rendered}");
                last = rendered;
            }
            source = cause.source();
        }
        if let Some(errors) = self.field_errors() {
            for (field, messages) in &errors.fields {
                for message in messages {
                    let _ = write!(out, "\n  at {field}: {message}");
                }
            }
        }
        out
    }

    /// Converts this error into the serializable exception detail.
    #[must_use]
    pub fn to_exception(&self) -> ExceptionDetail {
        ExceptionDetail {
            error_message: self.to_string(),
            error_type: self.error_type().to_string(),
            stack_trace: self.render_chain(),
        }
    }
}

/// Field-specific validation errors.
///
/// Entries keep insertion order so rendered messages are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{} field violation(s)", .fields.values().map(Vec::len).sum::<usize>())]
pub struct FieldErrors {
    /// Map of field path to list of error messages.
    pub fields: IndexMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Creates a new empty `FieldErrors`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns `true` if there are no field errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields with errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the given field has at least one error.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

/// The `exception` object of a failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetail {
    /// Same text as the top-level `errorMessage`.
    pub error_message: String,
    /// Error kind name, see [`BridgeError::error_type`].
    pub error_type: String,
    /// Rendered error source chain.
    pub stack_trace: String,
}

/// Violations of the result model's construction rules.
///
/// Handlers typically propagate these with `?` into their own error type,
/// where they surface as a [`BridgeError::Handler`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The start and end offset maps were keyed by different file types.
    #[error(
        "offset maps must be keyed by the same file types - start: {start:?}, end: {end:?}"
    )]
    OffsetKeyMismatch {
        /// Keys of the start-offset map.
        start: Vec<String>,
        /// Keys of the end-offset map.
        end: Vec<String>,
    },

    /// A record parse hint accessor was called for the other hint variant.
    #[error("{accessor} - invalid accessor called for recordHintType {actual}")]
    HintAccessor {
        /// The accessor that was called.
        accessor: &'static str,
        /// The hint variant actually held.
        actual: &'static str,
    },

    /// A parse result status disagrees with the document it carries.
    #[error("status {status} is inconsistent with document type {document_type}")]
    StatusMismatch {
        /// The declared status.
        status: &'static str,
        /// The document type carried.
        document_type: &'static str,
    },
}
