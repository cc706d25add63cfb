//! The outbound invocation response.
//!
//! Two shapes are produced:
//!
//! ```json
//! {"statusCode": 200, "body": {"statusCode": "SUCCESS", "data": ...}}
//!
//! {"statusCode": 500, "body": {
//!     "statusCode": "EXCEPTION",
//!     "errorMessage": "...",
//!     "exception": {"errorMessage": "...", "errorType": "...", "stackTrace": "..."}
//! }}
//! ```

use docbridge_core::{BridgeError, ExceptionDetail};
use http::StatusCode;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

/// Body status of a successful response.
pub const SUCCESS: &str = "SUCCESS";

/// Body status of a failed response.
pub const EXCEPTION: &str = "EXCEPTION";

/// The body of an [`InvocationResponse`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The handler returned a value.
    Success {
        /// The marshaled result.
        data: Value,
    },
    /// The invocation failed.
    Exception {
        /// Top-level error message.
        error_message: String,
        /// Error kind and source chain.
        exception: ExceptionDetail,
    },
}

/// A response to one invocation.
///
/// # Example
///
/// ```
/// use docbridge::InvocationResponse;
/// use docbridge_core::BridgeError;
/// use serde_json::json;
///
/// let ok = InvocationResponse::success(json!("DATALOG"));
/// assert_eq!(
///     ok.to_value(),
///     json!({"statusCode": 200, "body": {"statusCode": "SUCCESS", "data": "DATALOG"}})
/// );
///
/// let failed = InvocationResponse::failure(&BridgeError::unsupported_interface("FtpReader"));
/// assert_eq!(failed.to_value()["statusCode"], 500);
/// assert_eq!(failed.to_value()["body"]["exception"]["errorType"], "UnsupportedInterfaceError");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationResponse {
    status: StatusCode,
    body: ResponseBody,
}

impl InvocationResponse {
    /// Creates a `200` response carrying marshaled data.
    #[must_use]
    pub fn success(data: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: ResponseBody::Success { data },
        }
    }

    /// Creates a `500` response describing an error.
    ///
    /// Every error kind maps to `500`; callers tell kinds apart by
    /// `exception.errorType`.
    #[must_use]
    pub fn failure(error: &BridgeError) -> Self {
        let exception = error.to_exception();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ResponseBody::Exception {
                error_message: exception.error_message.clone(),
                exception,
            },
        }
    }

    /// Returns the transport status code.
    pub const fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Returns the body.
    pub const fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Returns `true` for a `SUCCESS` body.
    pub const fn is_success(&self) -> bool {
        matches!(self.body, ResponseBody::Success { .. })
    }

    /// Returns the marshaled data of a successful response.
    pub const fn data(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Success { data } => Some(data),
            ResponseBody::Exception { .. } => None,
        }
    }

    /// Returns the exception detail of a failed response.
    pub const fn exception(&self) -> Option<&ExceptionDetail> {
        match &self.body {
            ResponseBody::Success { .. } => None,
            ResponseBody::Exception { exception, .. } => Some(exception),
        }
    }

    /// Renders the response as JSON.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let body = match &self.body {
            ResponseBody::Success { data } => json!({
                "statusCode": SUCCESS,
                "data": data,
            }),
            ResponseBody::Exception {
                error_message,
                exception,
            } => json!({
                "statusCode": EXCEPTION,
                "errorMessage": error_message,
                "exception": {
                    "errorMessage": exception.error_message,
                    "errorType": exception.error_type,
                    "stackTrace": exception.stack_trace,
                },
            }),
        };
        json!({
            "statusCode": self.status.as_u16(),
            "body": body,
        })
    }
}

impl Serialize for InvocationResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
