//! # Docbridge
//!
//! **A protocol bridge between a generic invocation envelope and typed,
//! pluggable record handlers.**
//!
//! Docbridge receives a loosely-typed envelope naming an interface, a
//! function and a payload, and:
//!
//! - Matches the interface name case-insensitively against the eight
//!   supported interfaces
//! - Validates the payload against the function's declarative schema
//! - Builds a typed request and calls the registered handler
//! - Marshals the handler's result into JSON, or renders the error into the
//!   fixed failure shape
//!
//! ## Architecture
//!
//! ```text
//! event ─▶ Stage ─▶ Envelope ─▶ Router ─▶ ServiceRequest::execute ─▶ to_json_safe ─▶ 200 SUCCESS
//!           │          │          │                │                      │
//!           └──────────┴──────────┴────────────────┴──────────────────────┴─────▶ 500 EXCEPTION
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use docbridge::Bridge;
//! use docbridge_core::fixtures::{self, LineParser};
//! use docbridge_core::{HandlerRegistry, Stage, StageSource};
//! use serde_json::json;
//!
//! let registry = HandlerRegistry::new().with_single_file_parser(LineParser::new("DATALOG"));
//! let bridge = Bridge::new(registry).with_stage_source(StageSource::Fixed(Stage::Prod));
//!
//! let response = bridge.handle(&json!({
//!     "requestId": "r1",
//!     "interface": "singlefileparser",
//!     "function": "parseDocument",
//!     "auth": fixtures::auth_json(),
//!     "data": {
//!         "s3FileType": "DATALOG",
//!         "fileName": "app.log",
//!         "offsetBytes": 4096,
//!         "content": "started\n",
//!         "startIndex": 0,
//!         "endIndex": 8
//!     }
//! }));
//!
//! let value = response.to_value();
//! assert_eq!(value["statusCode"], 200);
//! assert_eq!(value["body"]["data"]["status"], "SUCCESS");
//! assert_eq!(value["body"]["data"]["document"]["documentKeyValuesMap"]["line"], "started");
//! ```

#![doc(html_root_url = "https://docs.rs/docbridge/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bridge;
mod envelope;
mod marshal;
mod request;
pub mod response;
mod router;

pub use bridge::Bridge;
pub use envelope::{Envelope, AUTH_KEY, LEGACY_AUTH_KEY};
pub use marshal::to_json_safe;
pub use request::{
    Call, ExecutionContext, HandlerOutput, KinesisRecord, ParseDocumentRequest, QueueMessage,
    SagemakerVectorsCall, ServiceRequest, SingleFileParserCall, TableItem,
};
pub use response::{InvocationResponse, ResponseBody};
pub use router::route;

// Re-export the workspace crates
pub use docbridge_config as config;
pub use docbridge_core as core;
pub use docbridge_schema as schema;
pub use docbridge_telemetry as telemetry;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
