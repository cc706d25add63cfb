//! # Docbridge Schema
//!
//! Declarative payload schemas for every `(interface, function)` pair and the
//! single generic routine that checks an envelope's `data` against them.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      docbridge-schema                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐   ┌─────────────────┐  │
//! │  │   catalog    │──▶│  validator   │──▶│     Payload     │  │
//! │  │ (per-function│   │ (exact keys, │   │ (typed access   │  │
//! │  │  FieldSpecs) │   │  types, nest)│   │  for builders)  │  │
//! │  └──────────────┘   └──────────────┘   └─────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every violation found in one payload is reported together in a single
//! [`BridgeError::Validation`](docbridge_core::BridgeError::Validation).
//!
//! ## Example
//!
//! ```
//! use docbridge_core::InterfaceName;
//! use docbridge_schema::{catalog, validate};
//! use serde_json::json;
//!
//! let schema = catalog::lookup(InterfaceName::QueueMessageReader, "parseMessage").unwrap();
//! let data = json!({"messageId": "m1", "messageAttributes": {}, "messageBody": "{}"});
//!
//! let payload = validate(schema, Some(&data), None).unwrap();
//! assert_eq!(payload.string("messageId").unwrap(), "m1");
//! assert_eq!(payload.optional_string("messageGroupId").unwrap(), None);
//!
//! let missing = json!({"messageId": "m1", "messageAttributes": {}});
//! assert!(validate(schema, Some(&missing), None).is_err());
//! ```

#![doc(html_root_url = "https://docs.rs/docbridge-schema/0.1.0")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
mod payload;
mod schema;
mod validator;

pub use payload::Payload;
pub use schema::{FieldSpec, FieldType, FunctionSchema, Presence};
pub use validator::{check, validate, Violation, ViolationKind};
