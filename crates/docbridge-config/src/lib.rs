//! Typed configuration for Docbridge.
//!
//! This crate provides a strongly-typed configuration system with support for:
//! - TOML and JSON configuration files
//! - `.env` files via `dotenvy`
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`BridgeConfig`] holds three sections:
//!
//! - [`RuntimeConfig`] - Service name, stage source and default region
//! - [`LogConfig`](docbridge_telemetry::LogConfig) - Structured logging
//! - [`MetricsConfig`](docbridge_telemetry::MetricsConfig) - Invocation metrics
//!
//! # Example
//!
//! ```no_run
//! use docbridge_config::ConfigLoader;
//!
//! # fn main() -> Result<(), docbridge_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("docbridge.toml")?
//!     .with_env_prefix("DOCBRIDGE")
//!     .load()?;
//!
//! println!("Stage is read from: {}", config.runtime.stage_var);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [runtime]
//! service_name = "ingest-bridge"
//! stage_var = "DOCBRIDGE_STAGE"
//! default_region = "us-east-1"
//!
//! [logging]
//! level = "info"
//! json_format = true
//!
//! [metrics]
//! enabled = true
//! duration_buckets = [0.005, 0.05, 0.5, 5.0]
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden via environment variables using the format
//! `PREFIX__SECTION__KEY`. For example:
//!
//! - `DOCBRIDGE__RUNTIME__STAGE=Prod`
//! - `DOCBRIDGE__LOGGING__LEVEL=debug`
//! - `DOCBRIDGE__METRICS__ENABLED=false`

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod runtime;

pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use error::ConfigError;
pub use loader::{ConfigLoader, ENV_PREFIX};
pub use runtime::RuntimeConfig;
