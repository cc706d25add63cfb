//! Process-wide secret cache.
//!
//! Secrets are fetched from an external [`SecretStore`] at most once per
//! `(region, secret id)` in the common case and kept for the life of the
//! process. The cache is built once at startup and handed to whatever needs
//! credentials; there is no ambient global instance.
//!
//! Concurrent reads go through a sharded concurrent map. Two invocations
//! racing on the same cold key may both fetch; the second write stores an
//! identical value, so no further locking is needed.
//!
//! # Example
//!
//! ```
//! use docbridge_core::{SecretCache, SparkDestination, SparkMethod};
//! use docbridge_core::fixtures::MemorySecretStore;
//!
//! let store = MemorySecretStore::new().with_secret(
//!     "us-east-1",
//!     "creds",
//!     r#"{"mapper": {"read": {
//!         "AWS_ACCESS_KEY_ID": "AKIA", "AWS_SECRET_ACCESS_KEY": "s", "AWS_SESSION_TOKEN": "t"
//!     }}}"#,
//! );
//! let cache = SecretCache::new(store);
//! let creds = cache
//!     .spark_credentials("us-east-1", "creds", SparkMethod::Mapper, SparkDestination::Read)
//!     .unwrap();
//! assert_eq!(creds.access_key_id, "AKIA");
//! ```

use dashmap::DashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::arn::{Arn, ArnError};

/// Errors from secret lookup.
#[derive(Error, Debug)]
pub enum SecretError {
    /// The store failed to return the secret.
    #[error("failed to fetch secret '{secret_id}' in {region}")]
    Fetch {
        /// Region queried.
        region: String,
        /// Secret queried.
        secret_id: String,
        /// The store's error.
        #[source]
        source: anyhow::Error,
    },

    /// The secret value did not have the expected shape.
    #[error("secret '{secret_id}' is malformed: {message}")]
    Malformed {
        /// Secret queried.
        secret_id: String,
        /// What was wrong with it.
        message: String,
    },

    /// Neither the secret ARN nor the caller supplied a region.
    #[error("secret '{secret_id}' has no region and no default region is configured")]
    NoRegion {
        /// Secret queried.
        secret_id: String,
    },

    /// The secret id was not a usable ARN.
    #[error(transparent)]
    Arn(#[from] ArnError),
}

/// External key to secret-string lookup.
pub trait SecretStore: Send + Sync + 'static {
    /// Fetches the secret string for `secret_id` in `region`.
    fn fetch(&self, region: &str, secret_id: &str) -> anyhow::Result<String>;
}

/// Which compute phase credentials are for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SparkMethod {
    /// The map phase.
    Mapper,
    /// The reduce phase.
    Reducer,
}

impl SparkMethod {
    /// Returns the key used in the credentials secret.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mapper => "mapper",
            Self::Reducer => "reducer",
        }
    }
}

/// Which side of a compute job credentials are for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SparkDestination {
    /// Reading input.
    Read,
    /// Writing output.
    Write,
}

impl SparkDestination {
    /// Returns the key used in the credentials secret.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Temporary credentials for a compute job's read or write side.
///
/// `Debug` output redacts the secret parts.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Session token.
    pub session_token: String,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .finish()
    }
}

/// Read and write credentials for one phase of a compute job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparkCredentials {
    /// Credentials for reading the job's input.
    pub read: AwsCredentials,
    /// Credentials for writing the job's output.
    pub write: AwsCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SecretKey {
    region: String,
    secret_id: String,
}

/// Cache of secret strings keyed by `(region, secret id)`.
#[derive(Clone)]
pub struct SecretCache {
    store: Arc<dyn SecretStore>,
    entries: Arc<DashMap<SecretKey, Arc<str>>>,
}

impl SecretCache {
    /// Creates an empty cache backed by `store`.
    #[must_use]
    pub fn new(store: impl SecretStore) -> Self {
        Self {
            store: Arc::new(store),
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Returns the secret string, fetching it on first use.
    pub fn get(&self, region: &str, secret_id: &str) -> Result<Arc<str>, SecretError> {
        let key = SecretKey {
            region: region.to_string(),
            secret_id: secret_id.to_string(),
        };
        if let Some(cached) = self.entries.get(&key) {
            return Ok(Arc::clone(cached.value()));
        }

        debug!(region, secret_id, "fetching secret");
        let value: Arc<str> = self
            .store
            .fetch(region, secret_id)
            .map_err(|source| SecretError::Fetch {
                region: region.to_string(),
                secret_id: secret_id.to_string(),
                source,
            })?
            .into();
        self.entries.insert(key, Arc::clone(&value));
        Ok(value)
    }

    /// Returns the number of cached secrets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns compute job credentials for one phase and side.
    ///
    /// The secret is a JSON object of the form
    /// `{"mapper": {"read": {...}, "write": {...}}, "reducer": {...}}` where
    /// each leaf holds `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
    /// `AWS_SESSION_TOKEN`.
    pub fn spark_credentials(
        &self,
        region: &str,
        secret_id: &str,
        method: SparkMethod,
        destination: SparkDestination,
    ) -> Result<AwsCredentials, SecretError> {
        let raw = self.get(region, secret_id)?;
        let malformed = |message: String| SecretError::Malformed {
            secret_id: secret_id.to_string(),
            message,
        };

        let secret: Value = serde_json::from_str(&raw)
            .map_err(|e| malformed(format!("not valid JSON: {e}")))?;
        let leaf = secret
            .get(method.as_str())
            .and_then(|m| m.get(destination.as_str()))
            .ok_or_else(|| {
                malformed(format!(
                    "missing {}.{} credentials",
                    method.as_str(),
                    destination.as_str()
                ))
            })?;
        let field = |name: &str| {
            leaf.get(name)
                .and_then(Value::as_str)
                .map(ToString::to_string)
                .ok_or_else(|| {
                    malformed(format!(
                        "{}.{}.{name} must be a string",
                        method.as_str(),
                        destination.as_str()
                    ))
                })
        };

        Ok(AwsCredentials {
            access_key_id: field("AWS_ACCESS_KEY_ID")?,
            secret_access_key: field("AWS_SECRET_ACCESS_KEY")?,
            session_token: field("AWS_SESSION_TOKEN")?,
        })
    }

    /// Like [`Self::spark_credentials`], with the region taken from the
    /// secret's ARN.
    pub fn spark_credentials_for_arn(
        &self,
        secret_arn: &str,
        method: SparkMethod,
        destination: SparkDestination,
    ) -> Result<AwsCredentials, SecretError> {
        let arn = Arn::parse(secret_arn)?;
        self.spark_credentials(&arn.region, secret_arn, method, destination)
    }

    /// Returns both sides of a compute phase's credentials.
    ///
    /// The region comes from the ARN, or from `default_region` when the ARN
    /// leaves it empty. Both sides are read from one cached secret.
    pub fn spark_job_credentials(
        &self,
        secret_arn: &str,
        default_region: Option<&str>,
        method: SparkMethod,
    ) -> Result<SparkCredentials, SecretError> {
        let arn = Arn::parse(secret_arn)?;
        let region = match (arn.region.as_str(), default_region) {
            ("", Some(fallback)) if !fallback.is_empty() => fallback,
            ("", _) => {
                return Err(SecretError::NoRegion {
                    secret_id: secret_arn.to_string(),
                })
            }
            (region, _) => region,
        };

        Ok(SparkCredentials {
            read: self.spark_credentials(region, secret_arn, method, SparkDestination::Read)?,
            write: self.spark_credentials(region, secret_arn, method, SparkDestination::Write)?,
        })
    }
}

impl fmt::Debug for SecretCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCache")
            .field("cached", &self.entries.len())
            .finish_non_exhaustive()
    }
}
