//! Resource name helpers used by credential lookup and compute jobs.

use thiserror::Error;

/// Errors from parsing resource names and URIs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArnError {
    /// The string is not a well-formed ARN.
    #[error("invalid ARN '{arn}': {reason}")]
    InvalidArn {
        /// The rejected input.
        arn: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The string is not an `s3a://bucket/...` URI.
    #[error("not a valid S3 URI: {uri}")]
    InvalidS3Uri {
        /// The rejected input.
        uri: String,
    },
}

/// A parsed `arn:partition:service:region:account:resource` name.
///
/// The resource part is split into a type and a name on the first `/` or,
/// failing that, the first `:`.
///
/// # Example
///
/// ```
/// use docbridge_core::Arn;
///
/// let arn = Arn::parse("arn:aws:secretsmanager:us-east-1:123456789012:secret:spark-creds").unwrap();
/// assert_eq!(arn.region, "us-east-1");
/// assert_eq!(arn.resource_type.as_deref(), Some("secret"));
/// assert_eq!(arn.resource, "spark-creds");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    /// Partition, e.g. `aws`.
    pub partition: String,
    /// Service namespace.
    pub service: String,
    /// Region, empty for global resources.
    pub region: String,
    /// Account id.
    pub account: String,
    /// Resource type, if the resource part has one.
    pub resource_type: Option<String>,
    /// Resource name.
    pub resource: String,
}

impl Arn {
    /// Parses an ARN.
    pub fn parse(arn: &str) -> Result<Self, ArnError> {
        let invalid = |reason| ArnError::InvalidArn {
            arn: arn.to_string(),
            reason,
        };

        let parts: Vec<&str> = arn.splitn(6, ':').collect();
        let [prefix, partition, service, region, account, resource] = parts.as_slice() else {
            return Err(invalid("expected 6 ':'-separated parts"));
        };
        if *prefix != "arn" {
            return Err(invalid("must start with 'arn:'"));
        }
        if partition.is_empty() || service.is_empty() {
            return Err(invalid("partition and service must not be empty"));
        }

        let (resource_type, resource) = resource
            .split_once('/')
            .or_else(|| resource.split_once(':'))
            .map_or((None, *resource), |(kind, name)| (Some(kind.to_string()), name));

        Ok(Self {
            partition: (*partition).to_string(),
            service: (*service).to_string(),
            region: (*region).to_string(),
            account: (*account).to_string(),
            resource_type,
            resource: resource.to_string(),
        })
    }
}

/// Returns the bucket name of an `s3a://bucket/key` URI.
///
/// # Example
///
/// ```
/// use docbridge_core::s3a_bucket_name;
///
/// assert_eq!(s3a_bucket_name("s3a://logs-bucket/2024/01/").unwrap(), "logs-bucket");
/// assert!(s3a_bucket_name("s3://logs-bucket/").is_err());
/// ```
pub fn s3a_bucket_name(uri: &str) -> Result<&str, ArnError> {
    uri.strip_prefix("s3a://")
        .map(|rest| rest.split(['/', '?', '#']).next().unwrap_or_default())
        .filter(|bucket| !bucket.is_empty())
        .ok_or_else(|| ArnError::InvalidS3Uri {
            uri: uri.to_string(),
        })
}
