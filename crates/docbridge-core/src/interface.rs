//! The closed set of interfaces the bridge can dispatch to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BridgeError;

/// A named contract that a pluggable handler implements.
///
/// Names are matched case-insensitively when parsed from an envelope, so
/// `"queuemessagereader"` and `"QueueMessageReader"` resolve to the same
/// variant.
///
/// # Example
///
/// ```
/// use docbridge_core::InterfaceName;
///
/// let name: InterfaceName = "singleFILEparser".parse().unwrap();
/// assert_eq!(name, InterfaceName::SingleFileParser);
/// assert_eq!(name.as_str(), "SingleFileParser");
/// assert!("FtpReader".parse::<InterfaceName>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InterfaceName {
    /// Parses delimited byte ranges of a single file.
    SingleFileParser,
    /// Parses messages read from a queue.
    QueueMessageReader,
    /// Extracts and reassembles document elements for vectorization.
    SagemakerVectorsInterface,
    /// Parses records read from a stream shard.
    KinesisRecordReader,
    /// Parses change records read from a table stream.
    #[serde(rename = "DynamoDBStreamsRecordReader")]
    DynamoDbStreamsRecordReader,
    /// Parses items read from a table scan segment.
    #[serde(rename = "DynamoDBTableItemReader")]
    DynamoDbTableItemReader,
    /// Runs the map phase of a distributed compute job.
    SparkMapperInterface,
    /// Runs the reduce phase of a distributed compute job.
    SparkReducerInterface,
}

impl InterfaceName {
    /// Every supported interface, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::SingleFileParser,
        Self::QueueMessageReader,
        Self::SagemakerVectorsInterface,
        Self::KinesisRecordReader,
        Self::DynamoDbStreamsRecordReader,
        Self::DynamoDbTableItemReader,
        Self::SparkMapperInterface,
        Self::SparkReducerInterface,
    ];

    /// Returns the canonical interface name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SingleFileParser => "SingleFileParser",
            Self::QueueMessageReader => "QueueMessageReader",
            Self::SagemakerVectorsInterface => "SagemakerVectorsInterface",
            Self::KinesisRecordReader => "KinesisRecordReader",
            Self::DynamoDbStreamsRecordReader => "DynamoDBStreamsRecordReader",
            Self::DynamoDbTableItemReader => "DynamoDBTableItemReader",
            Self::SparkMapperInterface => "SparkMapperInterface",
            Self::SparkReducerInterface => "SparkReducerInterface",
        }
    }

    /// Resolves an envelope's interface name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Result<Self, BridgeError> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| BridgeError::unsupported_interface(name))
    }
}

impl FromStr for InterfaceName {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_match() {
        for name in InterfaceName::ALL {
            assert_eq!(InterfaceName::from_name(name.as_str()).unwrap(), name);
            assert_eq!(
                InterfaceName::from_name(&name.as_str().to_lowercase()).unwrap(),
                name
            );
            assert_eq!(
                InterfaceName::from_name(&name.as_str().to_uppercase()).unwrap(),
                name
            );
        }
    }

    #[test]
    fn test_unsupported_interface() {
        let err = InterfaceName::from_name("S3Reader").unwrap_err();
        assert_eq!(err.error_type(), "UnsupportedInterfaceError");
        assert!(err.to_string().contains("S3Reader"));

        assert!(InterfaceName::from_name("").is_err());
        assert!(InterfaceName::from_name(" SingleFileParser").is_err());
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&InterfaceName::DynamoDbStreamsRecordReader).unwrap();
        assert_eq!(json, "\"DynamoDBStreamsRecordReader\"");
        for name in InterfaceName::ALL {
            assert_eq!(
                serde_json::to_value(name).unwrap(),
                serde_json::Value::String(name.as_str().to_string())
            );
        }
    }
}
