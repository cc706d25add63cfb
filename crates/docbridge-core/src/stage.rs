//! Deployment stage lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BridgeError;

/// Environment variable the stage is read from by default.
pub const DEFAULT_STAGE_VAR: &str = "DOCBRIDGE_STAGE";

/// The deployment stage the bridge runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Pre-production.
    Test,
    /// Production.
    Prod,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "Test",
            Self::Prod => "Prod",
        }
    }
}

impl FromStr for Stage {
    type Err = BridgeError;

    /// Parses a stage name. Matching is exact.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Test" => Ok(Self::Test),
            "Prod" => Ok(Self::Prod),
            other => Err(BridgeError::invalid_stage(format!(
                "unrecognized stage '{other}' - expected one of [Test, Prod]"
            ))),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the stage comes from.
///
/// Resolved once at the start of every invocation.
///
/// # Example
///
/// ```
/// use docbridge_core::{Stage, StageSource};
///
/// let source = StageSource::Fixed(Stage::Test);
/// assert_eq!(source.resolve().unwrap(), Stage::Test);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageSource {
    /// Read from the named environment variable.
    Env(String),
    /// A stage fixed at construction.
    Fixed(Stage),
}

impl StageSource {
    /// Resolves the stage. An absent or unrecognized value is an error.
    pub fn resolve(&self) -> Result<Stage, BridgeError> {
        match self {
            Self::Fixed(stage) => Ok(*stage),
            Self::Env(var) => match std::env::var(var) {
                Ok(value) => value.parse(),
                Err(_) => Err(BridgeError::invalid_stage(format!(
                    "stage environment variable {var} is not set"
                ))),
            },
        }
    }
}

impl Default for StageSource {
    fn default() -> Self {
        Self::Env(DEFAULT_STAGE_VAR.to_string())
    }
}
