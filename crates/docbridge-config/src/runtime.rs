//! The `[runtime]` configuration section.

use docbridge_core::{Stage, StageSource, DEFAULT_STAGE_VAR};
use serde::{Deserialize, Serialize};

/// How the bridge resolves its per-invocation context.
///
/// # Example
///
/// ```
/// use docbridge_config::RuntimeConfig;
/// use docbridge_core::{Stage, StageSource};
///
/// let runtime = RuntimeConfig::default();
/// assert_eq!(runtime.stage_source(), StageSource::Env("DOCBRIDGE_STAGE".to_string()));
///
/// let pinned = RuntimeConfig { stage: Some(Stage::Prod), ..RuntimeConfig::default() };
/// assert_eq!(pinned.stage_source(), StageSource::Fixed(Stage::Prod));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Service name reported in logs and metrics.
    pub service_name: String,

    /// Environment variable holding the stage, read at the start of every
    /// invocation.
    pub stage_var: String,

    /// Pins the stage instead of reading `stage_var`.
    pub stage: Option<Stage>,

    /// Region used for secret lookups when a secret ARN carries none.
    pub default_region: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            service_name: "docbridge".to_string(),
            stage_var: DEFAULT_STAGE_VAR.to_string(),
            stage: None,
            default_region: None,
        }
    }
}

impl RuntimeConfig {
    /// Returns where the stage comes from.
    #[must_use]
    pub fn stage_source(&self) -> StageSource {
        match self.stage {
            Some(stage) => StageSource::Fixed(stage),
            None => StageSource::Env(self.stage_var.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_runtime() {
        let runtime = RuntimeConfig::default();
        assert_eq!(runtime.service_name, "docbridge");
        assert_eq!(runtime.stage_var, "DOCBRIDGE_STAGE");
        assert!(runtime.stage.is_none());
    }

    #[test]
    fn test_deserialize_stage() {
        let runtime: RuntimeConfig = toml::from_str(
            r#"
            stage = "Test"
            default_region = "eu-west-1"
            "#,
        )
        .unwrap();
        assert_eq!(runtime.stage_source(), StageSource::Fixed(Stage::Test));
        assert_eq!(runtime.default_region.as_deref(), Some("eu-west-1"));

        assert!(toml::from_str::<RuntimeConfig>(r#"stage = "Staging""#).is_err());
    }
}
