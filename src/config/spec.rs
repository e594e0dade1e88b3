//! Configuration specification types.
//!
//! These types map to the optional `cloudgate.yaml` file.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Preflight run configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreflightConfig {
    /// Resource group the dry-run deployments are validated against. The
    /// group must exist; nothing is ever deployed into it.
    #[serde(default = "default_resource_group")]
    pub resource_group: String,

    /// Region used when a planned resource carries no location.
    #[serde(default = "default_location")]
    pub default_location: String,

    /// Subscription to validate against. When absent, the CLI resolves one
    /// interactively.
    #[serde(default)]
    pub subscription_id: Option<String>,

    /// Maximum in-flight validate calls. 1 = sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-call timeout against the management endpoint, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_resource_group() -> String {
    String::from("preflight-rg")
}

fn default_location() -> String {
    String::from(crate::synth::DEFAULT_LOCATION)
}

const fn default_concurrency() -> usize {
    1
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            resource_group: default_resource_group(),
            default_location: default_location(),
            subscription_id: None,
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PreflightConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::ValidationError`] naming the offending
    /// field.
    pub fn validate(&self) -> Result<()> {
        if self.resource_group.trim().is_empty() {
            return Err(
                ConfigError::validation("resource_group must not be empty", "resource_group")
                    .into(),
            );
        }

        if self.default_location.trim().is_empty() {
            return Err(ConfigError::validation(
                "default_location must not be empty",
                "default_location",
            )
            .into());
        }

        if self.timeout_secs == 0 {
            return Err(
                ConfigError::validation("timeout_secs must be at least 1", "timeout_secs").into(),
            );
        }

        Ok(())
    }
}
