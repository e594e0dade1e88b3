//! Error types for the Cloudgate preflight system.
//!
//! This module provides the error hierarchy for all stages of a preflight
//! run: plan loading, configuration, template synthesis, and the Azure
//! management API. A provider *validation rejection* is deliberately not an
//! error — it is the expected failure path of a dry-run and is carried in
//! [`crate::azure::ValidationOutcome`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the Cloudgate preflight system.
#[derive(Debug, Error)]
pub enum CloudgateError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Terraform plan loading errors.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Template synthesis errors.
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Azure management API errors.
    #[error("Azure API error: {0}")]
    Azure(#[from] AzureError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },

    /// Environment variable is missing.
    #[error("Missing environment variable: {name}")]
    MissingEnvVar {
        /// Name of the missing variable.
        name: String,
    },
}

/// Terraform plan loading errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The plan JSON artifact does not exist.
    #[error(
        "Terraform plan JSON not found: {path}. \
         Run `terraform show -json tfplan.binary > tfplan.json` first."
    )]
    FileNotFound {
        /// Path to the missing plan file.
        path: PathBuf,
    },

    /// The plan JSON could not be parsed.
    #[error("Failed to parse Terraform plan: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },
}

/// Template synthesis errors.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// A resource selected for validation has no synthesis rule.
    ///
    /// This is a tooling gap, not a per-resource condition: the resource was
    /// already classified as requiring validation, so the run cannot honestly
    /// produce a verdict without it.
    #[error("No synthesis rule for resource type '{resource_type}' (at {address})")]
    UnsupportedResourceKind {
        /// The Terraform resource type lacking a rule.
        resource_type: String,
        /// Address of the affected resource in the plan.
        address: String,
    },
}

/// Azure management API errors.
#[derive(Debug, Error)]
pub enum AzureError {
    /// A required credential environment variable is missing.
    #[error("Missing Azure credential: {name}")]
    MissingCredential {
        /// Name of the missing credential variable.
        name: String,
    },

    /// Authentication or authorization failed.
    #[error("Azure authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the auth failure.
        message: String,
    },

    /// API request failed with an unexpected status.
    #[error("Azure API request failed: {status} - {message}")]
    ApiRequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Rate limited by the management endpoint.
    #[error("Azure API rate limited, retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Network error reaching the management endpoint.
    #[error("Network error communicating with Azure: {message}")]
    NetworkError {
        /// Description of the network error.
        message: String,
    },

    /// Response body could not be interpreted.
    #[error("Invalid response from Azure API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },

    /// The credentials can see no subscriptions at all.
    #[error("No subscriptions found for the current credentials")]
    NoSubscriptions,

    /// An interactive subscription selection was out of range or not a number.
    #[error("Invalid subscription selection: {input}")]
    InvalidSelection {
        /// The rejected input.
        input: String,
    },
}

/// Result type alias for Cloudgate operations.
pub type Result<T> = std::result::Result<T, CloudgateError>;

impl CloudgateError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error is a transport-layer failure of a single
    /// API call, as opposed to a provider-returned validation rejection.
    ///
    /// Transport failures are recorded against the affected resource with a
    /// distinguishable tag; they are never folded into the SKU/zone failure
    /// class.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Azure(
                AzureError::NetworkError { .. }
                    | AzureError::RateLimited { .. }
                    | AzureError::ApiRequestFailed { .. }
                    | AzureError::InvalidResponse { .. }
            )
        )
    }

    /// Returns true if this error means no verdict can be obtained for any
    /// resource (missing or rejected credentials), which aborts the run.
    #[must_use]
    pub const fn is_credential(&self) -> bool {
        matches!(
            self,
            Self::Azure(
                AzureError::MissingCredential { .. } | AzureError::AuthenticationFailed { .. }
            )
        )
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl AzureError {
    /// Creates an API request error.
    #[must_use]
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiRequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates an invalid-response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }
}
