//! The deployment dry-run validation capability.
//!
//! [`ValidationClient`] is the seam between the orchestration core and the
//! provider: the real implementation posts the synthesized template to ARM's
//! deployment validate endpoint; tests substitute a scripted fake. A
//! provider *rejection* is the expected failure path and is returned as a
//! [`ValidationOutcome`]; transport and authorization problems are errors.

use async_trait::async_trait;
use reqwest::header;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::error::{AzureError, Result};
use crate::synth::ArmTemplate;

use super::client::AzureClient;

/// API version for the deployments validate endpoint.
const DEPLOYMENTS_API_VERSION: &str = "2021-04-01";

/// Capability executing one dry-run deployment validation.
#[async_trait]
pub trait ValidationClient: Send + Sync {
    /// Validates the template against the provider without provisioning
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns an error for transport and authorization failures — cases
    /// where no verdict was obtained. A provider rejection is a success of
    /// this call, carried in the outcome.
    async fn validate(
        &self,
        subscription_id: &str,
        resource_group: &str,
        location: &str,
        template: &ArmTemplate,
    ) -> Result<ValidationOutcome>;
}

/// Result of one dry-run validation call.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    /// Whether the provider accepted the deployment.
    pub accepted: bool,
    /// Provider error detail on rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ArmErrorDetail>,
    /// Location the attempt was evaluated against.
    pub location: String,
}

/// A provider error, preserved verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct ArmErrorDetail {
    /// Top-level error code (e.g. `SkuNotAvailable`), when present.
    pub code: Option<String>,
    /// Top-level error message, when present.
    pub message: Option<String>,
    /// The full error tree exactly as returned, never summarized.
    pub raw: Value,
}

impl ValidationOutcome {
    /// Creates an accepted outcome.
    #[must_use]
    pub fn ok(location: impl Into<String>) -> Self {
        Self {
            accepted: true,
            error: None,
            location: location.into(),
        }
    }

    /// Creates a rejected outcome carrying the provider error.
    #[must_use]
    pub fn rejected(location: impl Into<String>, error: ArmErrorDetail) -> Self {
        Self {
            accepted: false,
            error: Some(error),
            location: location.into(),
        }
    }
}

impl ArmErrorDetail {
    /// Extracts the error detail from a validate response payload.
    ///
    /// ARM nests the detail under an `error` key; some endpoints return the
    /// detail at the top level. Either way the full tree is preserved.
    #[must_use]
    pub fn from_payload(payload: Value) -> Self {
        let node = payload.get("error").cloned().unwrap_or(payload);
        let code = node
            .get("code")
            .and_then(Value::as_str)
            .map(String::from);
        let message = node
            .get("message")
            .and_then(Value::as_str)
            .map(String::from);

        Self {
            code,
            message,
            raw: node,
        }
    }
}

impl std::fmt::Display for ArmErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string_pretty(&self.raw) {
            Ok(pretty) => write!(f, "{pretty}"),
            Err(_) => write!(f, "{}", self.raw),
        }
    }
}

/// Validate request body.
#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    properties: ValidateProperties<'a>,
}

/// Validate request properties.
#[derive(Debug, Serialize)]
struct ValidateProperties<'a> {
    mode: &'static str,
    template: &'a ArmTemplate,
    parameters: serde_json::Map<String, Value>,
}

#[async_trait]
impl ValidationClient for AzureClient {
    async fn validate(
        &self,
        subscription_id: &str,
        resource_group: &str,
        location: &str,
        template: &ArmTemplate,
    ) -> Result<ValidationOutcome> {
        let token = self.bearer_token().await?;

        // A fresh name per call: concurrent or repeated validations must
        // never collide on the provider's deployment namespace.
        let deployment_name = format!("preflight-{}", Uuid::new_v4());
        let url = format!(
            "{}/subscriptions/{subscription_id}/resourceGroups/{resource_group}\
             /providers/Microsoft.Resources/deployments/{deployment_name}\
             /validate?api-version={DEPLOYMENTS_API_VERSION}",
            self.management_url()
        );

        debug!("Validating {deployment_name} in {location}");
        trace!("POST {url}");

        let body = ValidateRequest {
            properties: ValidateProperties {
                mode: "Incremental",
                template,
                parameters: serde_json::Map::new(),
            },
        };

        let response = self
            .http()
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AzureError::network(format!("Validate request failed: {e}")))?;

        let response = Self::check_auth_status(response).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(ValidationOutcome::ok(location));
        }

        // A non-success answer with a JSON body is the provider's verdict:
        // the deployment would be rejected. Anything else never reached the
        // validation engine and is a transport failure.
        let payload: Value = response.json().await.map_err(|e| {
            AzureError::invalid_response(format!(
                "Non-JSON {status} response from validate endpoint: {e}"
            ))
        })?;

        Ok(ValidationOutcome::rejected(
            location,
            ArmErrorDetail::from_payload(payload),
        ))
    }
}
