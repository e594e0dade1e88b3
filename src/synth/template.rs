//! Minimal ARM deployment template synthesis.
//!
//! The synthesized template carries only the fields the validate endpoint
//! needs to evaluate SKU/zone/region/capacity legality. Extra fields could
//! mask the true provider response, so they are omitted.

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Result, SynthesisError};
use crate::plan::ResourceChange;

use super::rules::{rule_for, SkuRule, ARM_API_VERSION};

/// ARM deployment template schema URL.
const TEMPLATE_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentTemplate.json#";

/// ARM template content version marker.
const CONTENT_VERSION: &str = "1.0.0.0";

/// Fallback region when the plan does not carry a location. ARM rejects a
/// resource with no location outright, which would hide the real answer.
pub const DEFAULT_LOCATION: &str = "eastus";

/// Maximum resource name length accepted across the synthesized ARM types.
const MAX_RESOURCE_NAME_LEN: usize = 64;

/// Length of the hash suffix appended to over-long derived names.
const NAME_HASH_LEN: usize = 8;

/// A minimal ARM deployment template for one resource.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArmTemplate {
    /// Template schema marker.
    #[serde(rename = "$schema")]
    pub schema: String,
    /// Content version marker.
    #[serde(rename = "contentVersion")]
    pub content_version: String,
    /// The single synthesized resource.
    pub resources: Vec<ArmResource>,
}

/// One resource entry in a synthesized template.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArmResource {
    /// ARM resource type string.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// ARM API version.
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    /// Resource name derived from the plan address.
    pub name: String,
    /// Azure region.
    pub location: String,
    /// SKU block, when the resource type takes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<ArmSku>,
}

/// SKU block of a synthesized resource.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ArmSku {
    /// SKU name.
    pub name: String,
    /// SKU tier, when the resource type requires one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
}

/// Synthesizer turning classified resource changes into minimal templates.
#[derive(Debug, Clone)]
pub struct TemplateSynthesizer {
    /// Region used when the plan carries no location.
    default_location: String,
}

impl Default for TemplateSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION)
    }
}

impl TemplateSynthesizer {
    /// Creates a synthesizer with the given fallback region.
    #[must_use]
    pub fn new(default_location: impl Into<String>) -> Self {
        Self {
            default_location: default_location.into(),
        }
    }

    /// Returns the fallback region applied when the plan carries no location.
    #[must_use]
    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    /// Synthesizes the minimal deployment template for one resource change.
    ///
    /// The mapping is deterministic: identical input always yields an
    /// identical template.
    ///
    /// # Errors
    ///
    /// Returns [`SynthesisError::UnsupportedResourceKind`] when the resource
    /// type has no rule. The caller classified this resource as requiring
    /// validation, so a missing rule is a tooling gap and never yields a
    /// partial template.
    pub fn synthesize(&self, change: &ResourceChange) -> Result<ArmTemplate> {
        let rule = rule_for(&change.resource_type).ok_or_else(|| {
            SynthesisError::UnsupportedResourceKind {
                resource_type: change.resource_type.clone(),
                address: change.address.clone(),
            }
        })?;

        let name = derive_resource_name(&change.address);
        let location = change
            .after_str("location")
            .unwrap_or(&self.default_location)
            .to_string();

        let sku = match rule.sku {
            SkuRule::Attribute { attr, default, tier } => Some(ArmSku {
                name: change.after_str(attr).unwrap_or(default).to_string(),
                tier: tier.map(String::from),
            }),
            SkuRule::Omitted => None,
        };

        debug!(
            "Synthesized {} template for {} in {}",
            rule.arm_type, change.address, location
        );

        Ok(ArmTemplate {
            schema: String::from(TEMPLATE_SCHEMA),
            content_version: String::from(CONTENT_VERSION),
            resources: vec![ArmResource {
                resource_type: String::from(rule.arm_type),
                api_version: String::from(ARM_API_VERSION),
                name,
                location,
                sku,
            }],
        })
    }
}

impl ArmTemplate {
    /// Returns the location of the synthesized resource.
    #[must_use]
    pub fn location(&self) -> &str {
        self.resources.first().map_or("", |r| r.location.as_str())
    }
}

/// Derives a provider-safe resource name from a plan address.
///
/// Structural separators (path dots, index brackets) become hyphens, matching
/// what ARM accepts in resource names. The mapping is deterministic: the same
/// address always yields the same name. Addresses whose sanitized form
/// exceeds the ARM name cap are truncated and suffixed with a short hash of
/// the full address so distinct addresses stay distinct.
fn derive_resource_name(address: &str) -> String {
    let sanitized = address.replace('.', "-").replace('[', "-").replace(']', "");

    if sanitized.len() <= MAX_RESOURCE_NAME_LEN {
        return sanitized;
    }

    let digest = hex::encode(Sha256::digest(address.as_bytes()));
    let keep = MAX_RESOURCE_NAME_LEN - NAME_HASH_LEN - 1;
    format!("{}-{}", &sanitized[..keep], &digest[..NAME_HASH_LEN])
}
