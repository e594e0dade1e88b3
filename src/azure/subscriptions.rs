//! Subscription resolution.
//!
//! The core pipeline needs exactly one subscription id per run. Where it
//! comes from — configuration, a flag, or an interactive picker — is the
//! caller's business, abstracted behind [`SubscriptionResolver`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AzureError, CloudgateError, Result};

/// A subscription visible to the current credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Subscription identifier.
    pub subscription_id: String,
    /// Human-readable display name.
    #[serde(default)]
    pub display_name: String,
}

/// Capability yielding the subscription id to validate against.
#[async_trait]
pub trait SubscriptionResolver: Send + Sync {
    /// Resolves a single subscription identifier.
    async fn resolve(&self) -> Result<String>;
}

/// Resolver returning a fixed, pre-selected subscription id.
#[derive(Debug, Clone)]
pub struct StaticSubscriptionResolver {
    /// The fixed subscription id.
    subscription_id: String,
}

impl StaticSubscriptionResolver {
    /// Creates a resolver for a fixed subscription id.
    #[must_use]
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
        }
    }
}

#[async_trait]
impl SubscriptionResolver for StaticSubscriptionResolver {
    async fn resolve(&self) -> Result<String> {
        Ok(self.subscription_id.clone())
    }
}

/// Selects a subscription from a 1-based textual index, as typed at an
/// interactive prompt.
///
/// # Errors
///
/// Returns [`AzureError::InvalidSelection`] when the input is not a number
/// or is out of range.
pub fn select_by_index<'a>(
    subscriptions: &'a [Subscription],
    input: &str,
) -> Result<&'a Subscription> {
    let invalid = || {
        CloudgateError::Azure(AzureError::InvalidSelection {
            input: input.trim().to_string(),
        })
    };

    let index: usize = input.trim().parse().map_err(|_| invalid())?;
    if index == 0 {
        return Err(invalid());
    }

    subscriptions.get(index - 1).ok_or_else(invalid)
}
