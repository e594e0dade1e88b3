//! Azure management API client and capability traits.
//!
//! The orchestration core never talks HTTP directly: it consumes the
//! [`ValidationClient`] and [`SubscriptionResolver`] capabilities, for which
//! this module supplies the real ARM-backed implementations.

mod client;
mod credentials;
mod subscriptions;
mod validation;

pub use client::AzureClient;
pub use credentials::CredentialSource;
pub use subscriptions::{
    select_by_index, StaticSubscriptionResolver, Subscription, SubscriptionResolver,
};
pub use validation::{ArmErrorDetail, ValidationClient, ValidationOutcome};
