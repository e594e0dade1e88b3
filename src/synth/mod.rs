//! ARM template synthesis.
//!
//! Maps one classified resource change onto a minimal, provider-valid
//! deployment template. The per-kind mapping is a data table rather than
//! branching logic: adding a resource kind is a table edit.

mod rules;
mod template;

pub use rules::{rule_for, KindRule, SkuRule, ARM_API_VERSION, KIND_RULES};
pub use template::{ArmResource, ArmSku, ArmTemplate, TemplateSynthesizer, DEFAULT_LOCATION};
