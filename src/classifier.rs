//! High-risk resource selection.
//!
//! Decides which plan entries are worth a dry-run validation call: resource
//! kinds whose misconfiguration has a wide failure blast-radius, and only
//! when the plan actually creates or updates them. Deletes and no-ops carry
//! nothing to validate.

use crate::plan::{Action, ResourceChange};

/// Resource types whose misconfiguration has a wide failure blast-radius.
pub const HIGH_RISK_RESOURCES: &[&str] = &[
    "azurerm_firewall",
    "azurerm_application_gateway",
    "azurerm_lb",
    "azurerm_bastion_host",
];

/// Actions that warrant validation.
const VALIDATION_WORTHY_ACTIONS: &[Action] = &[Action::Create, Action::Update];

/// Classifier for selecting validation-worthy resource changes.
///
/// Pure and infallible: an unknown resource type simply evaluates to "not in
/// scope". Detecting a high-risk type that has no synthesis rule is the
/// synthesizer's job, not the classifier's.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResourceClassifier;

impl ResourceClassifier {
    /// Creates a new classifier.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns true if the change is high-risk and requests a
    /// validation-worthy action.
    #[must_use]
    pub fn is_in_scope(&self, change: &ResourceChange) -> bool {
        Self::is_high_risk(&change.resource_type)
            && change
                .change
                .actions
                .iter()
                .any(|a| VALIDATION_WORTHY_ACTIONS.contains(a))
    }

    /// Returns true if the resource type is in the high-risk set.
    #[must_use]
    pub fn is_high_risk(resource_type: &str) -> bool {
        HIGH_RISK_RESOURCES.contains(&resource_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(resource_type: &str, actions: &str) -> ResourceChange {
        serde_json::from_str(&format!(
            r#"{{
                "address": "{resource_type}.test",
                "type": "{resource_type}",
                "change": {{ "actions": {actions}, "after": {{}} }}
            }}"#
        ))
        .expect("valid change")
    }

    #[test]
    fn test_high_risk_create_is_in_scope() {
        let classifier = ResourceClassifier::new();
        assert!(classifier.is_in_scope(&change("azurerm_firewall", r#"["create"]"#)));
        assert!(classifier.is_in_scope(&change("azurerm_lb", r#"["update"]"#)));
    }

    #[test]
    fn test_replace_is_in_scope() {
        // A replacement plans delete+create; the create leg needs validation.
        let classifier = ResourceClassifier::new();
        assert!(classifier.is_in_scope(&change(
            "azurerm_application_gateway",
            r#"["delete", "create"]"#
        )));
    }

    #[test]
    fn test_delete_and_noop_are_excluded() {
        let classifier = ResourceClassifier::new();
        assert!(!classifier.is_in_scope(&change("azurerm_lb", r#"["delete"]"#)));
        assert!(!classifier.is_in_scope(&change("azurerm_firewall", r#"["no-op"]"#)));
        assert!(!classifier.is_in_scope(&change("azurerm_bastion_host", r#"["read"]"#)));
    }

    #[test]
    fn test_unknown_type_is_out_of_scope() {
        let classifier = ResourceClassifier::new();
        assert!(!classifier.is_in_scope(&change("azurerm_storage_account", r#"["create"]"#)));
        assert!(!classifier.is_in_scope(&change("aws_lb", r#"["create"]"#)));
    }
}
