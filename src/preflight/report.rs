//! Preflight report types.
//!
//! The report accounts for every resource that was selected for validation:
//! a resource either passed silently or appears exactly once in the failure
//! sequence, which preserves the plan's original order.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::azure::ArmErrorDetail;
use crate::plan::ResourceChange;

/// Diagnostic context extracted from a resource's planned attributes.
///
/// Extracted independently of the synthesized template so the report shows
/// what the plan said, even when synthesis applied defaults.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticContext {
    /// Target region.
    pub location: String,
    /// Planned SKU, or `unknown`.
    pub sku: String,
    /// Planned zones, or `none`.
    pub zones: String,
}

impl DiagnosticContext {
    /// Extracts the context from a resource change's `after` attributes.
    #[must_use]
    pub fn from_change(change: &ResourceChange, default_location: &str) -> Self {
        let location = change
            .after_str("location")
            .unwrap_or(default_location)
            .to_string();

        let sku = change
            .after_str("sku_name")
            .or_else(|| change.after_str("sku"))
            .unwrap_or("unknown")
            .to_string();

        let zones = change
            .after_attr("zones")
            .and_then(|v| v.as_array())
            .map(|zones| {
                zones
                    .iter()
                    .filter_map(|z| z.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|joined| !joined.is_empty())
            .unwrap_or_else(|| String::from("none"));

        Self {
            location,
            sku,
            zones,
        }
    }
}

/// Why a resource failed its preflight.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "class", content = "detail", rename_all = "lowercase")]
pub enum FailureKind {
    /// The provider evaluated the deployment and rejected it. This is the
    /// signal the preflight exists to capture.
    Rejected(ArmErrorDetail),
    /// The validate call itself failed (network, rate limit, bad response):
    /// no verdict was obtained. Tagged distinctly so it is never mistaken
    /// for a SKU/zone/capacity problem.
    Transport(String),
}

impl FailureKind {
    /// Short class tag for display.
    #[must_use]
    pub const fn class(&self) -> &'static str {
        match self {
            Self::Rejected(_) => "rejected",
            Self::Transport(_) => "transport",
        }
    }
}

/// One failed resource in the report.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceFailure {
    /// Plan address of the resource.
    pub address: String,
    /// Diagnostic context from the plan.
    #[serde(flatten)]
    pub context: DiagnosticContext,
    /// Failure class and detail.
    #[serde(flatten)]
    pub kind: FailureKind,
}

impl ResourceFailure {
    /// Returns true for transport-class failures.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self.kind, FailureKind::Transport(_))
    }
}

/// The aggregate verdict of one preflight run.
#[derive(Debug, Clone, Serialize)]
pub struct PreflightReport {
    /// When the run completed.
    pub created_at: DateTime<Utc>,
    /// Number of resources selected and evaluated.
    pub evaluated: usize,
    /// Failures, in the plan's original order.
    pub failures: Vec<ResourceFailure>,
}

impl PreflightReport {
    /// Creates a report from the evaluated count and ordered failures.
    #[must_use]
    pub fn new(evaluated: usize, failures: Vec<ResourceFailure>) -> Self {
        Self {
            created_at: Utc::now(),
            evaluated,
            failures,
        }
    }

    /// Returns true iff no resource failed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the number of provider rejections (excluding transport
    /// failures).
    #[must_use]
    pub fn rejection_count(&self) -> usize {
        self.failures.iter().filter(|f| !f.is_transport()).count()
    }
}

impl std::fmt::Display for PreflightReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.passed() {
            write!(
                f,
                "Pre-flight validation passed for all {} high-risk resources",
                self.evaluated
            )
        } else {
            write!(
                f,
                "Pre-flight validation failed for {} of {} high-risk resources",
                self.failures.len(),
                self.evaluated
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(after: &str) -> ResourceChange {
        serde_json::from_str(&format!(
            r#"{{
                "address": "azurerm_firewall.main",
                "type": "azurerm_firewall",
                "change": {{ "actions": ["create"], "after": {after} }}
            }}"#
        ))
        .expect("valid change")
    }

    #[test]
    fn test_context_extraction() {
        let ctx = DiagnosticContext::from_change(
            &change(r#"{"location": "westus", "sku_name": "AZFW_Hub", "zones": ["1", "2"]}"#),
            "eastus",
        );
        assert_eq!(ctx.location, "westus");
        assert_eq!(ctx.sku, "AZFW_Hub");
        assert_eq!(ctx.zones, "1, 2");
    }

    #[test]
    fn test_context_defaults() {
        let ctx = DiagnosticContext::from_change(&change("{}"), "eastus");
        assert_eq!(ctx.location, "eastus");
        assert_eq!(ctx.sku, "unknown");
        assert_eq!(ctx.zones, "none");
    }

    #[test]
    fn test_context_empty_zone_list_is_none() {
        let ctx = DiagnosticContext::from_change(&change(r#"{"zones": []}"#), "eastus");
        assert_eq!(ctx.zones, "none");
    }

    #[test]
    fn test_context_prefers_sku_name_over_sku() {
        let ctx = DiagnosticContext::from_change(
            &change(r#"{"sku_name": "WAF_v2", "sku": "Standard"}"#),
            "eastus",
        );
        assert_eq!(ctx.sku, "WAF_v2");
    }

    #[test]
    fn test_report_passes_iff_no_failures() {
        let empty = PreflightReport::new(3, vec![]);
        assert!(empty.passed());

        let failing = PreflightReport::new(
            3,
            vec![ResourceFailure {
                address: String::from("azurerm_lb.edge"),
                context: DiagnosticContext::from_change(&change("{}"), "eastus"),
                kind: FailureKind::Transport(String::from("connection reset")),
            }],
        );
        assert!(!failing.passed());
        assert_eq!(failing.rejection_count(), 0);
        assert!(failing.failures[0].is_transport());
    }
}
