//! Loader for Terraform plan JSON artifacts.
//!
//! The plan artifact is a precondition of a preflight run: its absence is a
//! fatal error with actionable guidance, reported before any processing.

use std::path::Path;
use tracing::{debug, info};

use crate::error::{CloudgateError, PlanError, Result};

use super::types::PlanDocument;

/// Default plan artifact name, matching the conventional
/// `terraform show -json tfplan.binary > tfplan.json` workflow.
pub const DEFAULT_PLAN_FILE: &str = "tfplan.json";

/// Parser for Terraform plan JSON documents.
#[derive(Debug, Default)]
pub struct PlanParser;

impl PlanParser {
    /// Creates a new plan parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Loads a plan document from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::FileNotFound`] if the artifact does not exist and
    /// [`PlanError::ParseError`] if it cannot be parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<PlanDocument> {
        let path = path.as_ref();
        info!("Loading Terraform plan from: {}", path.display());

        if !path.exists() {
            return Err(CloudgateError::Plan(PlanError::FileNotFound {
                path: path.to_path_buf(),
            }));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            CloudgateError::Plan(PlanError::ParseError {
                message: format!("Failed to read file: {e}"),
                location: Some(path.display().to_string()),
            })
        })?;

        self.parse_json(&content, Some(path))
    }

    /// Parses a plan document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid.
    pub fn parse_json(&self, content: &str, source: Option<&Path>) -> Result<PlanDocument> {
        debug!("Parsing Terraform plan JSON");

        let plan: PlanDocument = serde_json::from_str(content).map_err(|e| {
            let location = source.map(|p| p.display().to_string());
            CloudgateError::Plan(PlanError::ParseError {
                message: format!("JSON parse error: {e}"),
                location,
            })
        })?;

        debug!(
            "Parsed plan with {} resource changes (terraform {})",
            plan.resource_changes.len(),
            plan.terraform_version.as_deref().unwrap_or("unknown")
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_plan() {
        let json = r#"{
            "format_version": "1.2",
            "terraform_version": "1.9.5",
            "resource_changes": [
                {
                    "address": "azurerm_firewall.main",
                    "type": "azurerm_firewall",
                    "change": {
                        "actions": ["create"],
                        "after": { "location": "westus", "sku_name": "AZFW_Hub" }
                    }
                }
            ]
        }"#;

        let parser = PlanParser::new();
        let plan = parser.parse_json(json, None).expect("valid plan");

        assert_eq!(plan.resource_changes.len(), 1);
        let change = &plan.resource_changes[0];
        assert_eq!(change.address, "azurerm_firewall.main");
        assert_eq!(change.resource_type, "azurerm_firewall");
        assert_eq!(change.after_str("location"), Some("westus"));
    }

    #[test]
    fn test_parse_empty_plan() {
        let parser = PlanParser::new();
        let plan = parser.parse_json("{}", None).expect("valid plan");
        assert!(plan.resource_changes.is_empty());
    }

    #[test]
    fn test_missing_file_is_precondition_failure() {
        let parser = PlanParser::new();
        let result = parser.load_file("definitely-not-here/tfplan.json");

        match result {
            Err(CloudgateError::Plan(PlanError::FileNotFound { .. })) => {}
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_load_file_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tfplan.json");
        std::fs::write(&path, r#"{"resource_changes": []}"#).expect("write plan");

        let parser = PlanParser::new();
        let plan = parser.load_file(&path).expect("load plan");
        assert!(plan.resource_changes.is_empty());
    }

    #[test]
    fn test_invalid_json_reports_location() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("tfplan.json");
        std::fs::write(&path, "{not json").expect("write plan");

        let parser = PlanParser::new();
        match parser.load_file(&path) {
            Err(CloudgateError::Plan(PlanError::ParseError { location, .. })) => {
                assert!(location.is_some());
            }
            other => panic!("expected ParseError, got {other:?}"),
        }
    }
}
