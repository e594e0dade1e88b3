//! Typed model of the Terraform plan JSON document.
//!
//! Only the fields this tool consumes are modeled; everything else in the
//! document is ignored during deserialization. All types are immutable once
//! parsed.

use serde::Deserialize;
use serde_json::{Map, Value};

/// A Terraform plan document, as emitted by `terraform show -json`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanDocument {
    /// Plan output format version.
    #[serde(default)]
    pub format_version: Option<String>,
    /// Terraform version that produced the plan.
    #[serde(default)]
    pub terraform_version: Option<String>,
    /// Planned changes, in the plan's original order.
    #[serde(default)]
    pub resource_changes: Vec<ResourceChange>,
}

/// One planned operation on one infrastructure resource.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceChange {
    /// Unique textual path of the resource within the plan
    /// (e.g. `module.network.azurerm_firewall.main[0]`).
    pub address: String,
    /// Terraform resource type (e.g. `azurerm_firewall`).
    #[serde(rename = "type")]
    pub resource_type: String,
    /// The requested change.
    pub change: Change,
}

/// The change requested for a resource.
#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    /// Requested operations (create/read/update/delete/no-op).
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Desired post-change attribute values. Absent for pure deletes and for
    /// attributes only known after apply.
    #[serde(default)]
    pub after: Option<Map<String, Value>>,
}

/// A single requested operation.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Resource will be created.
    Create,
    /// Resource will be read (data source refresh).
    Read,
    /// Resource will be updated in place.
    Update,
    /// Resource will be destroyed.
    Delete,
    /// No operation.
    #[serde(rename = "no-op")]
    NoOp,
}

impl ResourceChange {
    /// Looks up a desired post-change attribute value by name.
    #[must_use]
    pub fn after_attr(&self, key: &str) -> Option<&Value> {
        self.change.after.as_ref().and_then(|after| after.get(key))
    }

    /// Looks up a desired post-change attribute as a string.
    ///
    /// Returns `None` for absent attributes and for explicit nulls.
    #[must_use]
    pub fn after_str(&self, key: &str) -> Option<&str> {
        self.after_attr(key).and_then(Value::as_str)
    }
}

impl Change {
    /// Returns true if the change requests the given action.
    #[must_use]
    pub fn has_action(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::NoOp => "no-op",
        };
        write!(f, "{s}")
    }
}
