//! Per-kind synthesis rules.
//!
//! One entry per supported Terraform resource type: the ARM resource type it
//! maps to and how its SKU block is derived from the planned attributes. The
//! SKU defaults let validation proceed for partially-specified plans while
//! still surfacing the provider's own rejection when a default is wrong for
//! the target context.

/// ARM resource API version used for synthesized resources.
pub const ARM_API_VERSION: &str = "2022-08-01";

/// Rule for mapping one Terraform resource kind onto an ARM resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindRule {
    /// Terraform resource type this rule applies to.
    pub terraform_type: &'static str,
    /// ARM resource type string.
    pub arm_type: &'static str,
    /// How to derive the SKU block.
    pub sku: SkuRule,
}

/// SKU derivation policy for a resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkuRule {
    /// Copy the SKU name from a planned attribute, defaulting when absent;
    /// optionally pin a tier.
    Attribute {
        /// Attribute in the planned `after` map holding the SKU name.
        attr: &'static str,
        /// SKU name used when the attribute is absent.
        default: &'static str,
        /// Fixed tier, when the resource type requires one.
        tier: Option<&'static str>,
    },
    /// The resource type takes no SKU block.
    Omitted,
}

/// The synthesis rule table. One rule per supported kind; order matches the
/// high-risk resource set.
pub const KIND_RULES: &[KindRule] = &[
    KindRule {
        terraform_type: "azurerm_firewall",
        arm_type: "Microsoft.Network/azureFirewalls",
        sku: SkuRule::Attribute {
            attr: "sku_name",
            default: "AZFW_VNet",
            tier: Some("Standard"),
        },
    },
    KindRule {
        terraform_type: "azurerm_application_gateway",
        arm_type: "Microsoft.Network/applicationGateways",
        sku: SkuRule::Attribute {
            attr: "sku_name",
            default: "WAF_v2",
            tier: Some("WAF"),
        },
    },
    KindRule {
        terraform_type: "azurerm_lb",
        arm_type: "Microsoft.Network/loadBalancers",
        sku: SkuRule::Attribute {
            attr: "sku",
            default: "Standard",
            tier: None,
        },
    },
    KindRule {
        terraform_type: "azurerm_bastion_host",
        arm_type: "Microsoft.Network/bastionHosts",
        sku: SkuRule::Omitted,
    },
];

/// Looks up the synthesis rule for a Terraform resource type.
#[must_use]
pub fn rule_for(terraform_type: &str) -> Option<&'static KindRule> {
    KIND_RULES
        .iter()
        .find(|rule| rule.terraform_type == terraform_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::HIGH_RISK_RESOURCES;

    #[test]
    fn test_every_high_risk_kind_has_a_rule() {
        for resource_type in HIGH_RISK_RESOURCES {
            assert!(
                rule_for(resource_type).is_some(),
                "missing rule for {resource_type}"
            );
        }
    }

    #[test]
    fn test_firewall_rule() {
        let rule = rule_for("azurerm_firewall").expect("firewall rule");
        assert_eq!(rule.arm_type, "Microsoft.Network/azureFirewalls");
        assert_eq!(
            rule.sku,
            SkuRule::Attribute {
                attr: "sku_name",
                default: "AZFW_VNet",
                tier: Some("Standard"),
            }
        );
    }

    #[test]
    fn test_load_balancer_has_no_tier() {
        let rule = rule_for("azurerm_lb").expect("lb rule");
        match rule.sku {
            SkuRule::Attribute { attr, default, tier } => {
                assert_eq!(attr, "sku");
                assert_eq!(default, "Standard");
                assert!(tier.is_none());
            }
            SkuRule::Omitted => panic!("lb must carry a SKU"),
        }
    }

    #[test]
    fn test_unknown_kind_has_no_rule() {
        assert!(rule_for("azurerm_virtual_network").is_none());
    }
}
