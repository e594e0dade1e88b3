// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Cloudgate Preflight
//!
//! Pre-flight dry-run validation of high-risk Terraform resources against
//! Azure Resource Manager.
//!
//! ## Overview
//!
//! `terraform plan` can tell you that a change is syntactically and
//! referentially sound, but it cannot tell you that the provider will accept
//! it: SKU availability, zone support, and regional capacity constraints live
//! only in Azure's control plane. Cloudgate closes that gap for the resource
//! kinds where a rejection hurts most:
//!
//! - Inspect a Terraform plan JSON document for high blast-radius resources
//!   (firewalls, application gateways, load balancers, bastion hosts)
//! - Synthesize a minimal ARM template for each planned create/update
//! - Submit each template to ARM's deployment *validate* endpoint (dry-run,
//!   nothing is provisioned)
//! - Report every provider rejection in one pass, with the full error detail
//!
//! ## Architecture
//!
//! The pipeline is a single linear pass over the plan:
//!
//! 1. **Classify**: is this resource high-risk, and is it being created or
//!    updated?
//! 2. **Synthesize**: map the planned attributes onto a minimal deployment
//!    template via a per-kind rule table
//! 3. **Validate**: dry-run the template against ARM
//! 4. **Report**: aggregate failures in plan order; pass iff there are none
//!
//! ## Modules
//!
//! - [`plan`]: Terraform plan JSON model and loading
//! - [`classifier`]: high-risk resource selection
//! - [`synth`]: ARM template synthesis rules
//! - [`azure`]: Azure management API client and capability traits
//! - [`preflight`]: orchestration and reporting
//! - [`config`]: configuration parsing
//! - [`cli`]: command-line interface
//!
//! ## Example
//!
//! ```bash
//! terraform show -json tfplan.binary > tfplan.json
//! cloudgate check --plan tfplan.json --resource-group preflight-rg
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod azure;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod plan;
pub mod preflight;
pub mod synth;

// ============================================================================
// Re-exports
// ============================================================================

pub use azure::{
    AzureClient, StaticSubscriptionResolver, Subscription, SubscriptionResolver,
    ValidationClient, ValidationOutcome,
};
pub use classifier::ResourceClassifier;
pub use cli::{Cli, Commands, OutputFormatter};
pub use config::{ConfigParser, PreflightConfig};
pub use error::{CloudgateError, Result};
pub use plan::{PlanDocument, PlanParser, ResourceChange};
pub use preflight::{PreflightOrchestrator, PreflightReport, ResourceFailure};
pub use synth::{ArmTemplate, TemplateSynthesizer};
