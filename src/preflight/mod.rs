//! Preflight orchestration and reporting.
//!
//! Drives the classify → synthesize → validate pipeline over a plan and
//! aggregates the per-resource verdicts into a [`PreflightReport`].

mod orchestrator;
mod report;

pub use orchestrator::PreflightOrchestrator;
pub use report::{DiagnosticContext, FailureKind, PreflightReport, ResourceFailure};
