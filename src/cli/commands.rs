//! CLI command definitions.
//!
//! This module defines all CLI commands and their arguments using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cloudgate - pre-flight validation of high-risk Terraform resources
/// against Azure Resource Manager.
#[derive(Parser, Debug)]
#[command(name = "cloudgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true, env = "CLOUDGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the plan's high-risk resources against ARM (dry-run).
    Check {
        /// Path to the Terraform plan JSON (defaults to tfplan.json).
        #[arg(short, long, env = "CLOUDGATE_PLAN")]
        plan: Option<PathBuf>,

        /// Resource group to validate against.
        #[arg(long)]
        resource_group: Option<String>,

        /// Subscription id (skips the interactive picker).
        #[arg(short, long)]
        subscription: Option<String>,

        /// Maximum in-flight validation calls.
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Print the synthesized deployment templates without calling Azure.
    Synth {
        /// Path to the Terraform plan JSON (defaults to tfplan.json).
        #[arg(short, long, env = "CLOUDGATE_PLAN")]
        plan: Option<PathBuf>,
    },

    /// List subscriptions visible to the current credentials.
    Subscriptions,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}
