//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying preflight
//! results to the user in various formats.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::azure::Subscription;
use crate::preflight::{FailureKind, PreflightReport};
use crate::synth::ArmTemplate;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Failure row for table display.
#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Zones")]
    zones: String,
    #[tabled(rename = "Class")]
    class: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a preflight report for display.
    #[must_use]
    pub fn format_report(&self, report: &PreflightReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Text => Self::format_report_text(report),
        }
    }

    /// Formats a report as text.
    fn format_report_text(report: &PreflightReport) -> String {
        if report.passed() {
            if report.evaluated == 0 {
                return format!(
                    "{} No high-risk resource changes to validate.\n",
                    "✓".green()
                );
            }
            return format!(
                "{} Pre-flight validation passed for all {} high-risk resources.\n",
                "✓".green(),
                report.evaluated
            );
        }

        let mut output = format!(
            "{} Pre-flight validation failed for the following resources:\n\n",
            "✗".red()
        );

        let rows: Vec<FailureRow> = report
            .failures
            .iter()
            .map(|f| FailureRow {
                address: Self::truncate(&f.address, 48),
                location: f.context.location.clone(),
                sku: f.context.sku.clone(),
                zones: f.context.zones.clone(),
                class: f.kind.class().to_string(),
            })
            .collect();

        let table = Table::new(rows).to_string();
        output.push_str(&table);
        output.push('\n');

        for failure in &report.failures {
            let _ = write!(
                output,
                "\n{} failed validation\n",
                failure.address.red().bold()
            );
            let _ = writeln!(output, "  Location : {}", failure.context.location);
            let _ = writeln!(output, "  SKU      : {}", failure.context.sku);
            let _ = writeln!(output, "  Zones    : {}", failure.context.zones);
            let _ = writeln!(output, "  Error    :");
            for line in Self::failure_detail(&failure.kind).lines() {
                let _ = writeln!(output, "    {line}");
            }
        }

        let _ = write!(
            output,
            "\nFailed: {} ({} rejected, {} transport) of {} evaluated\n",
            report.failures.len().to_string().red(),
            report.rejection_count(),
            report.failures.len() - report.rejection_count(),
            report.evaluated
        );

        output
    }

    /// Renders the detail of one failure.
    fn failure_detail(kind: &FailureKind) -> String {
        match kind {
            FailureKind::Rejected(error) => error.to_string(),
            FailureKind::Transport(message) => format!("[transport] {message}"),
        }
    }

    /// Formats synthesized deployment templates for display.
    #[must_use]
    pub fn format_descriptors(&self, descriptors: &[(String, ArmTemplate)]) -> String {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<_> = descriptors
                    .iter()
                    .map(|(address, template)| {
                        serde_json::json!({ "address": address, "template": template })
                    })
                    .collect();
                serde_json::to_string_pretty(&items).unwrap_or_default()
            }
            OutputFormat::Text => {
                if descriptors.is_empty() {
                    return format!("{} No high-risk resource changes in plan.\n", "✓".green());
                }

                let mut output = String::new();
                for (address, template) in descriptors {
                    let _ = writeln!(output, "{} {}", "--".dimmed(), address.bold());
                    let pretty =
                        serde_json::to_string_pretty(template).unwrap_or_default();
                    output.push_str(&pretty);
                    output.push('\n');
                }
                output
            }
        }
    }

    /// Formats a subscription list for display.
    #[must_use]
    pub fn format_subscriptions(&self, subscriptions: &[Subscription]) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(subscriptions).unwrap_or_default()
            }
            OutputFormat::Text => {
                let mut output = String::from("Available subscriptions:\n");
                for (index, subscription) in subscriptions.iter().enumerate() {
                    let _ = writeln!(
                        output,
                        "{}. {} ({})",
                        index + 1,
                        subscription.display_name,
                        subscription.subscription_id
                    );
                }
                output
            }
        }
    }

    /// Truncates a string to a maximum length.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.len() <= max_len {
            s.to_string()
        } else {
            format!("{}...", &s[..max_len - 3])
        }
    }
}
