//! Cloudgate CLI entrypoint.
//!
//! This is the main entrypoint for the cloudgate command-line tool.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use cloudgate_preflight::azure::{
    select_by_index, AzureClient, CredentialSource, StaticSubscriptionResolver,
    SubscriptionResolver,
};
use cloudgate_preflight::classifier::ResourceClassifier;
use cloudgate_preflight::cli::{Cli, Commands, OutputFormatter};
use cloudgate_preflight::config::{ConfigParser, PreflightConfig};
use cloudgate_preflight::error::Result;
use cloudgate_preflight::plan::{PlanParser, DEFAULT_PLAN_FILE};
use cloudgate_preflight::preflight::PreflightOrchestrator;
use cloudgate_preflight::synth::{ArmTemplate, TemplateSynthesizer};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<ExitCode> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Check {
            plan,
            resource_group,
            subscription,
            concurrency,
        } => {
            cmd_check(
                cli.config.as_ref(),
                plan,
                resource_group,
                subscription,
                concurrency,
                &formatter,
            )
            .await
        }
        Commands::Synth { plan } => cmd_synth(cli.config.as_ref(), plan, &formatter),
        Commands::Subscriptions => cmd_subscriptions(&formatter).await,
    }
}

/// Run the preflight validation.
async fn cmd_check(
    config_path: Option<&PathBuf>,
    plan_path: Option<PathBuf>,
    resource_group: Option<String>,
    subscription: Option<String>,
    concurrency: Option<usize>,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let mut config = load_config(config_path)?;

    // CLI flags beat config file and environment
    if let Some(group) = resource_group {
        config.resource_group = group;
    }
    if let Some(id) = subscription {
        config.subscription_id = Some(id);
    }
    if let Some(limit) = concurrency {
        config.concurrency = limit;
    }

    let plan = PlanParser::new().load_file(resolve_plan_path(plan_path))?;
    info!(
        "Loaded plan with {} resource changes (terraform {})",
        plan.resource_changes.len(),
        plan.terraform_version.as_deref().unwrap_or("unknown")
    );

    let client = AzureClient::with_timeout(CredentialSource::from_env()?, config.timeout_secs)?;

    let subscription_id = match &config.subscription_id {
        Some(id) => StaticSubscriptionResolver::new(id).resolve().await?,
        None => prompt_subscription(&client, formatter).await?,
    };
    debug!("Validating against subscription {subscription_id}");

    let orchestrator = PreflightOrchestrator::new(Arc::new(client))
        .with_synthesizer(TemplateSynthesizer::new(&config.default_location))
        .with_concurrency(config.concurrency);

    let report = orchestrator
        .run(&plan, &subscription_id, &config.resource_group)
        .await?;

    eprintln!("{}", formatter.format_report(&report));

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print the synthesized templates without calling Azure.
fn cmd_synth(
    config_path: Option<&PathBuf>,
    plan_path: Option<PathBuf>,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let config = load_config(config_path)?;
    let plan = PlanParser::new().load_file(resolve_plan_path(plan_path))?;

    let classifier = ResourceClassifier::new();
    let synthesizer = TemplateSynthesizer::new(&config.default_location);

    let mut descriptors: Vec<(String, ArmTemplate)> = Vec::new();
    for change in &plan.resource_changes {
        if classifier.is_in_scope(change) {
            descriptors.push((change.address.clone(), synthesizer.synthesize(change)?));
        }
    }

    eprintln!("{}", formatter.format_descriptors(&descriptors));
    Ok(ExitCode::SUCCESS)
}

/// List subscriptions visible to the credentials.
async fn cmd_subscriptions(formatter: &OutputFormatter) -> Result<ExitCode> {
    ConfigParser::new().load_dotenv()?;
    let client = AzureClient::new(CredentialSource::from_env()?)?;
    let subscriptions = client.list_subscriptions().await?;

    eprintln!("{}", formatter.format_subscriptions(&subscriptions));
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Loads configuration with .env and environment overrides applied.
fn load_config(config_path: Option<&PathBuf>) -> Result<PreflightConfig> {
    let parser = ConfigParser::new().with_base_path(".");
    parser.load_dotenv()?;
    parser.load_or_default(config_path)
}

/// Resolves the plan artifact path.
fn resolve_plan_path(plan_path: Option<PathBuf>) -> PathBuf {
    plan_path.unwrap_or_else(|| PathBuf::from(DEFAULT_PLAN_FILE))
}

/// Interactively picks a subscription from the ones the credentials can see.
async fn prompt_subscription(
    client: &AzureClient,
    formatter: &OutputFormatter,
) -> Result<String> {
    let subscriptions = client.list_subscriptions().await?;

    eprintln!("{}", formatter.format_subscriptions(&subscriptions));
    eprint!("Select a subscription [1-{}]: ", subscriptions.len());
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    let selected = select_by_index(&subscriptions, &input)?;
    info!(
        "Selected subscription: {} ({})",
        selected.display_name, selected.subscription_id
    );
    Ok(selected.subscription_id.clone())
}
