use anyhow::{Context, Result};
use clap::Parser;
use cwprune::{
    confirm, init_tracing, CloudWatchLogsProvider, ConfirmDeletion, FixedDecision,
    LogGroupPruner, NameFilter,
};
use cwprune_config::{LogFormat, PrunerConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// List CloudWatch log groups matching a name substring and delete them on confirmation
#[derive(Parser)]
#[command(name = "cwprune")]
#[command(version)]
#[command(
    about = "List CloudWatch log groups matching a name substring and delete them on confirmation",
    long_about = None
)]
struct Cli {
    /// Substring a log group name must contain (default: aws/lambda)
    #[arg(short, long, value_name = "SUBSTRING")]
    filter: Option<String>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// AWS region (overrides config and the SDK default chain)
    #[arg(long, value_name = "REGION")]
    region: Option<String>,

    /// Named AWS profile
    #[arg(long, value_name = "NAME")]
    profile: Option<String>,

    /// Custom CloudWatch Logs endpoint (e.g. LocalStack)
    #[arg(long, value_name = "URL")]
    endpoint_url: Option<String>,

    /// Only list matching log groups; never prompt or delete
    #[arg(long)]
    dry_run: bool,

    /// Delete every matching log group without asking
    #[arg(short = 'y', long, conflicts_with = "dry_run")]
    yes: bool,

    /// Retries for deletes rejected with "service unavailable"
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Log format: text or json
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Step 1: Load base configuration
    let mut config = if let Some(config_path) = &cli.config {
        PrunerConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        PrunerConfig::load_or_default().context("Failed to load configuration")?
    };

    // Step 2: Apply CLI overrides (highest priority), then validate the merged result
    apply_cli_overrides(&mut config, &cli);
    config.validate().context("Invalid configuration")?;

    // Step 3: Initialize tracing
    init_tracing(&config);

    // Step 4: Run on a single-threaded runtime; deletes are strictly sequential
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(run(config, cli.yes))
}

fn apply_cli_overrides(config: &mut PrunerConfig, cli: &Cli) {
    if let Some(filter) = &cli.filter {
        config.filter.pattern = filter.clone();
    }
    if let Some(region) = &cli.region {
        config.aws.region = Some(region.clone());
    }
    if let Some(profile) = &cli.profile {
        config.aws.profile = Some(profile.clone());
    }
    if let Some(endpoint) = &cli.endpoint_url {
        config.aws.endpoint_url = Some(endpoint.clone());
    }
    if cli.dry_run {
        config.dry_run = true;
    }
    if let Some(max_retries) = cli.max_retries {
        config.retry.max_retries = max_retries;
    }
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log.format = format;
    }
}

async fn run(config: PrunerConfig, assume_yes: bool) -> Result<()> {
    info!(
        pattern = %config.filter.pattern,
        region = config.aws.region.as_deref().unwrap_or("<sdk default>"),
        dry_run = config.dry_run,
        max_retries = config.retry.max_retries,
        "cwprune v{}",
        env!("CARGO_PKG_VERSION")
    );

    let provider = Arc::new(CloudWatchLogsProvider::from_config(&config.aws).await);
    let pruner = LogGroupPruner::from_config(provider, &config)?;
    let filter = NameFilter::contains(config.filter.pattern.clone());

    let mut decisions: Box<dyn ConfirmDeletion> = if assume_yes {
        Box::new(FixedDecision(true))
    } else {
        confirm::console()
    };

    let mut stdout = std::io::stdout().lock();
    let summary = pruner
        .prune_all(&filter, decisions.as_mut(), &mut stdout)
        .await?;

    info!(%summary, "Done");
    Ok(())
}
