//! Deploylint - lints a deployment platform space for configuration smells
//!
//! This is the main entry point for the deploylint binary.

use anyhow::Result;
use clap::Parser;
use deploylint_checks::CheckRegistry;
use deploylint_client::{ClientConfig, PlatformClient};
use deploylint_common::{init_logging, Config, LogFormat};
use deploylint_core::Severity;
use deploylint_engine::{CheckExecutor, ExecutorConfig, PlainReporter};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Deploylint space auditor
#[derive(Parser, Debug)]
#[command(name = "deploylint")]
#[command(version)]
#[command(about = "Audits a deployment platform space for configuration smells", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "deploylint.toml")]
    config: String,

    /// Platform base URL (overrides config)
    #[arg(long)]
    url: Option<String>,

    /// API key (overrides config; prefer DEPLOYLINT_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Space id to audit (overrides config)
    #[arg(long)]
    space: Option<String>,

    /// Comma-separated check ids to skip
    #[arg(long)]
    skip: Option<String>,

    /// Comma-separated check ids to run exclusively
    #[arg(long)]
    only: Option<String>,

    /// Minimum severity itemized in the report (ok, warning, error)
    #[arg(long)]
    min_severity: Option<String>,

    /// Maximum checks executing at once
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Log level (trace, debug, info, warn, error; overrides config)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json, compact; overrides config)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config_file_found = std::path::Path::new(&args.config).exists();
    let config = if config_file_found {
        Config::from_file(&args.config)?
    } else {
        Config::default()
    };

    let mut config = config.merge_env();
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }

    init_logging(&config.logging.level, LogFormat::parse(&config.logging.format));

    info!("deploylint {}", env!("CARGO_PKG_VERSION"));
    if !config_file_found {
        info!("Config file not found, using defaults");
    }

    // CLI flags win over file and environment
    if let Some(url) = args.url {
        config.server.url = url;
    }
    if let Some(api_key) = args.api_key {
        config.server.api_key = Some(api_key);
    }
    if let Some(space) = args.space {
        config.server.space = space;
    }
    if let Some(skip) = args.skip {
        config.checks.skip = skip;
    }
    if let Some(only) = args.only {
        config.checks.only = only;
    }
    if let Some(min_severity) = args.min_severity {
        config.report.min_severity = min_severity;
    }
    if let Some(max_concurrency) = args.max_concurrency {
        config.executor.max_concurrency = max_concurrency;
    }

    config.validate()?;

    let min_severity =
        Severity::from_str(&config.report.min_severity).map_err(anyhow::Error::msg)?;

    info!("Platform endpoint: {}", config.server.url);
    info!("Space: {}", config.server.space);

    let client_config = ClientConfig::new(
        config.server.url.clone(),
        config.server.api_key.clone().unwrap_or_default(),
        config.server.space.clone(),
    )
    .with_timeout(Duration::from_secs(config.server.request_timeout_seconds));
    let client = Arc::new(PlatformClient::new(client_config)?);

    let registry = CheckRegistry::new(client, Arc::new(config.checks.clone()));
    let checks = registry.checks();
    if checks.is_empty() {
        info!("No checks selected, nothing to do");
        return Ok(());
    }
    info!("Running {} checks", checks.len());

    let executor = CheckExecutor::with_config(ExecutorConfig {
        max_concurrency: config.executor.max_concurrency,
        attempts: config.executor.attempts,
        record_failed_attempts: config.executor.record_failed_attempts,
        deadline: (config.executor.deadline_seconds > 0)
            .then(|| Duration::from_secs(config.executor.deadline_seconds)),
    });

    let started = Instant::now();
    let results = executor
        .execute_checks(checks, |check, err| {
            // A check out of attempts is reported but never stops the run
            error!(check_id = check.id(), %err, "check is unrecoverable");
            Ok(())
        })
        .await?;

    info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        results = results.len(),
        "run complete"
    );

    let reporter = PlainReporter::new(min_severity);
    println!("{}", reporter.generate(&results));

    Ok(())
}
