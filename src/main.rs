//! ASN-Harvest main entry point
//!
//! This is the command-line interface for the ASN-Harvest crawler.

use anyhow::Context;
use asn_harvest::config::{load_or_default, validate, Config};
use asn_harvest::crawler::crawl;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// ASN-Harvest: map every ASN on bgp.he.net to its owner
///
/// ASN-Harvest reads the bgp.he.net world report, visits every country
/// report it links to, and writes one entry per ASN to a single dataset file.
#[derive(Parser, Debug)]
#[command(name = "asn-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Crawl bgp.he.net country reports into an ASN dataset", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Dataset file to write (overrides output.path)
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Quote ASN keys so the dataset is strict JSON
    #[arg(long)]
    strict_json_keys: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the effective configuration without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("asn_harvest=info,warn"),
            1 => EnvFilter::new("asn_harvest=debug,info"),
            2 => EnvFilter::new("asn_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }

    let mut config = load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(output) = &cli.output {
        config.output.path = output.clone();
    }
    if cli.strict_json_keys {
        config.output.strict_json_keys = true;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== ASN-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  World report: {}", config.world_url());
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  User agent: {}", config.crawler.user_agent);
    println!(
        "  Timeout: {}s (connect {}s)",
        config.crawler.timeout_secs, config.crawler.connect_timeout_secs
    );

    println!("\nOutput:");
    println!("  Dataset: {}", config.output.path);
    println!(
        "  Keys: {}",
        if config.output.strict_json_keys { "quoted" } else { "bare" }
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    let start_time = Instant::now();
    if !quiet {
        println!("Starting...");
    }

    match crawl(config).await {
        Ok(stats) => {
            tracing::info!(
                "Countries: {} discovered, {} without ASN table; {} records written",
                stats.countries_discovered,
                stats.countries_without_table,
                stats.records_written
            );
            if !quiet {
                println!(
                    "Finished in {:.3} seconds",
                    start_time.elapsed().as_secs_f64()
                );
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
