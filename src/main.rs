//! Sumi-Scan main entry point
//!
//! This is the command-line interface for the Sumi-Scan discovery crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sumi_scan::config::{load_config_or_default, validate, Config, ConfigOverrides};
use sumi_scan::crawler::{run_crawl, HttpFetcher};
use sumi_scan::output::{generate_markdown_report, print_report, StdoutOutput};
use tracing_subscriber::EnvFilter;

/// Sumi-Scan: a bounded discovery crawler
///
/// Crawls outward from a seed URL and prints `url<TAB>title` for every page
/// found, until a result budget, error budget, or deadline runs out.
/// Send SIGUSR1 to raise the depth bound by 2 while running; SIGINT stops
/// the crawl.
#[derive(Parser, Debug)]
#[command(name = "sumi-scan")]
#[command(version)]
#[command(about = "A bounded discovery crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used if it is missing)
    #[arg(long, value_name = "PATH", default_value = "config/config.toml")]
    config_path: PathBuf,

    /// Seed URL, overriding the configuration file
    #[arg(long)]
    url: Option<String>,

    /// Initial depth bound, overriding the configuration file
    #[arg(long)]
    max_depth: Option<u32>,

    /// Result budget, overriding the configuration file
    #[arg(long)]
    max_results: Option<u32>,

    /// Error budget, overriding the configuration file
    #[arg(long)]
    max_errors: Option<u32>,

    /// Write a markdown summary of the run to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Validate config and show the effective settings without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config_path.display());
    let config = load_settings(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(&config, cli.summary.as_deref(), cli.quiet).await
}

/// Loads the config file, applies command-line overrides and validates the result
fn load_settings(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = load_config_or_default(&cli.config_path)
        .with_context(|| format!("loading {}", cli.config_path.display()))?;
    config.apply_overrides(&ConfigOverrides {
        url: cli.url.clone(),
        max_depth: cli.max_depth,
        max_results: cli.max_results,
        max_errors: cli.max_errors,
    });
    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scan=info,warn"),
            1 => EnvFilter::new("sumi_scan=debug,info"),
            2 => EnvFilter::new("sumi_scan=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Scan Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed URL: {}", config.crawler.url);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max results: {}", config.crawler.max_results);
    println!("  Max errors: {}", config.crawler.max_errors);

    println!("\nTimeouts:");
    println!("  Run deadline: {}s", config.timeouts.app_timeout);
    println!("  Request deadline: {}s", config.timeouts.req_timeout);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    summary_path: Option<&std::path::Path>,
    quiet: bool,
) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(config.timeouts.request())
        .context("building HTTP client")?;

    let report = run_crawl(config, fetcher, Some(Box::new(StdoutOutput)))
        .await
        .context("crawl failed")?;

    if !quiet {
        print_report(&report);
    }

    if let Some(path) = summary_path {
        generate_markdown_report(&report, path)
            .with_context(|| format!("writing summary to {}", path.display()))?;
        tracing::info!("Summary exported to: {}", path.display());
    }

    Ok(())
}
