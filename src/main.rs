//! Listing Harvester main entry point
//!
//! This is the command-line interface for the Listing Harvester crawler.

use anyhow::{Context, Result};
use clap::Parser;
use listing_harvester::config::{
    load_inputs, load_proxies, load_settings_with_hash, CrawlInputs, ProxyConfig, Settings,
};
use listing_harvester::crawler::crawl;
use listing_harvester::output::{export_records, print_statistics};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides `--out`
const OUTPUT_PATH_ENV: &str = "OUTPUT_PATH";

/// Listing Harvester: a real-estate listing crawler
///
/// Harvests listing links from search-results pages, fetches every listing page and
/// writes one normalized record per listing as JSON or CSV.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version = "1.0.0")]
#[command(about = "Real-estate listing crawler", long_about = None)]
struct Cli {
    /// Path to JSON file containing `searchUrls` and/or `listingUrls`
    #[arg(long, value_name = "FILE", default_value = "data/inputs.sample.json")]
    inputs: PathBuf,

    /// Path to settings file (JSON, or TOML by extension)
    #[arg(long, value_name = "FILE", default_value = "config/settings.example.json")]
    settings: PathBuf,

    /// Path to proxies JSON (ignored if missing)
    #[arg(long, value_name = "FILE", default_value = "config/proxies.example.json")]
    proxies: PathBuf,

    /// Output file path; `.csv` writes flattened CSV, anything else JSON
    #[arg(long, value_name = "FILE", default_value = "data/output.json")]
    out: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the input files and show what would be crawled without fetching
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(out) = std::env::var_os(OUTPUT_PATH_ENV).filter(|v| !v.is_empty()) {
        cli.out = PathBuf::from(out);
    }

    tracing::info!("Loading settings from: {}", cli.settings.display());
    let (settings, settings_hash) = load_settings_with_hash(&cli.settings)
        .with_context(|| format!("Failed to load settings from {}", cli.settings.display()))?;
    tracing::info!("Settings loaded successfully (hash: {})", settings_hash);

    let inputs = load_inputs(&cli.inputs)
        .with_context(|| format!("Failed to load inputs from {}", cli.inputs.display()))?;
    let proxies = load_proxies(&cli.proxies)
        .with_context(|| format!("Failed to load proxies from {}", cli.proxies.display()))?;

    if cli.dry_run {
        handle_dry_run(&cli, &settings, &inputs, &proxies);
        return Ok(());
    }

    handle_crawl(&cli, settings, &inputs, &proxies).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,warn"),
            1 => EnvFilter::new("listing_harvester=debug,info"),
            2 => EnvFilter::new("listing_harvester=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective settings and the URLs to crawl
fn handle_dry_run(cli: &Cli, settings: &Settings, inputs: &CrawlInputs, proxies: &ProxyConfig) {
    println!("=== Listing Harvester Dry Run ===\n");

    println!("HTTP:");
    println!("  Timeout: {}s", settings.http.timeout_secs);
    println!("  Max connections: {}", settings.http.max_connections);
    println!("  User agent: {}", settings.http.user_agent());

    println!("\nCrawler:");
    println!("  Target host: {}", settings.crawler.target_host);
    println!("  Concurrency: {} (effective {})", settings.crawler.concurrency, settings.effective_concurrency());
    println!("  Retry attempts: {}", settings.crawler.retry_attempts);
    println!("  Backoff base: {}ms", settings.crawler.retry_backoff_base_ms);
    println!("  Follow details: {}", settings.crawler.follow_details);
    println!("  Respect robots.txt: {}", settings.crawler.respect_robots);

    println!("\nProxies:");
    if proxies.is_empty() {
        println!("  (none)");
    } else {
        println!("  http: {}", proxies.http.as_deref().unwrap_or("-"));
        println!("  https: {}", proxies.https.as_deref().unwrap_or("-"));
    }

    println!("\nSearch URLs ({}):", inputs.search_urls.len());
    for url in &inputs.search_urls {
        println!("  - {}", url);
    }

    println!("\nListing URLs ({}):", inputs.listing_urls.len());
    for url in &inputs.listing_urls {
        println!("  - {}", url);
    }

    println!("\nOutput: {}", cli.out.display());
    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation and writes the records
async fn handle_crawl(
    cli: &Cli,
    settings: Settings,
    inputs: &CrawlInputs,
    proxies: &ProxyConfig,
) -> Result<()> {
    let report = crawl(settings, proxies, inputs)
        .await
        .context("Crawl failed")?;

    export_records(&report.records, &cli.out)
        .with_context(|| format!("Failed to write {}", cli.out.display()))?;

    println!("Wrote {} records to {}", report.records.len(), cli.out.display());
    if !cli.quiet {
        println!();
        print_statistics(&report.stats);
    }

    Ok(())
}
