//! Crawler module for listing discovery and collection
//!
//! This module contains the core crawling logic, including:
//! - The fetch engine: bounded concurrency with per-URL retry and backoff
//! - Link harvesting from search-results pages
//! - Overall crawl coordination (discovery, then detail collection)

mod coordinator;
mod fetcher;
mod harvester;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, ROBOTS_DISALLOWED_ERROR};
pub use fetcher::{
    build_http_client, fetch_all, FetchOutcome, FetchPolicy, FetchTask, Page, PageSource,
};
pub use harvester::extract_detail_links;

use crate::config::{CrawlInputs, ProxyConfig, Settings};
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the shared HTTP client
/// 2. Fetch search pages and harvest detail links
/// 3. Fetch, extract and normalize every detail page
///
/// # Arguments
///
/// * `settings` - Validated crawler settings
/// * `proxies` - Optional proxies for the HTTP client
/// * `inputs` - Search and listing URLs to start from
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Records and statistics for the run
/// * `Err(ScrapeError)` - The HTTP client could not be built
pub async fn crawl(
    settings: Settings,
    proxies: &ProxyConfig,
    inputs: &CrawlInputs,
) -> Result<CrawlReport> {
    run_crawl(settings, proxies, inputs).await
}
