//! Crawler coordinator - main crawl orchestration logic
//!
//! A run has two sequential phases and never loops back:
//! 1. Discovery: fetch every search-results page, harvest detail links, union them with
//!    the explicit listing URLs and keep only URLs on the target host
//! 2. Detail collection: fetch every frontier URL, extract and normalize each page
//!
//! Every frontier URL that reaches phase 2 yields exactly one record. Pages that could
//! not be fetched (or that robots.txt disallows) come back as degraded records.

use crate::config::{CrawlInputs, ProxyConfig, Settings};
use crate::crawler::fetcher::{build_http_client, fetch_all, FetchOutcome, FetchPolicy, PageSource};
use crate::crawler::harvester::extract_detail_links;
use crate::extract::extract_listing;
use crate::listing::{normalize, ListingRecord};
use crate::output::CrawlStatistics;
use crate::robots::RobotsCache;
use crate::url::{belongs_to_host, DetailUrlPattern};
use crate::{ConfigError, Result};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// Error carried by records whose page robots.txt disallows
pub const ROBOTS_DISALLOWED_ERROR: &str = "disallowed by robots.txt";

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// One record per detail URL that reached the detail phase
    pub records: Vec<ListingRecord>,

    /// The detail URLs selected by discovery, in sorted order
    pub frontier: Vec<String>,

    pub stats: CrawlStatistics,
}

/// Main crawler coordinator structure
pub struct Coordinator<S: PageSource> {
    settings: Settings,
    source: Arc<S>,
    policy: FetchPolicy,
    pattern: DetailUrlPattern,
    robots: Option<RobotsCache<S>>,
    stats: CrawlStatistics,
}

impl<S: PageSource> Coordinator<S> {
    /// Creates a coordinator that fetches through `source`
    ///
    /// # Arguments
    ///
    /// * `settings` - Validated crawler settings
    /// * `source` - The page source shared by every fetch in the run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ScrapeError)` - The target host cannot be turned into a detail-URL pattern
    pub fn new(settings: Settings, source: Arc<S>) -> Result<Self> {
        let pattern = DetailUrlPattern::new(&settings.crawler.target_host).map_err(|e| {
            ConfigError::Validation(format!(
                "Cannot build detail URL pattern for '{}': {}",
                settings.crawler.target_host, e
            ))
        })?;

        let robots = settings
            .crawler
            .respect_robots
            .then(|| RobotsCache::new(Arc::clone(&source), &settings.http.user_agent()));

        Ok(Self {
            policy: FetchPolicy::from_settings(&settings),
            settings,
            source,
            pattern,
            robots,
            stats: CrawlStatistics::start(),
        })
    }

    /// Runs both phases to completion
    pub async fn run(mut self, inputs: &CrawlInputs) -> CrawlReport {
        tracing::info!(
            "Starting crawl: {} search URLs, {} listing URLs, target host {}",
            inputs.search_urls.len(),
            inputs.listing_urls.len(),
            self.settings.crawler.target_host
        );

        let frontier = self.discover(inputs).await;
        let frontier: Vec<String> = frontier.into_iter().collect();
        let records = self.collect_details(&frontier).await;

        self.stats.finish();
        tracing::info!(
            "Crawl completed: {} records ({} degraded) in {:.1}s",
            records.len(),
            self.stats.details_degraded,
            self.stats.duration_seconds().unwrap_or_default()
        );

        CrawlReport {
            records,
            frontier,
            stats: self.stats,
        }
    }

    /// Builds the detail URL frontier from the explicit URLs and the search pages
    async fn discover(&mut self, inputs: &CrawlInputs) -> BTreeSet<String> {
        self.stats.search_urls = inputs.search_urls.len();
        self.stats.explicit_listing_urls = inputs.listing_urls.len();

        let mut frontier: BTreeSet<String> = inputs.listing_urls.iter().cloned().collect();

        let mut search_urls = Vec::with_capacity(inputs.search_urls.len());
        for url in &inputs.search_urls {
            if self.is_allowed(url).await {
                search_urls.push(url.clone());
            } else {
                tracing::warn!("Skipping search page {}: {}", url, ROBOTS_DISALLOWED_ERROR);
                self.stats.robots_disallowed += 1;
            }
        }

        if !search_urls.is_empty() {
            tracing::info!("Discovery: fetching {} search pages", search_urls.len());

            let mut harvested: HashSet<String> = HashSet::new();
            for outcome in fetch_all(Arc::clone(&self.source), search_urls, &self.policy).await {
                match outcome {
                    FetchOutcome::Success { url, body, .. } => {
                        self.stats.search_pages_fetched += 1;
                        let links = extract_detail_links(&body, &self.pattern);
                        tracing::debug!("Harvested {} links from {}", links.len(), url);
                        harvested.extend(links);
                    }
                    FetchOutcome::Failed {
                        url,
                        attempts,
                        error,
                    } => {
                        tracing::warn!(
                            "Search page {} failed after {} attempts: {}",
                            url,
                            attempts,
                            error
                        );
                    }
                }
            }

            self.stats.links_harvested = harvested.len();
            frontier.extend(harvested);
        }

        let target_host = &self.settings.crawler.target_host;
        let before = frontier.len();
        frontier.retain(|url| belongs_to_host(url, target_host));
        if frontier.len() < before {
            tracing::info!(
                "Dropped {} URLs outside {}",
                before - frontier.len(),
                target_host
            );
        }

        self.stats.frontier_size = frontier.len();
        tracing::info!("Discovery complete: {} detail URLs", frontier.len());
        frontier
    }

    /// Fetches, extracts and normalizes every frontier URL
    async fn collect_details(&mut self, frontier: &[String]) -> Vec<ListingRecord> {
        if !self.settings.crawler.follow_details {
            tracing::info!("Detail following disabled; skipping {} URLs", frontier.len());
            return Vec::new();
        }
        if frontier.is_empty() {
            return Vec::new();
        }

        let mut records = Vec::with_capacity(frontier.len());
        let mut to_fetch = Vec::with_capacity(frontier.len());
        for url in frontier {
            if self.is_allowed(url).await {
                to_fetch.push(url.clone());
            } else {
                tracing::warn!("Not fetching {}: {}", url, ROBOTS_DISALLOWED_ERROR);
                self.stats.robots_disallowed += 1;
                records.push(ListingRecord::degraded(url.clone(), ROBOTS_DISALLOWED_ERROR));
            }
        }

        tracing::info!("Detail collection: fetching {} pages", to_fetch.len());
        for outcome in fetch_all(Arc::clone(&self.source), to_fetch, &self.policy).await {
            let record = match outcome {
                FetchOutcome::Success { url, body, .. } => normalize(extract_listing(&url, &body)),
                FetchOutcome::Failed { url, error, .. } => ListingRecord::degraded(url, error),
            };
            records.push(record);
        }

        self.stats.details_degraded = records.iter().filter(|r| r.is_degraded()).count();
        self.stats.details_succeeded = records.len() - self.stats.details_degraded;
        records
    }

    async fn is_allowed(&mut self, url: &str) -> bool {
        match self.robots.as_mut() {
            Some(robots) => robots.is_allowed(url).await,
            None => true,
        }
    }
}

/// Runs a complete crawl over HTTP
///
/// Builds the shared HTTP client from the settings and proxies, then runs discovery
/// and detail collection.
///
/// # Example
///
/// ```no_run
/// use listing_harvester::config::{load_inputs, load_settings, ProxyConfig};
/// use listing_harvester::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = load_settings(Path::new("data/settings.json"))?;
/// let inputs = load_inputs(Path::new("data/inputs.sample.json"))?;
/// let report = run_crawl(settings, &ProxyConfig::default(), &inputs).await?;
/// println!("{} records", report.records.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    settings: Settings,
    proxies: &ProxyConfig,
    inputs: &CrawlInputs,
) -> Result<CrawlReport> {
    let client = build_http_client(&settings, proxies)?;
    let coordinator = Coordinator::new(settings, Arc::new(client))?;
    Ok(coordinator.run(inputs).await)
}
