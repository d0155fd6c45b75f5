//! Run statistics
//!
//! Counters collected by the crawl coordinator and printed by the CLI once the
//! records have been written.

use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (None while running)
    pub finished_at: Option<DateTime<Utc>>,

    /// Search-results URLs supplied as input
    pub search_urls: usize,

    /// Search-results pages fetched successfully
    pub search_pages_fetched: usize,

    /// Listing URLs supplied as input
    pub explicit_listing_urls: usize,

    /// Distinct detail URLs harvested from search pages
    pub links_harvested: usize,

    /// Detail URLs left after host filtering
    pub frontier_size: usize,

    /// Detail pages fetched and extracted
    pub details_succeeded: usize,

    /// Detail URLs emitted as degraded records
    pub details_degraded: usize,

    /// URLs skipped or degraded because robots.txt disallowed them
    pub robots_disallowed: usize,
}

impl CrawlStatistics {
    /// Empty counters stamped with the current time
    pub fn start() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            search_urls: 0,
            search_pages_fetched: 0,
            explicit_listing_urls: 0,
            links_harvested: 0,
            frontier_size: 0,
            details_succeeded: 0,
            details_degraded: 0,
            robots_disallowed: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration in seconds, once the run has finished
    pub fn duration_seconds(&self) -> Option<f64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    /// Records written, successful and degraded
    pub fn total_records(&self) -> usize {
        self.details_succeeded + self.details_degraded
    }

    /// Percentage of records that were extracted rather than degraded
    pub fn success_rate(&self) -> f64 {
        let total = self.total_records();
        if total == 0 {
            0.0
        } else {
            (self.details_succeeded as f64 / total as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started:  {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {:.1}s", seconds);
    }
    println!();

    println!("Discovery:");
    println!(
        "  Search pages fetched: {} / {}",
        stats.search_pages_fetched, stats.search_urls
    );
    println!("  Links harvested: {}", stats.links_harvested);
    println!("  Explicit listing URLs: {}", stats.explicit_listing_urls);
    println!("  Detail URLs to fetch: {}", stats.frontier_size);
    println!();

    println!("Details:");
    println!("  Extracted: {}", stats.details_succeeded);
    println!("  Degraded: {}", stats.details_degraded);
    if stats.robots_disallowed > 0 {
        println!("  Disallowed by robots.txt: {}", stats.robots_disallowed);
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} records extracted)",
        stats.success_rate(),
        stats.details_succeeded,
        stats.total_records()
    );
}
