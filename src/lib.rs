//! Listing Harvester: a real-estate listing crawler
//!
//! This crate discovers listing detail pages from search-result pages, fetches them with
//! bounded concurrency and per-URL retries, and extracts a normalized listing record from
//! each page's structured metadata, DOM and text.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod listing;
pub mod output;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for Listing Harvester operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// A single failed attempt to fetch a page
///
/// Every variant is treated as retryable by the fetch engine.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },
}

/// Result type alias for Listing Harvester operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{CrawlInputs, ProxyConfig, Settings};
pub use crawler::{crawl, CrawlReport};
pub use listing::{normalize, ListingDraft, ListingRecord};
