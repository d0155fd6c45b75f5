//! Configuration module for Listing Harvester
//!
//! This module handles loading, parsing, and validating the settings, inputs and proxy files.
//!
//! # Example
//!
//! ```no_run
//! use listing_harvester::config::load_settings;
//! use std::path::Path;
//!
//! let settings = load_settings(Path::new("settings.json")).unwrap();
//! println!("Crawler will use concurrency: {}", settings.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlInputs, CrawlerSettings, HttpSettings, ProxyConfig, Settings, DEFAULT_TARGET_HOST,
};

// Re-export parser functions
pub use parser::{
    compute_file_hash, load_inputs, load_proxies, load_settings, load_settings_with_hash,
};
pub use validation::{validate_proxies, validate_settings};
