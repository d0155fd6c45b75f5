//! URL handling module for Listing Harvester
//!
//! This module provides host membership checks, the detail-page URL shape used to
//! recognize listing links, and listing-id extraction.
//!
//! URLs are compared as exact strings everywhere else in the crate: nothing here
//! normalizes case, trailing slashes or query strings.

mod domain;

use once_cell::sync::Lazy;
use regex::Regex;

pub use domain::{belongs_to_host, extract_authority};

/// Trailing short alphanumeric path segment that identifies a listing
static LISTING_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/([a-z0-9]{3,8})/?$").expect("listing id pattern is valid"));

/// The canonical detail-page URL shape for one target host
///
/// A detail URL looks like `scheme://[www.]host/<slug-path>/<id>/` where the id is
/// 3 to 8 alphanumeric characters. Matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct DetailUrlPattern {
    host: String,
    regex: Regex,
}

impl DetailUrlPattern {
    /// Builds the pattern for the given host (e.g. "apartments.com" or "127.0.0.1:8080")
    pub fn new(target_host: &str) -> Result<Self, regex::Error> {
        let pattern = format!(
            r#"(?i)https?://(?:www\.)?{}/[^"'<>\s]+?/[a-z0-9]{{3,8}}/"#,
            regex::escape(target_host)
        );

        Ok(Self {
            host: target_host.to_string(),
            regex: Regex::new(&pattern)?,
        })
    }

    /// The host this pattern was built for
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns every non-overlapping detail URL found in the text
    pub fn find_all<'p, 't>(&'p self, text: &'t str) -> impl Iterator<Item = &'t str> + 'p
    where
        't: 'p,
    {
        self.regex.find_iter(text).map(|m| m.as_str())
    }

    /// Returns true if the text contains a detail URL anywhere
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Extracts the listing id from the end of a detail URL
///
/// # Examples
///
/// ```
/// use listing_harvester::url::listing_id_from_url;
///
/// assert_eq!(
///     listing_id_from_url("https://www.apartments.com/904-pittsburg-ave-winston-salem-nc/ymg5lhs/"),
///     Some("ymg5lhs".to_string())
/// );
/// assert_eq!(listing_id_from_url("https://www.apartments.com/"), None);
/// ```
pub fn listing_id_from_url(url: &str) -> Option<String> {
    LISTING_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
