//! Robots.txt handling module
//!
//! When `crawler.respect_robots` is enabled the orchestrator consults a [`RobotsCache`]
//! before fetching search and detail pages.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsCache};
pub use parser::{product_token, RobotsRules};

use url::Url;

/// Location of the robots.txt governing a page
///
/// Returns `None` for URLs without a host (e.g. `data:` URLs).
///
/// # Example
///
/// ```
/// use listing_harvester::robots::robots_url;
/// use url::Url;
///
/// let page = Url::parse("http://127.0.0.1:8080/the-lofts/abc123/?x=1").unwrap();
/// assert_eq!(robots_url(&page).as_deref(), Some("http://127.0.0.1:8080/robots.txt"));
/// ```
pub fn robots_url(page: &Url) -> Option<String> {
    let host = page.host_str()?;
    let authority = match page.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    Some(format!("{}://{}/robots.txt", page.scheme(), authority))
}
