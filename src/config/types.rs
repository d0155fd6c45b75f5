use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::time::Duration;

/// Host whose detail pages are harvested when the settings don't name one
pub const DEFAULT_TARGET_HOST: &str = "apartments.com";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0 Safari/537.36 ListingHarvester/1.0";

/// Main settings structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub http: HttpSettings,
    pub crawler: CrawlerSettings,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Per-request timeout in seconds
    pub timeout_secs: f64,

    /// Connection pool size; also caps the number of in-flight requests
    pub max_connections: usize,

    /// Request headers, layered over the default browser-like headers
    pub headers: BTreeMap<String, String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerSettings {
    /// Maximum number of concurrent fetches within a phase
    pub concurrency: usize,

    /// Maximum attempts per URL, including the first one
    pub retry_attempts: u32,

    /// Base delay for exponential backoff between attempts (milliseconds)
    pub retry_backoff_base_ms: u64,

    /// Whether discovered listing URLs are fetched and extracted
    pub follow_details: bool,

    /// Whether robots.txt rules are checked before fetching
    pub respect_robots: bool,

    /// Host whose listing detail pages are collected (e.g. "apartments.com")
    pub target_host: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 25.0,
            max_connections: 40,
            headers: BTreeMap::new(),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    /// Returns the default headers with the configured ones applied on top
    pub fn effective_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::from([
            ("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string()),
            (
                "Accept".to_string(),
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            ),
            ("Accept-Language".to_string(), "en-US,en;q=0.9".to_string()),
        ]);

        for (name, value) in &self.headers {
            // Header names are case-insensitive, so drop any default spelled differently
            headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            headers.insert(name.clone(), value.clone());
        }

        headers
    }

    /// The User-Agent sent with every request
    pub fn user_agent(&self) -> String {
        self.effective_headers()
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("user-agent"))
            .map(|(_, value)| value)
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            concurrency: 12,
            retry_attempts: 3,
            retry_backoff_base_ms: 400,
            follow_details: true,
            respect_robots: false,
            target_host: DEFAULT_TARGET_HOST.to_string(),
        }
    }
}

impl CrawlerSettings {
    pub fn retry_backoff_base(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_base_ms)
    }
}

impl Settings {
    /// Number of fetches allowed in flight at once
    pub fn effective_concurrency(&self) -> usize {
        self.crawler.concurrency.min(self.http.max_connections).max(1)
    }
}

/// URLs to crawl, as read from the inputs file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrawlInputs {
    /// Search-results pages to harvest listing links from
    #[serde(deserialize_with = "null_as_empty")]
    pub search_urls: Vec<String>,

    /// Listing detail pages to fetch directly
    #[serde(deserialize_with = "null_as_empty")]
    pub listing_urls: Vec<String>,
}

/// Optional proxy endpoints per scheme
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxyConfig {
    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.http.max_connections, 40);
        assert_eq!(settings.crawler.concurrency, 12);
        assert_eq!(settings.crawler.retry_attempts, 3);
        assert_eq!(settings.crawler.retry_backoff_base_ms, 400);
        assert!(settings.crawler.follow_details);
        assert!(!settings.crawler.respect_robots);
        assert_eq!(settings.crawler.target_host, "apartments.com");
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"crawler": {"concurrency": 4}}"#).unwrap();
        assert_eq!(settings.crawler.concurrency, 4);
        assert_eq!(settings.crawler.retry_attempts, 3);
        assert_eq!(settings.http.timeout_secs, 25.0);
    }

    #[test]
    fn test_headers_overlay_defaults() {
        let settings: Settings = serde_json::from_str(
            r#"{"http": {"headers": {"user-agent": "TestBot/1.0", "X-Extra": "1"}}}"#,
        )
        .unwrap();
        let headers = settings.http.effective_headers();

        assert_eq!(headers.get("user-agent").map(String::as_str), Some("TestBot/1.0"));
        assert!(!headers.contains_key("User-Agent"));
        assert!(headers.contains_key("Accept"));
        assert!(headers.contains_key("X-Extra"));
        assert_eq!(settings.http.user_agent(), "TestBot/1.0");
    }

    #[test]
    fn test_effective_concurrency_capped_by_pool() {
        let mut settings = Settings::default();
        settings.crawler.concurrency = 50;
        settings.http.max_connections = 8;
        assert_eq!(settings.effective_concurrency(), 8);
    }

    #[test]
    fn test_inputs_accept_missing_and_null() {
        let inputs: CrawlInputs =
            serde_json::from_str(r#"{"searchUrls": null}"#).unwrap();
        assert!(inputs.search_urls.is_empty());
        assert!(inputs.listing_urls.is_empty());

        let inputs: CrawlInputs = serde_json::from_str(
            r#"{"listingUrls": ["https://www.apartments.com/a-b/abc123/"]}"#,
        )
        .unwrap();
        assert_eq!(inputs.listing_urls.len(), 1);
    }
}
