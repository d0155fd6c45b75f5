//! Per-run robots.txt cache
//!
//! Each authority's robots.txt is fetched at most once per run with a single attempt.
//! A failed fetch (network error or non-success status) is cached as allow-all.

use crate::crawler::PageSource;
use crate::robots::{product_token, robots_url, RobotsRules};
use crate::url::extract_authority;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Robots rules for one authority along with when they were fetched
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub rules: RobotsRules,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    pub fn new(rules: RobotsRules) -> Self {
        Self {
            rules,
            fetched_at: Utc::now(),
        }
    }
}

/// Lazily fetched robots.txt rules keyed by authority (`host[:port]`)
pub struct RobotsCache<S: PageSource> {
    source: Arc<S>,
    agent: String,
    entries: HashMap<String, CachedRobots>,
}

impl<S: PageSource> RobotsCache<S> {
    /// Creates an empty cache that fetches through `source`
    ///
    /// # Arguments
    ///
    /// * `source` - The page source shared with the fetch engine
    /// * `user_agent` - The full User-Agent header; only its product token is matched
    pub fn new(source: Arc<S>, user_agent: &str) -> Self {
        Self {
            source,
            agent: product_token(user_agent),
            entries: HashMap::new(),
        }
    }

    /// Checks a URL against its site's robots.txt, fetching it on first use
    ///
    /// URLs that cannot be parsed are allowed; the fetch engine reports their failure.
    pub async fn is_allowed(&mut self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return true;
        };
        let Some(authority) = extract_authority(&parsed) else {
            return true;
        };

        if !self.entries.contains_key(&authority) {
            let rules = self.fetch_rules(&parsed).await;
            self.entries.insert(authority.clone(), CachedRobots::new(rules));
        }

        let Some(cached) = self.entries.get(&authority) else {
            return true;
        };

        let allowed = cached.rules.is_allowed(url, &self.agent);
        if !allowed {
            tracing::debug!(
                "{} disallowed for {} by robots.txt fetched at {}",
                url,
                self.agent,
                cached.fetched_at.to_rfc3339()
            );
        }
        allowed
    }

    /// The cached rules for an authority, if its robots.txt has been resolved
    pub fn get(&self, authority: &str) -> Option<&CachedRobots> {
        self.entries.get(authority)
    }

    /// Number of authorities whose robots.txt has been resolved
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    async fn fetch_rules(&self, page: &Url) -> RobotsRules {
        let Some(location) = robots_url(page) else {
            return RobotsRules::allow_all();
        };

        match self.source.fetch_page(&location).await {
            Ok(found) => {
                tracing::debug!("Fetched robots.txt from {}", location);
                RobotsRules::from_content(&found.body)
            }
            Err(e) => {
                tracing::debug!("No usable robots.txt at {} ({}); allowing all", location, e);
                RobotsRules::allow_all()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::Page;
    use crate::FetchError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves one robots.txt body for a single authority and 404 for everything else
    struct RobotsSite {
        robots_at: &'static str,
        body: &'static str,
        requests: AtomicUsize,
    }

    #[async_trait]
    impl PageSource for RobotsSite {
        async fn fetch_page(&self, url: &str) -> Result<Page, FetchError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if url == self.robots_at {
                Ok(Page {
                    final_url: url.to_string(),
                    body: self.body.to_string(),
                })
            } else {
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
            }
        }
    }

    fn site(body: &'static str) -> Arc<RobotsSite> {
        Arc::new(RobotsSite {
            robots_at: "https://www.apartments.com/robots.txt",
            body,
            requests: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_rules_are_fetched_once_per_authority() {
        let source = site("User-agent: *\nDisallow: /search");
        let mut cache = RobotsCache::new(Arc::clone(&source), "Mozilla/5.0");

        assert!(!cache.is_allowed("https://www.apartments.com/search/il").await);
        assert!(cache.is_allowed("https://www.apartments.com/the-lofts/abc123/").await);
        assert!(cache.is_allowed("https://www.apartments.com/other/xyz789/").await);

        assert_eq!(source.requests.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_cached_entry_records_fetch_time() {
        let source = site("User-agent: *\nDisallow: /search");
        let mut cache = RobotsCache::new(Arc::clone(&source), "Mozilla/5.0");

        let before = Utc::now();
        assert!(!cache.is_allowed("https://www.apartments.com/search/il").await);
        let after = Utc::now();

        let cached = cache.get("www.apartments.com").unwrap();
        assert!(cached.fetched_at >= before && cached.fetched_at <= after);
        assert!(cache.get("other.example.com").is_none());
    }

    #[tokio::test]
    async fn test_missing_robots_allows_all() {
        let source = site("User-agent: *\nDisallow: /");
        let mut cache = RobotsCache::new(Arc::clone(&source), "Mozilla/5.0");

        assert!(cache.is_allowed("https://other.example.com/anything").await);
        assert!(cache.is_allowed("https://other.example.com/else").await);
        assert_eq!(source.requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unparseable_url_is_allowed_without_fetching() {
        let source = site("User-agent: *\nDisallow: /");
        let mut cache = RobotsCache::new(Arc::clone(&source), "Mozilla/5.0");

        assert!(cache.is_allowed("not a url").await);
        assert!(cache.is_empty());
        assert_eq!(source.requests.load(Ordering::SeqCst), 0);
    }
}
