//! Fetch engine
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client (headers, timeout, pool size, proxies, redirects)
//! - Fetching a batch of URLs with a bounded number of requests in flight
//! - Retrying failed attempts with exponential backoff
//!
//! A URL that keeps failing never aborts its batch: it comes back as
//! [`FetchOutcome::Failed`] next to its siblings' results.

use crate::config::{ProxyConfig, Settings};
use crate::{ConfigError, FetchError, ScrapeError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect::Policy, Client, Proxy};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// Error recorded for a URL whose task ended without producing an outcome
const ABORTED_TASK_ERROR: &str = "fetch task aborted";

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct Page {
    /// URL after redirects
    pub final_url: String,
    pub body: String,
}

/// Something that can fetch one page in a single attempt
///
/// Implemented for [`reqwest::Client`]; tests substitute in-memory sources.
#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    /// Fetches `url` once. Network errors and non-success statuses are both errors.
    async fn fetch_page(&self, url: &str) -> Result<Page, FetchError>;
}

#[async_trait]
impl PageSource for Client {
    async fn fetch_page(&self, url: &str) -> Result<Page, FetchError> {
        let response = self
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        Ok(Page { final_url, body })
    }
}

/// Builds the HTTP client shared by every fetch in a run
///
/// # Arguments
///
/// * `settings` - Timeout, pool size and headers come from `settings.http`
/// * `proxies` - Optional per-scheme proxies
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(ScrapeError)` - A header or proxy could not be used, or the client failed to build
///
/// # Example
///
/// ```no_run
/// use listing_harvester::config::{ProxyConfig, Settings};
/// use listing_harvester::crawler::build_http_client;
///
/// let client = build_http_client(&Settings::default(), &ProxyConfig::default()).unwrap();
/// ```
pub fn build_http_client(settings: &Settings, proxies: &ProxyConfig) -> Result<Client, ScrapeError> {
    let mut headers = HeaderMap::new();
    for (name, value) in settings.http.effective_headers() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ConfigError::Validation(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|e| {
                ConfigError::Validation(format!("Invalid value for header '{}': {}", name.as_str(), e))
            })?;
        headers.insert(name, value);
    }

    let mut builder = Client::builder()
        .default_headers(headers)
        .timeout(settings.http.timeout())
        .pool_max_idle_per_host(settings.http.max_connections)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &proxies.http {
        builder = builder.proxy(Proxy::http(proxy)?);
    }
    if let Some(proxy) = &proxies.https {
        builder = builder.proxy(Proxy::https(proxy)?);
    }

    Ok(builder.build()?)
}

/// Concurrency and retry limits for one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Requests allowed in flight at once across the batch
    pub concurrency: usize,
    /// Attempts per URL, including the first
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further failure
    pub backoff_base: Duration,
}

impl FetchPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            concurrency: settings.effective_concurrency(),
            max_attempts: settings.crawler.retry_attempts.max(1),
            backoff_base: settings.crawler.retry_backoff_base(),
        }
    }
}

/// Retry state for one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTask {
    pub url: String,
    /// Attempts made so far (1-indexed once the first attempt starts)
    pub attempt: u32,
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl FetchTask {
    pub fn new(url: impl Into<String>, policy: &FetchPolicy) -> Self {
        Self {
            url: url.into(),
            attempt: 0,
            max_attempts: policy.max_attempts.max(1),
            backoff_base: policy.backoff_base,
        }
    }

    /// Delay before the next attempt: `backoff_base * 2^(attempt - 1)`
    pub fn backoff_delay(&self) -> Duration {
        let exponent = self.attempt.saturating_sub(1);
        let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

/// Terminal result for one URL
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The page was fetched
    Success {
        /// URL as submitted
        url: String,
        /// URL after redirects
        final_url: String,
        body: String,
    },

    /// Every attempt failed
    Failed {
        url: String,
        attempts: u32,
        /// Description of the last failure
        error: String,
    },
}

impl FetchOutcome {
    /// The URL as it was submitted
    pub fn url(&self) -> &str {
        match self {
            FetchOutcome::Success { url, .. } | FetchOutcome::Failed { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

/// Fetches every URL, returning one outcome per submitted URL
///
/// At most `policy.concurrency` attempts are in flight at any moment. A retrying URL
/// gives its slot back while it waits out its backoff and competes for a slot again
/// on the next attempt. Outcomes are returned in completion order.
pub async fn fetch_all<S: PageSource>(
    source: Arc<S>,
    urls: Vec<String>,
    policy: &FetchPolicy,
) -> Vec<FetchOutcome> {
    let semaphore = Arc::new(Semaphore::new(policy.concurrency.max(1)));
    let mut outstanding: HashMap<String, usize> = HashMap::new();
    let mut tasks = JoinSet::new();

    for url in urls {
        *outstanding.entry(url.clone()).or_default() += 1;
        let task = FetchTask::new(url, policy);
        tasks.spawn(run_task(Arc::clone(&source), Arc::clone(&semaphore), task));
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(outcome) => {
                if let Some(count) = outstanding.get_mut(outcome.url()) {
                    *count -= 1;
                    if *count == 0 {
                        outstanding.remove(outcome.url());
                    }
                }
                outcomes.push(outcome);
            }
            Err(e) => tracing::error!("Fetch task did not complete: {}", e),
        }
    }

    // A panicked task still owes its URL an outcome
    for (url, count) in outstanding {
        for _ in 0..count {
            outcomes.push(FetchOutcome::Failed {
                url: url.clone(),
                attempts: 0,
                error: ABORTED_TASK_ERROR.to_string(),
            });
        }
    }

    outcomes
}

async fn run_task<S: PageSource>(
    source: Arc<S>,
    semaphore: Arc<Semaphore>,
    mut task: FetchTask,
) -> FetchOutcome {
    loop {
        task.attempt += 1;

        let result = {
            let _permit = match semaphore.acquire().await {
                Ok(permit) => permit,
                Err(e) => {
                    return FetchOutcome::Failed {
                        url: task.url,
                        attempts: task.attempt - 1,
                        error: e.to_string(),
                    }
                }
            };
            source.fetch_page(&task.url).await
        };

        match result {
            Ok(page) => {
                tracing::debug!("Fetched {} on attempt {}", task.url, task.attempt);
                return FetchOutcome::Success {
                    url: task.url,
                    final_url: page.final_url,
                    body: page.body,
                };
            }
            Err(e) if task.is_exhausted() => {
                tracing::warn!("Giving up on {} after {} attempts: {}", task.url, task.attempt, e);
                return FetchOutcome::Failed {
                    url: task.url,
                    attempts: task.attempt,
                    error: e.to_string(),
                };
            }
            Err(e) => {
                let delay = task.backoff_delay();
                tracing::debug!(
                    "Attempt {}/{} for {} failed ({}); retrying in {:?}",
                    task.attempt,
                    task.max_attempts,
                    task.url,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
