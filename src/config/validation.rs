use crate::config::types::{CrawlerSettings, HttpSettings, ProxyConfig, Settings};
use crate::ConfigError;
use reqwest::header::{HeaderName, HeaderValue};
use url::Url;

const MAX_CONCURRENCY: usize = 256;

/// Validates the entire settings structure
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    validate_http_settings(&settings.http)?;
    validate_crawler_settings(&settings.crawler)?;
    Ok(())
}

/// Validates proxy endpoints
pub fn validate_proxies(proxies: &ProxyConfig) -> Result<(), ConfigError> {
    for (scheme, proxy) in [("http", &proxies.http), ("https", &proxies.https)] {
        let Some(proxy) = proxy else {
            continue;
        };

        let url = Url::parse(proxy).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid {} proxy '{}': {}", scheme, proxy, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Unsupported scheme '{}' for {} proxy",
                url.scheme(),
                scheme
            )));
        }
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_http_settings(config: &HttpSettings) -> Result<(), ConfigError> {
    if !config.timeout_secs.is_finite() || config.timeout_secs <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "http.timeout_secs must be a positive number, got {}",
            config.timeout_secs
        )));
    }

    if config.max_connections < 1 {
        return Err(ConfigError::Validation(
            "http.max_connections must be >= 1".to_string(),
        ));
    }

    for (name, value) in &config.headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ConfigError::Validation(format!("Invalid header name '{}'", name))
        })?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::Validation(format!("Invalid value for header '{}'", name))
        })?;
    }

    Ok(())
}

/// Validates crawler settings
fn validate_crawler_settings(config: &CrawlerSettings) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "crawler.concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(
            "crawler.retry_attempts must be >= 1".to_string(),
        ));
    }

    validate_target_host(&config.target_host)?;

    Ok(())
}

/// Validates the target host (a bare host, optionally with a port)
fn validate_target_host(host: &str) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::Validation(
            "crawler.target_host cannot be empty".to_string(),
        ));
    }

    let (domain, port) = match host.rsplit_once(':') {
        Some((domain, port)) => (domain, Some(port)),
        None => (host, None),
    };

    if let Some(port) = port {
        if port.is_empty() || port.parse::<u16>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Target host '{}' has an invalid port",
                host
            )));
        }
    }

    // Check for invalid characters (this also rejects schemes and paths)
    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "Target host '{}' contains invalid characters",
            host
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
        || domain.contains("..")
    {
        return Err(ConfigError::Validation(format!(
            "Target host '{}' is malformed",
            host
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Target host '{}' must contain at least one dot (e.g., 'apartments.com')",
            host
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_validate_target_host() {
        assert!(validate_target_host("apartments.com").is_ok());
        assert!(validate_target_host("www.apartments.com").is_ok());
        assert!(validate_target_host("127.0.0.1:8080").is_ok());

        assert!(validate_target_host("").is_err());
        assert!(validate_target_host("https://apartments.com").is_err());
        assert!(validate_target_host("apartments.com/path").is_err());
        assert!(validate_target_host("apartments").is_err());
        assert!(validate_target_host(".apartments.com").is_err());
        assert!(validate_target_host("apartments.com:").is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut settings = Settings::default();
        settings.http.timeout_secs = 0.0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_zero_retry_attempts() {
        let mut settings = Settings::default();
        settings.crawler.retry_attempts = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_rejects_bad_header_name() {
        let mut settings = Settings::default();
        settings
            .http
            .headers
            .insert("Bad Header".to_string(), "x".to_string());
        assert!(matches!(
            validate_settings(&settings),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_proxies() {
        let ok = ProxyConfig {
            http: Some("http://proxy.local:8080".to_string()),
            https: Some("https://proxy.local:8443".to_string()),
        };
        assert!(validate_proxies(&ok).is_ok());

        let bad = ProxyConfig {
            http: Some("not a url".to_string()),
            https: None,
        };
        assert!(matches!(
            validate_proxies(&bad),
            Err(ConfigError::InvalidUrl(_))
        ));

        let ftp = ProxyConfig {
            http: None,
            https: Some("ftp://proxy.local".to_string()),
        };
        assert!(validate_proxies(&ftp).is_err());
    }
}
