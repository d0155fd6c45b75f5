use crate::config::types::{CrawlInputs, ProxyConfig, Settings};
use crate::config::validation::{validate_proxies, validate_settings};
use crate::ConfigError;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a settings file from the given path
///
/// Settings are JSON unless the path ends in `.toml`. Every key is optional and falls back
/// to its default.
///
/// # Arguments
///
/// * `path` - Path to the settings file
///
/// # Returns
///
/// * `Ok(Settings)` - Successfully loaded and validated settings
/// * `Err(ConfigError)` - Failed to load, parse, or validate the settings
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use listing_harvester::config::load_settings;
///
/// let settings = load_settings(Path::new("settings.json")).unwrap();
/// println!("Retry attempts: {}", settings.crawler.retry_attempts);
/// ```
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let settings: Settings = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    validate_settings(&settings)?;

    Ok(settings)
}

/// Loads the inputs file listing search and listing URLs
pub fn load_inputs(path: &Path) -> Result<CrawlInputs, ConfigError> {
    read_json(path)
}

/// Loads the proxy file
///
/// A missing file is not an error: it means no proxies are used.
pub fn load_proxies(path: &Path) -> Result<ProxyConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No proxy file at {}, connecting directly", path.display());
        return Ok(ProxyConfig::default());
    }

    let proxies: ProxyConfig = read_json(path)?;
    validate_proxies(&proxies)?;
    Ok(proxies)
}

/// Computes a SHA-256 hash of a file's content
///
/// This is logged at startup so runs can be matched to the settings they used.
///
/// # Arguments
///
/// * `path` - Path to the file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_file_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads settings and returns both the settings and the file hash
pub fn load_settings_with_hash(path: &Path) -> Result<(Settings, String), ConfigError> {
    let settings = load_settings(path)?;
    let hash = compute_file_hash(path)?;
    Ok((settings, hash))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(content.trim())?)
}
