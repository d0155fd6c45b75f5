use url::Url;

/// Extracts the authority (lowercase host plus explicit port) from a URL
///
/// Default ports are omitted by the `url` crate, so `https://example.com:443/` yields
/// `example.com`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use listing_harvester::url::extract_authority;
///
/// let url = Url::parse("https://WWW.Apartments.com/path").unwrap();
/// assert_eq!(extract_authority(&url), Some("www.apartments.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/path").unwrap();
/// assert_eq!(extract_authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Checks whether a URL string points at the target host or one of its subdomains
///
/// Unparseable URLs never belong to any host.
///
/// # Examples
///
/// ```
/// use listing_harvester::url::belongs_to_host;
///
/// assert!(belongs_to_host("https://www.apartments.com/a-b/abc12/", "apartments.com"));
/// assert!(!belongs_to_host("https://notapartments.com/a-b/abc12/", "apartments.com"));
/// ```
pub fn belongs_to_host(url: &str, target_host: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(authority) = extract_authority(&parsed) else {
        return false;
    };

    let target = target_host.to_lowercase();
    authority == target || authority.ends_with(&format!(".{}", target))
}
