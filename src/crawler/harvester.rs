//! Link harvester for search-results pages
//!
//! Two passes are unioned so a link missed by one is still found by the other:
//! - The detail-URL pattern over the raw body, which also catches URLs embedded in
//!   scripts and data attributes
//! - `<a href>` anchors whose href names the target host and matches the pattern
//!
//! URLs are kept as exact strings; differently cased spellings stay distinct.

use crate::url::DetailUrlPattern;
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Extracts candidate listing-detail URLs from one search-results page body
///
/// # Example
///
/// ```
/// use listing_harvester::crawler::extract_detail_links;
/// use listing_harvester::url::DetailUrlPattern;
///
/// let pattern = DetailUrlPattern::new("apartments.com").unwrap();
/// let html = r#"<a href="https://www.apartments.com/the-lofts-springfield-il/abc123/">The Lofts</a>"#;
/// let links = extract_detail_links(html, &pattern);
/// assert!(links.contains("https://www.apartments.com/the-lofts-springfield-il/abc123/"));
/// ```
pub fn extract_detail_links(html: &str, pattern: &DetailUrlPattern) -> HashSet<String> {
    let mut links: HashSet<String> = pattern.find_all(html).map(str::to_string).collect();

    let document = Html::parse_document(html);
    if let Ok(anchors) = Selector::parse("a[href]") {
        let host = pattern.host().to_lowercase();
        for href in document
            .select(&anchors)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
        {
            if href.to_lowercase().contains(&host) && pattern.is_match(href) {
                links.insert(href.to_string());
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> DetailUrlPattern {
        DetailUrlPattern::new("apartments.com").unwrap()
    }

    #[test]
    fn test_raw_and_anchor_passes_are_unioned() {
        let html = r#"
            <html><body>
            <script>var next = "https://www.apartments.com/hidden-gem-il/zz9x/";</script>
            <a href="https://www.apartments.com/the-lofts-springfield-il/abc123/">The Lofts</a>
            </body></html>
        "#;

        let links = extract_detail_links(html, &pattern());

        assert_eq!(links.len(), 2);
        assert!(links.contains("https://www.apartments.com/hidden-gem-il/zz9x/"));
        assert!(links.contains("https://www.apartments.com/the-lofts-springfield-il/abc123/"));
    }

    #[test]
    fn test_same_url_found_twice_is_kept_once() {
        let html = r#"
            <a href="https://www.apartments.com/the-lofts/abc123/">one</a>
            <a href="https://www.apartments.com/the-lofts/abc123/">two</a>
            <div data-url="https://www.apartments.com/the-lofts/abc123/"></div>
        "#;
        let links = extract_detail_links(html, &pattern());
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_case_variants_are_exact_string_distinct() {
        let html = r#"
            <p>https://www.apartments.com/the-lofts/abc123/</p>
            <a href="HTTPS://WWW.APARTMENTS.COM/THE-LOFTS/ABC123/">Lofts</a>
        "#;
        let links = extract_detail_links(html, &pattern());

        assert!(links.contains("https://www.apartments.com/the-lofts/abc123/"));
        assert!(links.contains("HTTPS://WWW.APARTMENTS.COM/THE-LOFTS/ABC123/"));
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_non_detail_and_foreign_links_are_ignored() {
        let html = r#"
            <a href="/the-lofts/abc123/">relative</a>
            <a href="https://www.apartments.com/search/">search</a>
            <a href="https://www.example.com/the-lofts/abc123/">elsewhere</a>
            <a href="mailto:leasing@apartments.com">mail</a>
        "#;
        assert!(extract_detail_links(html, &pattern()).is_empty());
    }

    #[test]
    fn test_empty_page() {
        assert!(extract_detail_links("", &pattern()).is_empty());
    }
}
