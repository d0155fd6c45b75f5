//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! discovery → detail → export cycle end-to-end.

use listing_harvester::config::{CrawlInputs, ProxyConfig, Settings};
use listing_harvester::crawler::{crawl, ROBOTS_DISALLOWED_ERROR};
use listing_harvester::listing::{Range, SCHEMA_FIELDS};
use listing_harvester::output::{export_records, OutputFormat};
use listing_harvester::ListingRecord;
use std::collections::HashMap;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Settings aimed at the mock server with fast retries
fn test_settings(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.crawler.target_host = server.address().to_string();
    settings.crawler.retry_attempts = 2;
    settings.crawler.retry_backoff_base_ms = 1;
    settings.crawler.concurrency = 4;
    settings.http.timeout_secs = 5.0;
    settings
}

fn inputs(search: Vec<String>, listings: Vec<String>) -> CrawlInputs {
    CrawlInputs {
        search_urls: search,
        listing_urls: listings,
    }
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn detail_page(street: &str, rent: &str) -> String {
    format!(
        r#"<html><head>
        <script type="application/ld+json">
        {{"@type": "ApartmentComplex",
          "address": {{"streetAddress": "{}", "addressLocality": "Springfield",
                       "addressRegion": "IL", "postalCode": "62704"}},
          "geo": {{"latitude": "39.78", "longitude": "-89.65"}}}}
        </script></head>
        <body>
            <h1>Ignored heading</h1>
            <p>{} 2 beds 1 bath 850 sq ft</p>
            <a href="tel:217-555-0100">Call</a>
        </body></html>"#,
        street, rent
    )
}

fn by_url(records: &[ListingRecord]) -> HashMap<&str, &ListingRecord> {
    records.iter().map(|r| (r.url.as_str(), r)).collect()
}

#[tokio::test]
async fn test_search_page_to_detail_records() {
    let server = MockServer::start().await;
    let base = server.uri();
    let lofts = format!("{}/the-lofts-springfield-il/abc123/", base);
    let main_st = format!("{}/1-main-st-springfield-il/xk4p2m/", base);

    Mock::given(method("GET"))
        .and(path("/springfield-il/"))
        .respond_with(html(format!(
            r#"<html><body>
                <a href="{}">The Lofts</a>
                <script>window.next = "{}";</script>
                <a href="/about/">About</a>
            </body></html>"#,
            lofts, main_st
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/the-lofts-springfield-il/abc123/"))
        .respond_with(html(detail_page("9 Loft Ln", "$1,250–$1,600/mo")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/1-main-st-springfield-il/xk4p2m/"))
        .respond_with(html(detail_page("1 Main St", "$900/mo")))
        .expect(1)
        .mount(&server)
        .await;

    let report = crawl(
        test_settings(&server),
        &ProxyConfig::default(),
        &inputs(vec![format!("{}/springfield-il/", base)], vec![main_st.clone()]),
    )
    .await
    .unwrap();

    assert_eq!(report.records.len(), 2);
    let records = by_url(&report.records);

    let first = records[lofts.as_str()];
    assert_eq!(first.full_address.as_deref(), Some("9 Loft Ln Springfield IL 62704 US"));
    assert_eq!(first.listing_city.as_deref(), Some("Springfield"));
    assert_eq!(first.monthly_rent, Range::new(1250.0, 1600.0));
    assert_eq!(first.bedrooms, Range::single(2.0));
    assert_eq!(first.listing_id.as_deref(), Some("abc123"));
    assert_eq!(first.phone_number.as_deref(), Some("217-555-0100"));
    assert_eq!(first.location.latitude, Some(39.78));
    assert_eq!(first.property_type.as_deref(), Some("ApartmentComplex"));
    assert!(!first.is_degraded());

    let second = records[main_st.as_str()];
    assert_eq!(second.monthly_rent, Range::single(900.0));
    assert_eq!(second.listing_id.as_deref(), Some("xk4p2m"));

    assert_eq!(report.stats.search_pages_fetched, 1);
    assert_eq!(report.stats.details_succeeded, 2);
    assert_eq!(report.stats.details_degraded, 0);
}

#[tokio::test]
async fn test_failing_detail_becomes_degraded_record() {
    let server = MockServer::start().await;
    let base = server.uri();
    let ok = format!("{}/good-place/abc123/", base);
    let broken = format!("{}/broken-place/zzz999/", base);

    Mock::given(method("GET"))
        .and(path("/good-place/abc123/"))
        .respond_with(html(detail_page("5 Good St", "$1,000/mo")))
        .mount(&server)
        .await;

    // retry_attempts = 2
    Mock::given(method("GET"))
        .and(path("/broken-place/zzz999/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let report = crawl(
        test_settings(&server),
        &ProxyConfig::default(),
        &inputs(vec![], vec![ok.clone(), broken.clone()]),
    )
    .await
    .unwrap();

    assert_eq!(report.records.len(), 2);
    let records = by_url(&report.records);

    assert!(!records[ok.as_str()].is_degraded());

    let degraded = records[broken.as_str()];
    assert!(degraded.is_degraded());
    assert!(degraded.error.as_deref().unwrap().contains("503"));
    assert_eq!(degraded.full_address, None);
    assert!(degraded.amenities.is_empty());

    let json = serde_json::to_value(degraded).unwrap();
    let object = json.as_object().unwrap();
    for key in SCHEMA_FIELDS {
        assert!(object.contains_key(*key), "missing {}", key);
    }
    assert_eq!(object["_error"], serde_json::json!(degraded.error.clone().unwrap()));
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;
    let listing = format!("{}/flaky-place/fl4ky/", server.uri());

    Mock::given(method("GET"))
        .and(path("/flaky-place/fl4ky/"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky-place/fl4ky/"))
        .respond_with(html(detail_page("7 Flaky Rd", "$1,100/mo")))
        .expect(1)
        .mount(&server)
        .await;

    let report = crawl(
        test_settings(&server),
        &ProxyConfig::default(),
        &inputs(vec![], vec![listing]),
    )
    .await
    .unwrap();

    assert_eq!(report.records.len(), 1);
    assert!(!report.records[0].is_degraded());
    assert_eq!(report.records[0].monthly_rent, Range::single(1100.0));
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let server = MockServer::start().await;
    let base = server.uri();
    let old = format!("{}/old-name/abc123/", base);
    let new = format!("{}/new-name/abc123/", base);

    Mock::given(method("GET"))
        .and(path("/old-name/abc123/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", new.as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new-name/abc123/"))
        .respond_with(html(detail_page("2 New St", "$1,300/mo")))
        .expect(1)
        .mount(&server)
        .await;

    let report = crawl(
        test_settings(&server),
        &ProxyConfig::default(),
        &inputs(vec![], vec![old.clone()]),
    )
    .await
    .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].url, old);
    assert_eq!(
        report.records[0].full_address.as_deref(),
        Some("2 New St Springfield IL 62704 US")
    );
}

#[tokio::test]
async fn test_robots_txt_is_respected_when_enabled() {
    let server = MockServer::start().await;
    let base = server.uri();
    let open = format!("{}/open-place/abc123/", base);
    let private = format!("{}/private-place/xyz789/", base);

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private-"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/open-place/abc123/"))
        .respond_with(html(detail_page("3 Open Ave", "$950/mo")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private-place/xyz789/"))
        .respond_with(html(detail_page("4 Private Ave", "$950/mo")))
        .expect(0)
        .mount(&server)
        .await;

    let mut settings = test_settings(&server);
    settings.crawler.respect_robots = true;

    let report = crawl(
        settings,
        &ProxyConfig::default(),
        &inputs(vec![], vec![open.clone(), private.clone()]),
    )
    .await
    .unwrap();

    assert_eq!(report.records.len(), 2);
    let records = by_url(&report.records);
    assert!(!records[open.as_str()].is_degraded());
    assert_eq!(
        records[private.as_str()].error.as_deref(),
        Some(ROBOTS_DISALLOWED_ERROR)
    );
    assert_eq!(report.stats.robots_disallowed, 1);
}

#[tokio::test]
async fn test_follow_details_disabled_fetches_no_details() {
    let server = MockServer::start().await;
    let base = server.uri();
    let lofts = format!("{}/the-lofts/abc123/", base);

    Mock::given(method("GET"))
        .and(path("/search/"))
        .respond_with(html(format!(r#"<a href="{}">Lofts</a>"#, lofts)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/the-lofts/abc123/"))
        .respond_with(html(detail_page("9 Loft Ln", "$1,000/mo")))
        .expect(0)
        .mount(&server)
        .await;

    let mut settings = test_settings(&server);
    settings.crawler.follow_details = false;

    let report = crawl(
        settings,
        &ProxyConfig::default(),
        &inputs(vec![format!("{}/search/", base)], vec![]),
    )
    .await
    .unwrap();

    assert!(report.records.is_empty());
    assert_eq!(report.frontier, vec![lofts]);
}

#[tokio::test]
async fn test_export_json_and_csv() {
    let server = MockServer::start().await;
    let listing = format!("{}/export-place/exp123/", server.uri());

    Mock::given(method("GET"))
        .and(path("/export-place/exp123/"))
        .respond_with(html(detail_page("8 Export St", "$1,250–$1,600/mo")))
        .mount(&server)
        .await;

    let report = crawl(
        test_settings(&server),
        &ProxyConfig::default(),
        &inputs(vec![], vec![listing.clone()]),
    )
    .await
    .unwrap();

    let dir = tempfile::tempdir().unwrap();

    let json_path = dir.path().join("out").join("listings.json");
    assert_eq!(
        export_records(&report.records, &json_path).unwrap(),
        OutputFormat::Json
    );
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed[0]["url"], serde_json::json!(listing));
    assert_eq!(parsed[0]["monthlyRent"]["max"], serde_json::json!(1600.0));
    assert!(parsed[0].get("_error").is_none());

    let csv_path = dir.path().join("out").join("listings.CSV");
    assert_eq!(
        export_records(&report.records, &csv_path).unwrap(),
        OutputFormat::Csv
    );
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let header: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    let row = reader.records().next().unwrap().unwrap();
    let column = |name: &str| {
        let index = header.iter().position(|h| h == name).unwrap();
        row.get(index).unwrap().to_string()
    };

    assert_eq!(column("url"), listing);
    assert_eq!(column("monthlyRent.min"), "1250.0");
    assert_eq!(column("location.latitude"), "39.78");
    assert_eq!(column("amenities"), "[]");
    assert!(!header.iter().any(|h| h == "monthlyRent"));
}
