//! Integration tests for `SerpApiClient` and the source adapters.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricecmp_core::{RawValue, SearchQuery, SiteConfig};
use pricecmp_scraper::{
    FixtureAdapter, ScraperError, SerpApiClient, SerpSiteAdapter, SourceAdapter,
};

fn test_client(server: &MockServer) -> SerpApiClient {
    SerpApiClient::with_base_url(
        "test-key",
        5,
        "pricecmp-test/0.1",
        &format!("{}/search.json", server.uri()),
    )
    .expect("client construction should not fail")
}

fn amazon() -> SiteConfig {
    SiteConfig {
        domain: "amazon.in".to_string(),
        name: "Amazon India".to_string(),
        enabled: true,
    }
}

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/fixtures/phones.json")
}

fn three_results() -> serde_json::Value {
    json!({
        "search_metadata": { "status": "Success" },
        "organic_results": [
            {
                "position": 1,
                "title": "Apple iPhone 15 (128 GB) - Black",
                "link": "https://www.amazon.in/dp/B0CHX1W1XY",
                "snippet": "₹69,900 · 4.5 out of 5 stars · 2,431 ratings",
                "thumbnail": "https://img.example/iphone15.jpg"
            },
            {
                "position": 2,
                "title": "Apple iPhone 15 Plus (128 GB) - Blue",
                "link": "https://www.amazon.in/dp/B0CHX3TW6X",
                "rich_snippet": {
                    "top": { "detected_extensions": { "rating": 4.4, "reviews": 812 } }
                }
            },
            {
                "position": 3,
                "title": "Apple iPhone 15 Pro (256 GB)",
                "link": "https://www.amazon.in/dp/B0CHWV2WYK"
            }
        ]
    })
}

// ---------------------------------------------------------------------------
// SerpApiClient::search_site
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_site_sends_site_scoped_query_and_truncates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google"))
        .and(query_param("q", "iPhone 15 price site:amazon.in"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_results()))
        .expect(1)
        .mount(&server)
        .await;

    let results = test_client(&server)
        .search_site("iPhone 15", "amazon.in", 2)
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0].title.as_deref(),
        Some("Apple iPhone 15 (128 GB) - Black")
    );
}

#[tokio::test]
async fn search_site_without_organic_results_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "Google hasn't returned any results for this query."
        })))
        .mount(&server)
        .await;

    let results = test_client(&server)
        .search_site("nonexistent gadget", "snapdeal.com", 5)
        .await
        .expect("empty page is not an error");
    assert!(results.is_empty());
}

#[tokio::test]
async fn search_site_surfaces_api_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid API key." })),
        )
        .mount(&server)
        .await;

    let err = test_client(&server)
        .search_site("iPhone 15", "amazon.in", 5)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::Api(ref msg) if msg == "Invalid API key."),
        "expected Api error, got: {err:?}"
    );
}

#[tokio::test]
async fn search_site_maps_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .search_site("iPhone 15", "amazon.in", 5)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::RateLimited { retry_after_secs: 30 }),
        "expected RateLimited, got: {err:?}"
    );
}

#[tokio::test]
async fn search_site_maps_server_error_without_leaking_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .search_site("iPhone 15", "amazon.in", 5)
        .await
        .unwrap_err();
    match err {
        ScraperError::UnexpectedStatus { status, ref url } => {
            assert_eq!(status, 503);
            assert!(!url.contains("test-key"), "key leaked: {url}");
        }
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn search_site_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .search_site("iPhone 15", "amazon.in", 5)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::Deserialize { .. }),
        "expected Deserialize, got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// SerpSiteAdapter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn serp_adapter_tags_records_with_site_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("q", "iPhone 15 smartphones price site:amazon.in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_results()))
        .mount(&server)
        .await;

    let adapter = SerpSiteAdapter::new(Arc::new(test_client(&server)), amazon());
    let query = SearchQuery::new("iPhone 15", 5).with_category(Some("smartphones".to_string()));
    let records = adapter.fetch(&query).await.expect("fetch should succeed");

    assert_eq!(adapter.source(), "Amazon India");
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.source == "Amazon India"));
    assert_eq!(records[1].rating, Some(RawValue::Number(4.4)));
    assert_eq!(records[1].reviews, Some(RawValue::Number(812.0)));
    assert!(records[2].price.is_none());
}

// ---------------------------------------------------------------------------
// FixtureAdapter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fixture_adapter_filters_by_site_and_limit() {
    let adapter = FixtureAdapter::new(fixture_path(), amazon());
    let records = adapter
        .fetch(&SearchQuery::new("anything", 2))
        .await
        .expect("fixture should load");

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.source == "Amazon India"));
}

#[tokio::test]
async fn fixture_adapter_reports_missing_file() {
    let adapter = FixtureAdapter::new("/nonexistent/pricecmp/fixture.json", amazon());
    let err = adapter
        .fetch(&SearchQuery::new("anything", 5))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::FixtureIo { .. }),
        "expected FixtureIo, got: {err:?}"
    );
}
