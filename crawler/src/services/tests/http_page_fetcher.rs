//! Tests for HttpPageFetcher

use serde_json::json;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::error::CrawlerError;
use crate::services::HttpPageFetcher;
use crate::traits::PageFetcher;

fn fetcher(server: &MockServer) -> HttpPageFetcher {
    HttpPageFetcher::new(&format!("{}/extract", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_search_returns_labelled_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/extract/search"))
        .and(query_param("term", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"label": "Acme | acme.com", "url": "https://reviews.example.com/acme.com"},
            {"label": "Acme Rockets | rockets.com", "url": "https://reviews.example.com/rockets.com"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let results = fetcher(&server).fetch_search("acme").await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].label, "Acme | acme.com");
    assert_eq!(results[1].url.path(), "/rockets.com");
}

#[tokio::test]
async fn test_page_parses_records_and_next_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/extract/page"))
        .and(query_param("url", "https://reviews.example.com/acme.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{
                "title": "Great",
                "body": "Solid product",
                "authored_at": "2024-05-03T12:00:00Z",
                "author": "Jane",
                "review_count": 4
            }],
            "next_page": "https://reviews.example.com/acme.com?page=2"
        })))
        .mount(&server)
        .await;

    let url = Url::parse("https://reviews.example.com/acme.com").unwrap();
    let page = fetcher(&server).fetch_page(&url).await.unwrap();

    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].review_count, 4);
    assert_eq!(page.next_page.unwrap().query(), Some("page=2"));
}

#[tokio::test]
async fn test_server_error_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/extract/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = fetcher(&server).fetch_search("acme").await;
    assert!(matches!(result, Err(CrawlerError::FetchError { .. })));
}

#[tokio::test]
async fn test_unparseable_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/extract/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let url = Url::parse("https://reviews.example.com/acme.com").unwrap();
    let result = fetcher(&server).fetch_page(&url).await;
    assert!(matches!(result, Err(CrawlerError::MalformedRecord { .. })));
}

#[test]
fn test_invalid_base_url_rejected() {
    let result = HttpPageFetcher::new("not a url", Duration::from_secs(5));
    assert!(matches!(result, Err(CrawlerError::InvalidUrl { .. })));
}
