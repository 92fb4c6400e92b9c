//! Integration tests for headline fetching and the sentiment gate

use chrono::{TimeZone, Utc};
use confluence::services::fundamental::{
    CryptoPanicHeadlines, FilterDecision, FundamentalFilter, HeadlineSource, MacroCalendarFilter,
};
use confluence::services::market_data::FetchError;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_posts(server: &MockServer, titles: &[&str]) {
    let results: Vec<_> = titles.iter().map(|t| json!({"title": t, "kind": "news"})).collect();
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .and(query_param("auth_token", "secret"))
        .and(query_param("public", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": titles.len(), "results": results})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn headlines_are_titles_in_order() {
    let server = MockServer::start().await;
    mock_posts(&server, &["BTC rallies", "ETH gas spikes", "SOL outage"]).await;

    let source = CryptoPanicHeadlines::with_base_url(server.uri(), "secret");
    let headlines = source.recent_headlines(2).await.unwrap();
    assert_eq!(headlines, vec!["BTC rallies", "ETH gas spikes"]);
}

#[tokio::test]
async fn http_failure_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let source = CryptoPanicHeadlines::with_base_url(server.uri(), "secret");
    assert!(matches!(source.recent_headlines(10).await, Err(FetchError::Status(401))));
}

#[tokio::test]
async fn negative_feed_blocks_bitcoin() {
    let server = MockServer::start().await;
    mock_posts(&server, &["Bitcoin crash wipes out longs", "Regulators ban BTC mining"]).await;

    let filter = MacroCalendarFilter::new(Vec::new())
        .with_headlines(Arc::new(CryptoPanicHeadlines::with_base_url(server.uri(), "secret")));
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    assert_eq!(
        filter.check("BTC/USD", now).await,
        FilterDecision::Block("negative sentiment for BTC".to_string())
    );
}
