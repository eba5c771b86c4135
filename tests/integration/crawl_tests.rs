//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the listing site and exercise the
//! full crawl cycle end-to-end: pagination, termination, error propagation,
//! and idempotent persistence.

use roost::config::{Config, CrawlerConfig, OutputConfig, SearchConfig};
use roost::crawler::Crawler;
use roost::storage::{ListingStore, RunStatus, SqliteStorage};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/search/sby/apa";
const RESULTS_PER_PAGE: u32 = 120;

/// Creates a test configuration pointing at the mock server
fn create_test_config(server_uri: &str, db_path: &str) -> Config {
    Config {
        search: SearchConfig {
            base_url: format!("{}{}", server_uri, SEARCH_PATH),
            min_price: 1100,
            max_price: 1800,
            results_per_page: RESULTS_PER_PAGE,
        },
        crawler: CrawlerConfig {
            user_agent: "roost-test/1.0".to_string(),
            request_timeout_secs: 5,
            max_pages: None,
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
    }
}

/// Builds a results page body from listing rows
fn page_body(rows: &[(u32, Option<&str>)]) -> String {
    let mut body = String::from(r#"<html><body><ul class="rows">"#);
    for (pid, price) in rows {
        body.push('\n');
        match price {
            Some(p) => body.push_str(&format!(
                r#"<li class="result-row" data-pid="{pid}"><a class="result-image gallery" href="https://example.org/post/{pid}.html"></a><span class="result-price">{p}</span></li>"#
            )),
            None => body.push_str(&format!(r#"<li class="result-row" data-pid="{pid}"></li>"#)),
        }
    }
    body.push_str("\n</ul></body></html>");
    body
}

/// A page whose container holds only whitespace (end of pagination)
fn empty_page_body() -> String {
    r#"<html><body><ul class="rows">
</ul></body></html>"#
        .to_string()
}

/// Mounts a results page at the given pagination offset
async fn mount_page(server: &MockServer, offset: u64, body: String) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("s", offset.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn temp_db_path(name: &str) -> String {
    format!("/tmp/roost_test_{}_{}.db", name, std::process::id())
}

#[tokio::test]
async fn test_crawl_until_pagination_exhausted() {
    let mock_server = MockServer::start().await;

    // Two pages of results, then an empty page
    mount_page(
        &mock_server,
        0,
        page_body(&[(100, Some("$1,500")), (101, None), (102, Some("$1,200"))]),
    )
    .await;
    mount_page(
        &mock_server,
        u64::from(RESULTS_PER_PAGE),
        page_body(&[(200, Some("$1,750")), (201, Some("$1,100"))]),
    )
    .await;
    mount_page(&mock_server, u64::from(RESULTS_PER_PAGE) * 2, empty_page_body()).await;

    let db_path = temp_db_path("exhausted");
    let _ = std::fs::remove_file(&db_path);

    let config = create_test_config(&mock_server.uri(), &db_path);
    let mut crawler = Crawler::new(config, "test_hash").expect("Failed to create crawler");
    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.listings_inserted, 5);

    let storage = SqliteStorage::new(std::path::Path::new(&db_path)).expect("Failed to open DB");
    assert_eq!(storage.count_listings().unwrap(), 5);

    let listing = storage.get_listing(100).unwrap().expect("listing 100 missing");
    assert_eq!(listing.price.as_deref(), Some("$1,500"));
    assert_eq!(
        listing.url.as_deref(),
        Some("https://example.org/post/100.html")
    );

    // Listing 101 had no price or gallery link; the fields stay unset
    let bare = storage.get_listing(101).unwrap().expect("listing 101 missing");
    assert_eq!(bare.price, None);
    assert_eq!(bare.url, None);

    let run = storage.get_latest_run().unwrap().expect("no run recorded");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.pages_fetched, 3);
    assert_eq!(run.listings_inserted, 5);

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_single_fragment_page_terminates_without_persisting() {
    let mock_server = MockServer::start().await;

    // One fragment is within the emptiness slack; the loop must stop here
    // without storing anything.
    mount_page(&mock_server, 0, page_body(&[(300, Some("$1,300"))])).await;

    let db_path = temp_db_path("single_fragment");
    let _ = std::fs::remove_file(&db_path);

    let config = create_test_config(&mock_server.uri(), &db_path);
    let mut crawler = Crawler::new(config, "test_hash").expect("Failed to create crawler");
    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.pages_fetched, 1);
    assert_eq!(summary.listings_inserted, 0);

    let storage = SqliteStorage::new(std::path::Path::new(&db_path)).expect("Failed to open DB");
    assert_eq!(storage.count_listings().unwrap(), 0);

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_non_200_fetch_stops_crawl_in_error_state() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let db_path = temp_db_path("fetch_error");
    let _ = std::fs::remove_file(&db_path);

    let config = create_test_config(&mock_server.uri(), &db_path);
    let mut crawler = Crawler::new(config, "test_hash").expect("Failed to create crawler");
    let result = crawler.run().await;

    match result {
        Err(roost::CrawlError::Fetch { status, .. }) => assert_eq!(status, 404),
        other => panic!("Expected fetch failure, got {:?}", other),
    }

    let storage = SqliteStorage::new(std::path::Path::new(&db_path)).expect("Failed to open DB");

    // No store writes happened for the failed page
    assert_eq!(storage.count_listings().unwrap(), 0);

    let run = storage.get_latest_run().unwrap().expect("no run recorded");
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.error_message.is_some());

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_unrecognized_template_is_fatal() {
    let mock_server = MockServer::start().await;

    // A 200 page without the listing container is a structural failure, not
    // an empty page.
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><div>redesigned page</div></body></html>"),
        )
        .mount(&mock_server)
        .await;

    let db_path = temp_db_path("template_change");
    let _ = std::fs::remove_file(&db_path);

    let config = create_test_config(&mock_server.uri(), &db_path);
    let mut crawler = Crawler::new(config, "test_hash").expect("Failed to create crawler");
    let result = crawler.run().await;

    assert!(matches!(result, Err(roost::CrawlError::MissingContainer)));

    let storage = SqliteStorage::new(std::path::Path::new(&db_path)).expect("Failed to open DB");
    assert_eq!(storage.count_listings().unwrap(), 0);
    let run = storage.get_latest_run().unwrap().expect("no run recorded");
    assert_eq!(run.status, RunStatus::Failed);

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_recrawl_is_idempotent() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        0,
        page_body(&[(100, Some("$1,500")), (101, None)]),
    )
    .await;
    mount_page(&mock_server, u64::from(RESULTS_PER_PAGE), empty_page_body()).await;

    let db_path = temp_db_path("idempotent");
    let _ = std::fs::remove_file(&db_path);

    let config = create_test_config(&mock_server.uri(), &db_path);

    let mut crawler =
        Crawler::new(config.clone(), "test_hash").expect("Failed to create crawler");
    let first = crawler.run().await.expect("First crawl failed");
    assert_eq!(first.listings_inserted, 2);
    drop(crawler);

    // Second run over the unchanged source: same pages, zero new rows
    let mut crawler = Crawler::new(config, "test_hash").expect("Failed to create crawler");
    let second = crawler.run().await.expect("Second crawl failed");
    assert_eq!(second.pages_fetched, 2);
    assert_eq!(second.listings_inserted, 0);
    drop(crawler);

    let storage = SqliteStorage::new(std::path::Path::new(&db_path)).expect("Failed to open DB");
    assert_eq!(storage.count_listings().unwrap(), 2);

    let run = storage.get_latest_run().unwrap().expect("no run recorded");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.listings_inserted, 0);

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_page_cap_bounds_execution() {
    let mock_server = MockServer::start().await;

    // Every offset returns the same full page; only the cap can stop the loop
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_body(&[
            (100, Some("$1,500")),
            (101, None),
            (102, None),
        ])))
        .mount(&mock_server)
        .await;

    let db_path = temp_db_path("page_cap");
    let _ = std::fs::remove_file(&db_path);

    let mut config = create_test_config(&mock_server.uri(), &db_path);
    config.crawler.max_pages = Some(3);

    let mut crawler = Crawler::new(config, "test_hash").expect("Failed to create crawler");
    let summary = crawler.run().await.expect("Crawl failed");

    assert_eq!(summary.pages_fetched, 3);
    // The same three ids repeat on every page; only the first pass inserts
    assert_eq!(summary.listings_inserted, 3);

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_request_carries_fixed_query_parameters() {
    let mock_server = MockServer::start().await;

    // The mock only matches when the fixed search filters are present, so a
    // completed crawl proves they were sent.
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("hasPic", "1"))
        .and(query_param("bundleDuplicates", "1"))
        .and(query_param("min_price", "1100"))
        .and(query_param("max_price", "1800"))
        .and(query_param("availabilityMode", "0"))
        .and(query_param("sale_date", "all dates"))
        .and(query_param("s", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(empty_page_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let db_path = temp_db_path("query_params");
    let _ = std::fs::remove_file(&db_path);

    let config = create_test_config(&mock_server.uri(), &db_path);
    let mut crawler = Crawler::new(config, "test_hash").expect("Failed to create crawler");
    crawler.run().await.expect("Crawl failed");

    let _ = std::fs::remove_file(&db_path);
}
