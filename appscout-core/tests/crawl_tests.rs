// Tests for crawl orchestration

use appscout_core::config::{FilterConfig, RecencyWindow, RunConfig, WindowUnit};
use appscout_core::crawl::{CrawlOptions, execute_crawl_with};
use appscout_core::dataset::Dataset;
use appscout_core::error::{ConfigError, CrawlError};
use appscout_scanner::{HttpFetcher, StopReason};
use chrono::NaiveDate;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

fn listing_page(name: &str, released: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|id| format!(r#"<a href="/store/apps/details?id={}">{}</a>"#, id, id))
        .collect();
    format!(
        r#"<html><body><h1 itemprop="name">{}</h1><div class="ClM7O">10K+</div>{}<script>["dappgame_ratings"]]],["{}",1]</script></body></html>"#,
        name, anchors, released
    )
}

async fn mount_listing(server: &MockServer, id: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/store/apps/details"))
        .and(query_param("id", id))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

/// seed -> {a, b}; a is too old, seed and b are recent.
async fn similar_apps_server() -> MockServer {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "com.seed",
        listing_page("Seed App", "Feb 20, 2025", &["com.a", "com.b"]),
    )
    .await;
    mount_listing(&server, "com.a", listing_page("Old App", "Oct 10, 2024", &["com.seed"])).await;
    mount_listing(&server, "com.b", listing_page("New App", "Mar 02, 2025", &["com.a"])).await;
    server
}

fn config(server: &MockServer, output: &Path) -> RunConfig {
    RunConfig {
        seeds: vec![format!("{}/store/apps/details?id=com.seed", server.uri())],
        output: output.display().to_string(),
        request_delay_ms: 0,
        timeout_secs: 5,
        filter: FilterConfig {
            recency: Some(RecencyWindow {
                amount: 3,
                unit: WindowUnit::Months,
                date_format: None,
            }),
            installs: None,
        },
        ..RunConfig::default()
    }
}

fn options(config: RunConfig) -> CrawlOptions {
    CrawlOptions {
        config,
        show_progress_bars: false,
    }
}

// ============================================================================
// End-to-End Crawl Tests
// ============================================================================

#[tokio::test]
async fn test_similar_apps_crawl_writes_recent_listings() {
    let server = similar_apps_server().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("apps.csv");

    let report = execute_crawl_with(
        HttpFetcher::new().unwrap(),
        options(config(&server, &output)),
        today(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(report.summary.visited, 3);
    assert_eq!(report.summary.accepted, 2);
    assert_eq!(report.summary.rejected, 1);
    assert_eq!(report.summary.stop_reason, Some(StopReason::Drained));

    let data = Dataset::from_path(&output).unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data.get("com.seed").unwrap().app_name.as_str(), "Seed App");
    assert_eq!(data.get("com.b").unwrap().install_count.as_str(), "10K+");
    assert!(!data.contains_key("com.a"));
}

#[tokio::test]
async fn test_resume_skips_saved_listings() {
    let server = similar_apps_server().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("apps.csv");

    execute_crawl_with(
        HttpFetcher::new().unwrap(),
        options(config(&server, &output)),
        today(),
        None,
    )
    .await
    .unwrap();

    let mut resumed = config(&server, &output);
    resumed.resume = true;
    let report = execute_crawl_with(HttpFetcher::new().unwrap(), options(resumed), today(), None)
        .await
        .unwrap();

    assert_eq!(report.known_keys, 2);
    assert_eq!(report.summary.accepted, 0);
    assert_eq!(report.summary.rejected, 1);

    let content = std::fs::read_to_string(&output).unwrap();
    assert_eq!(content.lines().count(), 3);
}

#[tokio::test]
async fn test_target_stops_early() {
    let server = similar_apps_server().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("apps.csv");
    let mut cfg = config(&server, &output);
    cfg.target_accepted = Some(1);

    let report = execute_crawl_with(HttpFetcher::new().unwrap(), options(cfg), today(), None)
        .await
        .unwrap();

    assert_eq!(report.summary.accepted, 1);
    assert_eq!(report.summary.stop_reason, Some(StopReason::TargetReached));
}

#[tokio::test]
async fn test_progress_callback_receives_each_node() {
    let server = similar_apps_server().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("apps.csv");
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();

    execute_crawl_with(
        HttpFetcher::new().unwrap(),
        options(config(&server, &output)),
        today(),
        Some(Arc::new(move |line: String| sink.lock().unwrap().push(line))),
    )
    .await
    .unwrap();

    let lines = lines.lock().unwrap();
    assert!(lines.iter().any(|l| l == "saved com.seed"));
    assert!(lines.iter().any(|l| l.starts_with("skipped com.a")));
}

// ============================================================================
// Configuration Error Tests
// ============================================================================

#[tokio::test]
async fn test_invalid_config_aborts_before_fetching() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("apps.csv");
    let mut cfg = config(&server, &output);
    cfg.max_nodes = 0;

    let result = execute_crawl_with(HttpFetcher::new().unwrap(), options(cfg), today(), None).await;

    assert!(matches!(result, Err(CrawlError::Config(ConfigError::Invalid { field: "max_nodes", .. }))));
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_missing_seeds_is_config_error() {
    let dir = TempDir::new().unwrap();
    let cfg = RunConfig {
        output: dir.path().join("apps.csv").display().to_string(),
        ..RunConfig::default()
    };

    let result = execute_crawl_with(HttpFetcher::new().unwrap(), options(cfg), today(), None).await;
    assert!(matches!(result, Err(CrawlError::Config(ConfigError::Invalid { field: "seeds", .. }))));
}
