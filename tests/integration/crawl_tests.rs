//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test the full
//! crawl cycle end-to-end, plus in-memory fetchers for the engine properties
//! that are awkward to arrange over real HTTP.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sumi_scan::config::Config;
use sumi_scan::crawler::{
    run_crawl_with_control, Crawler, Document, Fetcher, FunnelOutcome, HtmlDocument,
    HttpFetcher, ResultFunnel, StopReason,
};
use sumi_scan::state::RejectReason;
use sumi_scan::{FetchError, FetchResult};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Document</title>
</head>
<body>
    <a href="http://example-1.com">first</a>
    <a href="https://example-2.ru">second</a>
    <a href="http://example-3.gov">third</a>
</body>
</html>"#;

/// Returns the same parsed page for every URL and counts fetches per URL
#[derive(Default)]
struct FixedPageFetcher {
    calls: Mutex<HashMap<String, usize>>,
}

#[async_trait]
impl Fetcher for FixedPageFetcher {
    async fn get(&self, _cancel: &CancellationToken, url: &str) -> FetchResult<Box<dyn Document>> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;
        Ok(Box::new(sumi_scan::crawler::parse_html(TEST_PAGE)))
    }
}

/// Fails every fetch and counts attempts
#[derive(Default)]
struct AlwaysFailingFetcher {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl Fetcher for AlwaysFailingFetcher {
    async fn get(&self, _cancel: &CancellationToken, url: &str) -> FetchResult<Box<dyn Document>> {
        self.calls.lock().unwrap().push(url.to_string());
        Err(FetchError::Status {
            url: url.to_string(),
            status: 503,
        })
    }
}

/// Layered graph where every page links to every page of the next layer
///
/// Lots of shared children and many concurrent discoveries of each one.
struct LayeredGraphFetcher {
    width: usize,
    calls: Mutex<HashMap<String, usize>>,
}

#[async_trait]
impl Fetcher for LayeredGraphFetcher {
    async fn get(&self, _cancel: &CancellationToken, url: &str) -> FetchResult<Box<dyn Document>> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;

        // Yield so sibling scans interleave with this one
        tokio::task::yield_now().await;

        let layer: usize = url
            .trim_start_matches("https://layer")
            .split('.')
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        let links = (0..self.width)
            .map(|i| format!("https://layer{}.node{}.test", layer + 1, i))
            .collect();
        Ok(Box::new(HtmlDocument::new(format!("Layer {}", layer), links)))
    }
}

fn test_config(url: &str, max_depth: u32, max_results: u32, max_errors: u32) -> Config {
    let mut config = Config::default();
    config.crawler.url = url.to_string();
    config.crawler.max_depth = max_depth;
    config.crawler.max_results = max_results;
    config.crawler.max_errors = max_errors;
    config.timeouts.app_timeout = 10;
    config.timeouts.req_timeout = 2;
    config
}

/// A control channel nobody will write to
///
/// The sender is dropped right away; a closed channel only turns the control
/// arm of the run loop off.
fn no_control() -> mpsc::UnboundedReceiver<sumi_scan::crawler::ControlSignal> {
    let (_tx, rx) = mpsc::unbounded_channel();
    rx
}

#[tokio::test]
async fn test_fixed_document_yields_four_results() {
    let fetcher = Arc::new(FixedPageFetcher::default());
    let config = test_config("https://telegram.org", 3, 100, 100);

    let report = run_crawl_with_control(&config, Arc::clone(&fetcher), None, no_control())
        .await
        .expect("Crawl failed");

    let mut got: Vec<_> = report
        .pages
        .iter()
        .map(|p| format!("url: {}, title: {}", p.url, p.title))
        .collect();
    got.sort();

    let mut expected = vec![
        "url: https://telegram.org, title: Document".to_string(),
        "url: http://example-1.com, title: Document".to_string(),
        "url: https://example-2.ru, title: Document".to_string(),
        "url: http://example-3.gov, title: Document".to_string(),
    ];
    expected.sort();

    assert_eq!(got, expected);
    assert!(report.errors.is_empty());
    assert_eq!(report.stop_reason, StopReason::Exhausted);

    // Every rediscovery of the children was turned away as a duplicate
    assert!(report.stats.rejected(RejectReason::Duplicate) > 0);
    for count in fetcher.calls.lock().unwrap().values() {
        assert_eq!(*count, 1);
    }
}

#[tokio::test]
async fn test_zero_depth_yields_nothing() {
    let fetcher = Arc::new(FixedPageFetcher::default());
    let config = test_config("https://telegram.org", 0, 100, 100);

    let report = run_crawl_with_control(&config, Arc::clone(&fetcher), None, no_control())
        .await
        .expect("Crawl failed");

    assert!(report.pages.is_empty());
    assert!(report.errors.is_empty());
    assert_eq!(report.stats.rejected(RejectReason::Depth), 1);
    assert!(fetcher.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failing_fetcher_stops_at_error_budget() {
    // The seed fails, so nothing recurses: feed the engine several seeds
    let cancel = CancellationToken::new();
    let fetcher = Arc::new(AlwaysFailingFetcher::default());
    let (crawler, stream) = Crawler::new(Arc::clone(&fetcher), 3, cancel.clone());

    let funnel = tokio::spawn(ResultFunnel::new(stream, 10, 3).run(cancel.clone()));
    for i in 0..10 {
        tokio::spawn(crawler.scan(format!("https://down-{}.test", i), 0));
    }

    let report = funnel.await.unwrap();
    assert_eq!(report.outcome, FunnelOutcome::ErrorsExhausted);
    assert_eq!(report.errors.len(), 3);
    assert!(report.pages.is_empty());
    assert!(cancel.is_cancelled());

    // One failure per attempted URL, no recursion
    let snapshot = crawler.stats().snapshot();
    assert_eq!(snapshot.fetched, 0);
    assert_eq!(snapshot.dispatched, 0);
}

#[tokio::test]
async fn test_failing_seed_reports_single_error() {
    let fetcher = Arc::new(AlwaysFailingFetcher::default());
    let config = test_config("https://down.test", 3, 10, 5);

    let report = run_crawl_with_control(&config, Arc::clone(&fetcher), None, no_control())
        .await
        .expect("Crawl failed");

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].url, "https://down.test");
    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_eq!(fetcher.calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_result_budget_stops_run() {
    let fetcher = Arc::new(LayeredGraphFetcher {
        width: 8,
        calls: Mutex::new(HashMap::new()),
    });
    let config = test_config("https://layer0.node0.test", 10, 5, 100);

    let report = run_crawl_with_control(&config, Arc::clone(&fetcher), None, no_control())
        .await
        .expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::ResultBudget);
    assert!(report.budget_exhausted());
    assert_eq!(report.pages.len(), 5);
}

#[tokio::test]
async fn test_shared_children_never_fetched_twice() {
    let fetcher = Arc::new(LayeredGraphFetcher {
        width: 6,
        calls: Mutex::new(HashMap::new()),
    });
    let config = test_config("https://layer0.node0.test", 4, 10_000, 10_000);

    let report = run_crawl_with_control(&config, Arc::clone(&fetcher), None, no_control())
        .await
        .expect("Crawl failed");

    // 1 seed + 6 nodes in each of layers 1..=3
    assert_eq!(report.pages.len(), 1 + 6 * 3);
    assert_eq!(report.stop_reason, StopReason::Exhausted);

    let calls = fetcher.calls.lock().unwrap();
    assert_eq!(calls.len(), 1 + 6 * 3);
    for (url, count) in calls.iter() {
        assert_eq!(*count, 1, "{} fetched {} times", url, count);
    }
}

#[tokio::test]
async fn test_http_crawl_against_mock_server() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<html><head><title>Home</title></head><body>
                    <a href="{}/page1">Page 1</a>
                    <a href="{}/page2">Page 2</a>
                    <a href="/relative">Relative</a>
                    <a href="mailto:someone@example.com">Mail</a>
                    </body></html>"#,
                    base_url, base_url
                ))
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<html><head><title>Page 1</title></head><body>
                    <a href="{}/">Home</a>
                    </body></html>"#,
                    base_url
                ))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = test_config(&format!("{}/", base_url), 3, 100, 100);
    let fetcher = HttpFetcher::new(config.timeouts.request()).expect("Failed to build client");

    let report = run_crawl_with_control(&config, fetcher, None, no_control())
        .await
        .expect("Crawl failed");

    let mut titles: Vec<_> = report.pages.iter().map(|p| p.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, vec!["Home", "Page 1"]);

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].url, format!("{}/page2", base_url));
    assert!(report.errors[0].message.contains("404"));

    assert_eq!(report.stats.rejected(RejectReason::Scheme), 2);
    assert_eq!(report.stop_reason, StopReason::Exhausted);
}

#[tokio::test]
async fn test_http_fetcher_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><title>Slow</title></html>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_millis(300)).expect("Failed to build client");
    let url = format!("{}/slow", mock_server.uri());

    let result = fetcher.get(&CancellationToken::new(), &url).await;
    assert!(matches!(result, Err(FetchError::Timeout { .. })));
}

#[tokio::test]
async fn test_http_fetcher_parses_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TEST_PAGE))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(2)).expect("Failed to build client");
    let cancel = CancellationToken::new();
    let document = fetcher
        .get(&cancel, &format!("{}/", mock_server.uri()))
        .await
        .expect("Fetch failed");

    assert_eq!(document.title(&cancel), "Document");
    assert_eq!(
        document.links(&cancel),
        vec![
            "http://example-1.com".to_string(),
            "https://example-2.ru".to_string(),
            "http://example-3.gov".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_http_fetcher_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(2)).expect("Failed to build client");
    let result = fetcher
        .get(&CancellationToken::new(), &mock_server.uri())
        .await;

    assert!(matches!(
        result,
        Err(FetchError::Status { status: 500, .. })
    ));
}

#[test]
fn test_shipped_config_is_valid() {
    let config = sumi_scan::config::load_config(std::path::Path::new("config/config.toml"))
        .expect("Shipped config should load");

    assert_eq!(config.crawler.url, "https://telegram.org");
    assert_eq!(config.crawler.max_depth, 3);
    assert_eq!(config.timeouts.request(), Duration::from_secs(2));
}
