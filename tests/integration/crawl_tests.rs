//! Integration tests for the spider
//!
//! These tests use wiremock to create mock HTTP servers and run full sessions
//! through the real reqwest-backed fetcher.

use site_spider::config::UserAgentConfig;
use site_spider::crawler::{CrawlPolicy, HttpFetcher, ProbeResult, Scheduler, Timeouts};
use site_spider::output::{ChannelSink, CrawlSummary, SpiderEvent};
use site_spider::url::default_restriction;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestSpider".to_string(),
        crawler_version: "1.0".to_string(),
        contact_url: Some("https://example.com/bot".to_string()),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn head_ok(mime: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).insert_header("content-type", mime)
}

/// Runs one session and returns its summary, recorded results and status lines
async fn spider(
    seed: &str,
    policy: CrawlPolicy,
    timeouts: Timeouts,
) -> (CrawlSummary, Vec<ProbeResult>, Vec<String>) {
    let fetcher = HttpFetcher::new(&user_agent()).expect("Failed to build fetcher");
    let (sink, mut events) = ChannelSink::channel();
    let mut scheduler = Scheduler::new(Arc::new(fetcher), Arc::new(sink), timeouts);

    scheduler.start(seed, policy).expect("Failed to start session");
    let summary = scheduler.run().await.expect("Session failed");
    drop(scheduler);

    let mut results = Vec::new();
    let mut statuses = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            SpiderEvent::Page(result) => results.push(result),
            SpiderEvent::Status { message, .. } => statuses.push(message),
        }
    }

    (summary, results, statuses)
}

fn default_policy(seed: &str) -> CrawlPolicy {
    CrawlPolicy::new(&default_restriction(seed)).expect("Failed to compile restriction")
}

#[tokio::test]
async fn test_spider_stays_within_restriction() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let seed = format!("{}/a/", base_url);

    Mock::given(method("HEAD"))
        .respond_with(head_ok("text/html; charset=utf-8"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/"))
        .respond_with(html(&format!(
            r#"<html><body>
            <a href="b">B</a>
            <a href="{}/x">Elsewhere</a>
            <a href="/a/b?x=1">With arguments</a>
            <a href="/outside">Outside</a>
            </body></html>"#,
            other_server.uri()
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/b"))
        .respond_with(html(r#"<html><body><a href="/a/">Back</a></body></html>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Nothing should ever reach the other server
    Mock::given(method("HEAD"))
        .respond_with(head_ok("text/html"))
        .expect(0)
        .mount(&other_server)
        .await;

    let (summary, results, statuses) = spider(&seed, default_policy(&seed), Timeouts::default()).await;

    let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls, vec![seed.clone(), format!("{}/a/b", base_url)]);
    assert_eq!(results[0].referrer, "[root page]");
    assert_eq!(results[1].referrer, seed);
    assert!(results.iter().all(|r| r.status_code == Some(200)));

    assert!(summary.completed);
    assert_eq!(summary.pages_loaded, 2);
    assert_eq!(statuses.last().map(String::as_str), Some("Complete"));
}

#[tokio::test]
async fn test_not_found_is_recorded_but_not_loaded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let seed = format!("{}/a/", base_url);

    Mock::given(method("HEAD"))
        .and(path("/a/"))
        .respond_with(head_ok("text/html"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/"))
        .respond_with(html(r#"<a href="c">Missing</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/a/c"))
        .respond_with(ResponseTemplate::new(404).insert_header("content-type", "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/c"))
        .respond_with(html("never"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (_, results, _) = spider(&seed, default_policy(&seed), Timeouts::default()).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[1].url, format!("{}/a/c", base_url));
    assert_eq!(results[1].status_code, Some(404));
    assert_eq!(results[1].status_label(), "404 Not Found");
}

#[tokio::test]
async fn test_non_text_resources_are_not_loaded() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let seed = format!("{}/a/", base_url);

    Mock::given(method("HEAD"))
        .and(path("/a/"))
        .respond_with(head_ok("text/html"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/"))
        .respond_with(html(r#"<a href="doc.pdf">PDF</a><img src="logo.png">"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/a/doc.pdf"))
        .respond_with(head_ok("application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/a/logo.png"))
        .respond_with(head_ok("image/png"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/doc.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let policy = default_policy(&seed).with_inline(true);
    let (_, results, _) = spider(&seed, policy, Timeouts::default()).await;

    let mimes: Vec<&str> = results.iter().map(|r| r.mime_essence()).collect();
    assert_eq!(mimes, vec!["text/html", "application/pdf", "image/png"]);
}

#[tokio::test]
async fn test_slow_probe_is_recorded_as_unable_to_load() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let seed = format!("{}/a/", base_url);

    Mock::given(method("HEAD"))
        .and(path("/a/"))
        .respond_with(head_ok("text/html"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/"))
        .respond_with(html(r#"<a href="slow">Slow</a><a href="fast">Fast</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/a/slow"))
        .respond_with(head_ok("text/html").set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/a/fast"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let timeouts = Timeouts {
        probe: Duration::from_secs(1),
        load: Duration::from_secs(5),
    };
    let (summary, results, statuses) = spider(&seed, default_policy(&seed), timeouts).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[1].url, format!("{}/a/slow", base_url));
    assert_eq!(results[1].status_code, None);
    assert_eq!(results[1].mime_type, "[???]");
    assert_eq!(results[2].status_code, Some(204));
    assert_eq!(results[2].mime_type, "[none]");
    assert_eq!(summary.probe_timeouts, 1);
    assert!(statuses.contains(&"Aborting HTTP Request".to_string()));
}

#[tokio::test]
async fn test_redirect_target_is_not_visited_twice() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let seed = format!("{}/a/", base_url);

    Mock::given(method("HEAD"))
        .and(path("/a/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/a/new", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/a/new", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("HEAD"))
        .respond_with(head_ok("text/html"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/"))
        .respond_with(html(r#"<a href="old">Old</a><a href="new">New</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/new"))
        .respond_with(html(r#"<a href="more">More</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/more"))
        .respond_with(html("<p>leaf</p>"))
        .mount(&mock_server)
        .await;

    let (_, results, _) = spider(&seed, default_policy(&seed), Timeouts::default()).await;

    let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            seed.clone(),
            format!("{}/a/old", base_url),
            format!("{}/a/more", base_url),
        ]
    );
    assert_eq!(results[2].referrer, format!("{}/a/new", base_url));
}

#[tokio::test]
async fn test_unreachable_host_is_recorded_without_status() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let seed = format!("{}/a/", base_url);

    Mock::given(method("HEAD"))
        .respond_with(head_ok("text/html"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/"))
        .respond_with(html(r#"<a href="http://127.0.0.1:1/gone">Gone</a>"#))
        .mount(&mock_server)
        .await;

    let policy = default_policy(&seed).with_plus_one(true);
    let (summary, results, _) = spider(&seed, policy, Timeouts::default()).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[1].url, "http://127.0.0.1:1/gone");
    assert_eq!(results[1].status_code, None);
    assert_eq!(results[1].mime_type, "[none]");
    assert_eq!(summary.probe_failures, 1);
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/a/", mock_server.uri());

    Mock::given(method("HEAD"))
        .and(path("/a/"))
        .and(header("user-agent", "TestSpider/1.0 (+https://example.com/bot)"))
        .respond_with(head_ok("text/plain"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/"))
        .and(header("user-agent", "TestSpider/1.0 (+https://example.com/bot)"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("plain text, no links")
                .insert_header("content-type", "text/plain"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let (summary, results, _) = spider(&seed, default_policy(&seed), Timeouts::default()).await;

    assert_eq!(results.len(), 1);
    assert_eq!(summary.pages_loaded, 1);
}
