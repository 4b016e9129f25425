//! End-to-end tests through the HTTP API

use super::{create_test_config, delete, get, send, submit};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use pulse_scraper::{fingerprint, PulseService};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = "<html><head><title>Pulse Test Page</title></head><body>hello</body></html>";

async fn mount_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PAGE)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

/// Polls the history endpoint until it holds at least `count` results
async fn wait_for_history(
    router: &axum::Router,
    key: &str,
    count: usize,
) -> Vec<serde_json::Value> {
    let uri = format!("/api/v1/result/{}", key);
    for _ in 0..100 {
        let (status, body) = send(router, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        let history: Vec<serde_json::Value> =
            serde_json::from_str(&body).expect("history is a JSON array");
        if history.len() >= count {
            return history;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("history for {} never reached {} results", key, count);
}

#[tokio::test]
async fn test_submit_then_read_history() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server).await;
    let target = mock_server.uri();

    let service = PulseService::start(&create_test_config()).expect("service starts");
    let router = service.router();

    let submitted_at = Utc::now();
    let (status, key) = send(&router, submit(&target, 1)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(key, fingerprint(&target).as_str());

    let history = wait_for_history(&router, &key, 1).await;
    let first = &history[0];
    assert_eq!(first["id"], key.as_str());
    assert_eq!(first["url"], target.as_str());
    assert_eq!(first["title"], "Pulse Test Page");
    assert!(first["content"].as_str().unwrap().contains("hello"));
    assert!(first.get("error").map_or(true, |e| e.is_null()));

    let fetched_at = DateTime::parse_from_rfc3339(first["fetched_at"].as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc);
    assert!(fetched_at >= submitted_at);

    drop(router);
    service.shutdown().await;
}

#[tokio::test]
async fn test_lookup_by_exact_time() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server).await;
    let target = mock_server.uri();

    let service = PulseService::start(&create_test_config()).expect("service starts");
    let router = service.router();

    let (_, key) = send(&router, submit(&target, 1)).await;
    let history = wait_for_history(&router, &key, 1).await;
    let fetched_at = history[0]["fetched_at"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/result/{}/{}", key, fetched_at);
    let (status, body) = send(&router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let found: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(found["fetched_at"], fetched_at.as_str());

    let (status, body) = send(
        &router,
        get(&format!("/api/v1/result/{}/2099-01-01T00:00:00Z", key)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("error"));

    drop(router);
    service.shutdown().await;
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PAGE)
                .insert_header("content-type", "text/html"),
        )
        .expect(1..)
        .mount(&mock_server)
        .await;

    let service = PulseService::start(&create_test_config()).expect("service starts");
    let router = service.router();

    let (_, key) = send(&router, submit(&mock_server.uri(), 1)).await;
    let history = wait_for_history(&router, &key, 1).await;
    assert_eq!(history[0]["title"], "Pulse Test Page");

    drop(router);
    service.shutdown().await;
}

#[tokio::test]
async fn test_stop_keeps_history_and_lists_tasks() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server).await;
    let target = mock_server.uri();

    let service = PulseService::start(&create_test_config()).expect("service starts");
    let router = service.router();

    let (_, key) = send(&router, submit(&target, 1)).await;

    let (status, body) = send(&router, get("/api/v1/tasks")).await;
    assert_eq!(status, StatusCode::OK);
    let tasks: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["key"], key.as_str());
    assert_eq!(tasks[0]["interval_secs"], 1);

    wait_for_history(&router, &key, 1).await;

    let (status, _) = send(&router, delete(&format!("/api/v1/scraper/{}", key))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, delete(&format!("/api/v1/scraper/{}", key))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&router, get("/api/v1/tasks")).await;
    assert_eq!(body, "[]");

    let (status, body) = send(&router, get(&format!("/api/v1/result/{}/latest", key))).await;
    assert_eq!(status, StatusCode::OK);
    let latest: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(latest["url"], target.as_str());

    drop(router);
    service.shutdown().await;
}

#[tokio::test]
async fn test_snapshot_covers_every_task() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_page(&first).await;
    mount_page(&second).await;

    let service = PulseService::start(&create_test_config()).expect("service starts");
    let router = service.router();

    let (_, key_a) = send(&router, submit(&first.uri(), 1)).await;
    let (_, key_b) = send(&router, submit(&second.uri(), 1)).await;
    assert_ne!(key_a, key_b);

    wait_for_history(&router, &key_a, 1).await;
    wait_for_history(&router, &key_b, 1).await;

    let (status, body) = send(&router, get("/api/v1/results")).await;
    assert_eq!(status, StatusCode::OK);
    let snapshot: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(!snapshot[key_a.as_str()].as_array().unwrap().is_empty());
    assert!(!snapshot[key_b.as_str()].as_array().unwrap().is_empty());

    drop(router);
    service.shutdown().await;
}

#[tokio::test]
async fn test_trailing_slash_url_is_fetched_as_submitted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Docs</title></head></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;
    let target = format!("{}/docs/", mock_server.uri());

    let service = PulseService::start(&create_test_config()).expect("service starts");
    let router = service.router();

    let (status, key) = send(&router, submit(&target, 1)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(key, fingerprint(&format!("{}/docs", mock_server.uri())).as_str());

    let history = wait_for_history(&router, &key, 1).await;
    assert!(history[0].get("error").map_or(true, |e| e.is_null()));
    assert_eq!(history[0]["url"], target.as_str());
    assert_eq!(history[0]["title"], "Docs");

    drop(router);
    service.shutdown().await;
}
