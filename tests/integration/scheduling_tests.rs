//! Scheduling behaviour observed through the running service

use super::{create_test_config, get, send, submit};
use axum::http::StatusCode;
use pulse_scraper::storage::FailureKind;
use pulse_scraper::{PulseService, TaskKey};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Polls the store until the key holds at least `count` results
async fn wait_for_results(service: &PulseService, key: &TaskKey, count: usize) {
    let store = service.store();
    for _ in 0..100 {
        if store.get_all(key).len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("{} never reached {} results", key, count);
}

#[tokio::test]
async fn test_unreachable_target_records_failures() {
    let service = PulseService::start(&create_test_config()).expect("service starts");

    // Nothing listens on the discard port.
    let key = service
        .intake()
        .submit("http://127.0.0.1:9", 1)
        .await
        .expect("task accepted");

    wait_for_results(&service, &key, 2).await;

    let history = service.store().get_all(&key);
    assert!(history.len() >= 2);
    for result in &history {
        assert_eq!(result.title, "");
        assert_eq!(result.content, "");
        assert_eq!(result.url, "http://127.0.0.1:9");
        let failure = result.error.as_ref().expect("failure recorded");
        assert!(matches!(
            failure.kind,
            FailureKind::Unreachable | FailureKind::Transport
        ));
    }
    assert!(history.windows(2).all(|w| w[0].fetched_at <= w[1].fetched_at));

    service.shutdown().await;
}

#[tokio::test]
async fn test_error_status_is_recorded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&mock_server)
        .await;

    let service = PulseService::start(&create_test_config()).expect("service starts");
    let key = service
        .intake()
        .submit(&mock_server.uri(), 1)
        .await
        .expect("task accepted");

    wait_for_results(&service, &key, 1).await;

    let latest = service.store().get_latest(&key).expect("a result");
    let failure = latest.error.expect("failure recorded");
    assert_eq!(failure.kind, FailureKind::HttpStatus);
    assert_eq!(failure.status_code, Some(503));
    assert_eq!(latest.title, "");

    service.shutdown().await;
}

#[tokio::test]
async fn test_resubmission_replaces_interval() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<title>Replaced</title>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;
    let target = mock_server.uri();

    let service = PulseService::start(&create_test_config()).expect("service starts");
    let router = service.router();

    let (status, first_key) = send(&router, submit(&target, 3600)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second_key) = send(&router, submit(&format!("{}/", target), 1)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first_key, second_key);

    let (_, body) = send(&router, get("/api/v1/tasks")).await;
    let tasks: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["interval_secs"], 1);
    assert_eq!(tasks[0]["generation"], 2);
    assert_eq!(tasks[0]["url"], format!("{}/", target).as_str());

    // An hourly task would never get this far in a few seconds.
    let key = TaskKey::from(first_key);
    wait_for_results(&service, &key, 3).await;

    drop(router);
    service.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_all_tasks() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let service = PulseService::start(&create_test_config()).expect("service starts");
    let store = service.store();

    let key = service
        .intake()
        .submit(&mock_server.uri(), 1)
        .await
        .expect("task accepted");
    wait_for_results(&service, &key, 1).await;

    service.shutdown().await;

    let settled = store.get_all(&key).len();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(store.get_all(&key).len(), settled);
}
