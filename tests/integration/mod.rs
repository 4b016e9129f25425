//! Integration tests for Pulse-Scraper
//!
//! These tests start the full service (scheduler, reqwest fetcher, store and
//! router) against wiremock servers and drive it through the HTTP API.

mod api_tests;
mod scheduling_tests;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pulse_scraper::Config;
use tower::util::ServiceExt;

/// Test configuration: defaults with a short submission timeout
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.server.bind_address = "127.0.0.1:0".to_string();
    config.scheduler.submission_timeout_ms = 100;
    config.fetcher.user_agent_name = "TestBot".to_string();
    config.fetcher.user_agent_version = "1.0.0".to_string();
    config
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router never fails");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    (status, String::from_utf8(body.to_vec()).expect("body is UTF-8"))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

pub fn submit(url: &str, time: u64) -> Request<Body> {
    let body = serde_json::json!({ "url": url, "time": time }).to_string();
    Request::builder()
        .method("POST")
        .uri("/api/v1/scraper")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("valid request")
}
