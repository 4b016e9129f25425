//! Request handlers for the scraper API

use crate::scheduler::ActiveTaskInfo;
use crate::server::errors::ApiError;
use crate::server::AppState;
use crate::storage::ScrapeResult;
use crate::task::TaskKey;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Body of `POST /scraper`
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    /// Page to scrape
    pub url: String,

    /// Interval between scrapes, in seconds
    pub time: u64,
}

/// Adds a scrape task and returns its key as plain text
///
/// Example body: `{"url": "https://example.com", "time": 10}`
pub async fn add_scraper(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let key = state.intake.submit(&request.url, request.time).await?;
    Ok(key.to_string())
}

/// Stops a scrape task; its history is kept
pub async fn stop_scraper(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let key = TaskKey::from(id);
    if state.intake.stop(&key).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("No active task {}", key)))
    }
}

/// Returns the full history for a key; unknown keys yield an empty list
pub async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<ScrapeResult>> {
    Json(state.store.get_all(&TaskKey::from(id)))
}

/// Returns the most recent result for a key
pub async fn get_latest_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScrapeResult>, ApiError> {
    let key = TaskKey::from(id);
    state
        .store
        .get_latest(&key)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No results for {}", key)))
}

/// Returns the result fetched exactly at an RFC 3339 timestamp
pub async fn get_result_at_time(
    State(state): State<AppState>,
    Path((id, time)): Path<(String, String)>,
) -> Result<Json<ScrapeResult>, ApiError> {
    let at = DateTime::parse_from_rfc3339(&time)
        .map_err(|e| ApiError::BadRequest(format!("Invalid RFC 3339 timestamp '{}': {}", time, e)))?
        .with_timezone(&Utc);

    let key = TaskKey::from(id);
    state
        .store
        .get_at(&key, at)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No result for {} at {}", key, time)))
}

/// Returns every history in the store
pub async fn get_all_results(
    State(state): State<AppState>,
) -> Json<BTreeMap<TaskKey, Vec<ScrapeResult>>> {
    Json(state.store.snapshot())
}

/// Lists the tasks currently scheduled
pub async fn list_tasks(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActiveTaskInfo>>, ApiError> {
    Ok(Json(state.intake.active_tasks().await?))
}

pub async fn health() -> &'static str {
    "ok"
}
