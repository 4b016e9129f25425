//! HTTP API
//!
//! A thin axum layer over [`TaskIntake`] and the [`ResultStore`]. Routes are
//! mounted under the configured prefix (`/api/v1` by default); `/health`
//! always sits at the root.
//!
//! | Method & Path | Response |
//! |---------------|----------|
//! | `POST /scraper` | task key as text; 400 on invalid input, 503 when the queue is full |
//! | `DELETE /scraper/{id}` | 204; 404 if no task is active |
//! | `GET /result/{id}` | full history, empty list for unknown keys |
//! | `GET /result/{id}/latest` | latest result; 404 if none |
//! | `GET /result/{id}/{time}` | result fetched exactly at an RFC 3339 time; 404 if none |
//! | `GET /results` | every history |
//! | `GET /tasks` | active tasks |

mod errors;
mod handlers;

pub use errors::ApiError;
pub use handlers::SubmitRequest;

use crate::storage::ResultStore;
use crate::task::TaskIntake;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub intake: TaskIntake,
    pub store: Arc<dyn ResultStore>,
}

impl AppState {
    pub fn new(intake: TaskIntake, store: Arc<dyn ResultStore>) -> Self {
        Self { intake, store }
    }
}

/// Builds the application router
///
/// `api_prefix` must be empty or start with `/` and not end with one.
pub fn router(state: AppState, api_prefix: &str) -> Router {
    let api = Router::new()
        .route("/scraper", post(handlers::add_scraper))
        .route("/scraper/{id}", delete(handlers::stop_scraper))
        .route("/result/{id}", get(handlers::get_result))
        .route("/result/{id}/latest", get(handlers::get_latest_result))
        .route("/result/{id}/{time}", get(handlers::get_result_at_time))
        .route("/results", get(handlers::get_all_results))
        .route("/tasks", get(handlers::list_tasks));

    let app = if api_prefix.is_empty() {
        api
    } else {
        Router::new().nest(api_prefix, api)
    };

    app.route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
