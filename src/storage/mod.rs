//! Result storage for scrape outcomes
//!
//! This module holds the record produced by every fetch attempt and the keyed,
//! time-ordered history those records are appended to:
//! - [`ScrapeResult`] - one immutable fetch outcome, successful or not
//! - [`ResultStore`] - the storage interface the scheduler writes through
//! - [`MemoryStore`] - the in-process implementation with per-key locking

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::ResultStore;

use crate::task::TaskKey;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The outcome of one fetch-and-extract attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeResult {
    /// Key of the task that produced this result
    pub id: TaskKey,

    /// Page title; empty when the fetch failed or the page has none
    pub title: String,

    /// When the fetch completed
    pub fetched_at: DateTime<Utc>,

    /// The URL that was fetched
    pub url: String,

    /// Response body; empty when the fetch failed
    pub content: String,

    /// Why the fetch failed, if it did
    pub error: Option<FetchFailure>,
}

impl ScrapeResult {
    /// Returns true if the fetch produced content
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Error descriptor recorded on a failed result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,

    /// HTTP status, when the server answered with a non-success status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// Classification of a failed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request did not complete within its timeout
    Timeout,
    /// The connection could not be established (refused, DNS, TLS)
    Unreachable,
    /// The server answered with a non-success status
    HttpStatus,
    /// Any other transport or body-read failure
    Transport,
}
