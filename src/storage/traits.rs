//! Storage trait for scrape result histories

use crate::storage::ScrapeResult;
use crate::task::TaskKey;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Keyed, append-only history of scrape results
///
/// Each key's history is ordered by `fetched_at` and capped in length; the
/// oldest results are evicted first once the cap is reached. Implementations
/// must be safe to share between threads: writers to different keys must not
/// block each other, and readers must never observe a partially written result.
///
/// Absent data is not an error: unknown keys have an empty history.
pub trait ResultStore: Send + Sync {
    /// Appends a result to the history of `key`, evicting the oldest on overflow
    fn append(&self, key: &TaskKey, result: ScrapeResult);

    /// Returns the most recent result for `key`
    fn get_latest(&self, key: &TaskKey) -> Option<ScrapeResult>;

    /// Returns the full history for `key`, oldest first (empty if unknown)
    fn get_all(&self, key: &TaskKey) -> Vec<ScrapeResult>;

    /// Returns the result fetched exactly at `at`; no nearest-match fallback
    fn get_at(&self, key: &TaskKey, at: DateTime<Utc>) -> Option<ScrapeResult>;

    /// Returns every history in the store
    fn snapshot(&self) -> BTreeMap<TaskKey, Vec<ScrapeResult>>;

    /// Returns the keys that have at least one result
    fn keys(&self) -> Vec<TaskKey>;

    /// Returns the number of results retained for `key`
    fn len(&self, key: &TaskKey) -> usize;

    /// Returns true if no results are retained for `key`
    fn is_empty(&self, key: &TaskKey) -> bool {
        self.len(key) == 0
    }
}
