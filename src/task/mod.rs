//! Scrape task definitions and the intake front door
//!
//! A [`Task`] is a URL plus the interval it should be fetched at, addressed by
//! a [`TaskKey`] derived from the normalized form of the URL. [`TaskIntake`] validates
//! client requests and hands the resulting tasks to the scheduler.

mod intake;

pub use intake::TaskIntake;

use crate::url::{fingerprint, normalize_url, target_url};
use crate::IntakeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Longest accepted task interval (one year)
pub const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Addressing identity of a task and its result history
///
/// Produced by [`fingerprint`]; any string can be wrapped for lookups, unknown
/// keys simply have no history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskKey(String);

impl TaskKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A validated request to fetch `url` every `interval_secs` seconds
///
/// `url` is the submitted URL minus whitespace and fragment; it is what gets
/// fetched and reported. `key` comes from its normalized form, so spellings
/// that differ only by case or slashes address the same task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub key: TaskKey,
    pub url: String,
    pub interval_secs: u64,
}

impl Task {
    /// Validates a raw request and derives its key
    ///
    /// # Errors
    ///
    /// * `IntakeError::InvalidInput` - the URL is empty, malformed or not
    ///   http(s), or the interval is zero or longer than [`MAX_INTERVAL_SECS`]
    ///
    /// # Example
    ///
    /// ```
    /// use pulse_scraper::task::Task;
    ///
    /// let a = Task::new("http://Example.com/docs/", 30).unwrap();
    /// let b = Task::new("http://example.com/docs", 30).unwrap();
    /// assert_eq!(a.url, "http://Example.com/docs/");
    /// assert_eq!(a.key, b.key);
    /// assert!(Task::new("http://example.com", 0).is_err());
    /// ```
    pub fn new(url: &str, interval_secs: u64) -> Result<Self, IntakeError> {
        if interval_secs == 0 {
            return Err(IntakeError::InvalidInput(
                "interval must be at least 1 second".to_string(),
            ));
        }

        if interval_secs > MAX_INTERVAL_SECS {
            return Err(IntakeError::InvalidInput(format!(
                "interval must be at most {} seconds, got {}",
                MAX_INTERVAL_SECS, interval_secs
            )));
        }

        let url = target_url(url)?;
        let key = fingerprint(&normalize_url(&url)?);

        Ok(Self {
            key,
            url,
            interval_secs,
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
