//! One fetch-and-extract unit of work

use crate::events::EventSink;
use crate::fetch::fetcher::PageFetcher;
use crate::fetch::parser::extract_title;
use crate::storage::ScrapeResult;
use crate::task::Task;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Runs a single scrape for a task and turns every outcome into a [`ScrapeResult`]
#[derive(Clone)]
pub struct ScrapeExecutor {
    fetcher: Arc<dyn PageFetcher>,
    request_timeout: Duration,
    events: EventSink,
}

impl ScrapeExecutor {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        request_timeout: Duration,
        events: EventSink,
    ) -> Self {
        Self {
            fetcher,
            request_timeout,
            events,
        }
    }

    /// Timeout applied to a fetch for a task running every `interval`
    ///
    /// The configured request timeout, capped at 90% of the interval so a fetch
    /// always gives up before its next tick is due.
    pub fn fetch_timeout(&self, interval: Duration) -> Duration {
        let cap = interval.saturating_sub(interval / 10);
        self.request_timeout.min(cap)
    }

    /// Fetches the task's URL and extracts its title
    ///
    /// Never fails: transport errors, timeouts and non-success statuses are
    /// recorded on the result with empty content and title. A missing title is
    /// logged and leaves the title empty. `fetched_at` is taken on completion.
    pub async fn execute(&self, task: &Task) -> ScrapeResult {
        let timeout = self.fetch_timeout(task.interval());
        tracing::trace!("Fetching {} (timeout {:?})", task.url, timeout);

        match self.fetcher.fetch(&task.url, timeout).await {
            Ok(page) => {
                if page.final_url != task.url {
                    tracing::debug!("{} redirected to {}", task.url, page.final_url);
                }

                let title = if page.is_html() {
                    match extract_title(&page.body) {
                        Ok(title) => title,
                        Err(e) => {
                            tracing::debug!("No title for {}: {}", task.url, e);
                            String::new()
                        }
                    }
                } else {
                    tracing::debug!(
                        "Skipping title extraction for {} (content type {:?})",
                        task.url,
                        page.content_type
                    );
                    String::new()
                };

                ScrapeResult {
                    id: task.key.clone(),
                    title,
                    fetched_at: Utc::now(),
                    url: task.url.clone(),
                    content: String::from_utf8_lossy(&page.body).into_owned(),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("Scrape of {} failed: {}", task.url, e);
                self.events
                    .record(format!("Failed to scrape URL {}: {}", task.url, e))
                    .await;

                ScrapeResult {
                    id: task.key.clone(),
                    title: String::new(),
                    fetched_at: Utc::now(),
                    url: task.url.clone(),
                    content: String::new(),
                    error: Some(e.to_failure()),
                }
            }
        }
    }
}
