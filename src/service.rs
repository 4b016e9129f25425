//! Service assembly
//!
//! Wires the event sink, fetcher, result store, scheduler and intake together
//! from a [`Config`] and exposes the HTTP router over them.

use crate::config::{validate, Config};
use crate::events::EventSink;
use crate::fetch::{HttpFetcher, PageFetcher, ScrapeExecutor};
use crate::scheduler::{Scheduler, SchedulerHandle};
use crate::server::{self, AppState};
use crate::storage::{MemoryStore, ResultStore};
use crate::task::TaskIntake;
use axum::Router;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A running scraper: scheduler loop, event writer and the shared store
pub struct PulseService {
    intake: TaskIntake,
    store: Arc<dyn ResultStore>,
    scheduler: SchedulerHandle,
    scheduler_task: JoinHandle<()>,
    event_writer: JoinHandle<()>,
    api_prefix: String,
}

impl PulseService {
    /// Starts the service with the reqwest-backed fetcher
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// * `PulseError::Config` - the configuration failed validation
    /// * `PulseError::Reqwest` - the HTTP client could not be built
    pub fn start(config: &Config) -> crate::Result<Self> {
        validate(config)?;
        let fetcher = HttpFetcher::from_config(&config.fetcher)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Starts the service with a caller-supplied fetcher
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Self {
        let (events, event_rx) = EventSink::new(&config.events);
        let event_writer = event_rx.spawn_log_writer();

        let executor = ScrapeExecutor::new(
            fetcher,
            config.fetcher.request_timeout(),
            events.clone(),
        );
        let store: Arc<dyn ResultStore> =
            Arc::new(MemoryStore::new(config.store.max_history_per_key));

        let (scheduler, scheduler_task) =
            Scheduler::spawn(&config.scheduler, executor, Arc::clone(&store), events.clone());
        let intake = TaskIntake::new(scheduler.clone(), events);

        Self {
            intake,
            store,
            scheduler,
            scheduler_task,
            event_writer,
            api_prefix: config.server.api_prefix.clone(),
        }
    }

    pub fn intake(&self) -> &TaskIntake {
        &self.intake
    }

    pub fn store(&self) -> Arc<dyn ResultStore> {
        Arc::clone(&self.store)
    }

    /// Builds the HTTP router over this service
    pub fn router(&self) -> Router {
        let state = AppState::new(self.intake.clone(), self.store());
        server::router(state, &self.api_prefix)
    }

    /// Stops every task, waits for in-flight fetches, then flushes pending events
    ///
    /// Routers built from this service must be dropped first for the event
    /// writer to finish.
    pub async fn shutdown(self) {
        let Self {
            intake,
            store: _,
            scheduler,
            scheduler_task,
            event_writer,
            api_prefix: _,
        } = self;

        scheduler.shutdown().await;
        if let Err(e) = scheduler_task.await {
            tracing::error!("Scheduler task failed: {}", e);
        }

        drop(intake);
        drop(scheduler);
        if let Err(e) = event_writer.await {
            tracing::error!("Event writer failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PulseError;

    #[test]
    fn test_start_rejects_invalid_config() {
        let mut config = Config::default();
        config.store.max_history_per_key = 0;

        let result = PulseService::start(&config);
        assert!(matches!(result, Err(PulseError::Config(_))));
    }
}
