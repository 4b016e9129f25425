//! Status event sink
//!
//! Components report human-readable status lines ("Added URL ...",
//! "Scraped URL ...") through an [`EventSink`]. Events pass through a bounded
//! buffer to a single consumer, which writes them to the log stream in the
//! order they were recorded.
//!
//! # Overflow policy
//!
//! When the buffer is full, `record` waits up to the configured overflow wait
//! for space. If none frees up, the new event is dropped and counted in
//! [`EventSink::dropped`]. Events already buffered are never discarded.

use crate::config::EventsConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::SendTimeoutError, error::TrySendError};
use tokio::task::JoinHandle;

/// A single status event
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// When the event was recorded
    pub at: DateTime<Utc>,

    /// Human-readable status line
    pub message: String,
}

/// Producer side of the event buffer; cheap to clone
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::Sender<Event>,
    overflow_wait: Duration,
    dropped: Arc<AtomicU64>,
}

/// Consumer side of the event buffer
pub struct EventReceiver {
    rx: mpsc::Receiver<Event>,
}

impl EventSink {
    /// Creates a sink and its receiver from configuration
    pub fn new(config: &EventsConfig) -> (Self, EventReceiver) {
        Self::with_capacity(config.buffer_capacity, config.overflow_wait())
    }

    /// Creates a sink buffering up to `capacity` events
    pub fn with_capacity(capacity: usize, overflow_wait: Duration) -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let sink = Self {
            tx,
            overflow_wait,
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (sink, EventReceiver { rx })
    }

    /// Records a status event
    ///
    /// Returns `true` if the event was buffered, `false` if it was dropped
    /// because the buffer stayed full or the consumer is gone.
    pub async fn record(&self, message: impl Into<String>) -> bool {
        let event = Event {
            at: Utc::now(),
            message: message.into(),
        };

        let event = match self.tx.try_send(event) {
            Ok(()) => return true,
            Err(TrySendError::Closed(_)) => return false,
            Err(TrySendError::Full(event)) => event,
        };

        match self.tx.send_timeout(event, self.overflow_wait).await {
            Ok(()) => true,
            Err(SendTimeoutError::Closed(_)) => false,
            Err(SendTimeoutError::Timeout(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    "Event buffer full, dropped event ({} dropped so far): {}",
                    dropped,
                    event.message
                );
                false
            }
        }
    }

    /// Number of events dropped because the buffer was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl EventReceiver {
    /// Waits for the next event; `None` once every sink has been dropped
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// Writes every event to the log until all sinks are dropped
    pub async fn drain_to_log(mut self) {
        while let Some(event) = self.next().await {
            tracing::info!(target: "pulse_scraper::events", "{}", event.message);
        }
        tracing::debug!("Event sink closed");
    }

    /// Spawns [`drain_to_log`](Self::drain_to_log) as the single consumer
    pub fn spawn_log_writer(self) -> JoinHandle<()> {
        tokio::spawn(self.drain_to_log())
    }
}
