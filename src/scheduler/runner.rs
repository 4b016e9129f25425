//! Per-task repeating timer
//!
//! Each [`ActiveTask`] owns one timer loop. On every tick the loop tries to
//! claim the key's in-flight flag; if a previous fetch still holds it the tick
//! is skipped, otherwise the fetch is spawned and the flag is released once its
//! result has been written to the store.

use crate::events::EventSink;
use crate::fetch::ScrapeExecutor;
use crate::storage::ResultStore;
use crate::task::{Task, TaskKey};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Everything a tick needs to run a fetch and record its result
#[derive(Clone)]
pub(crate) struct TickContext {
    pub executor: ScrapeExecutor,
    pub store: Arc<dyn ResultStore>,
    pub events: EventSink,
    pub tracker: TaskTracker,
}

/// Outcome of a single timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tick {
    Dispatched,
    Skipped,
    Cancelled,
}

/// Clears the key's in-flight flag when the fetch holding it finishes
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Cancellation and dispatch state shared between a task's handle and its timer
struct TaskControl {
    cancel: CancellationToken,
    /// Serializes "check cancelled, then dispatch" against cancellation
    gate: Mutex<()>,
    in_flight: Arc<AtomicBool>,
}

impl TaskControl {
    fn try_dispatch(&self, task: &Task, ctx: &TickContext) -> Tick {
        let _gate = self.gate.lock();

        if self.cancel.is_cancelled() {
            return Tick::Cancelled;
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Tick::Skipped;
        }

        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let task = task.clone();
        let ctx_inner = ctx.clone();

        ctx.tracker.spawn(async move {
            let _guard = guard;
            let result = ctx_inner.executor.execute(&task).await;
            let fetched_at = result.fetched_at;
            ctx_inner.store.append(&task.key, result);
            ctx_inner
                .events
                .record(format!("Scraped URL {} @ {}", task.url, fetched_at.to_rfc3339()))
                .await;
        });

        Tick::Dispatched
    }

    fn cancel(&self) {
        let _gate = self.gate.lock();
        self.cancel.cancel();
    }
}

/// Scheduler bookkeeping for one running task
pub struct ActiveTask {
    task: Task,
    generation: u64,
    started_at: DateTime<Utc>,
    control: Arc<TaskControl>,
}

/// Read-only view of an active task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveTaskInfo {
    pub key: TaskKey,
    pub url: String,
    pub interval_secs: u64,
    /// Increases every time a task is started, including replacements
    pub generation: u64,
    pub started_at: DateTime<Utc>,
    /// Whether a fetch for this key is currently in flight
    pub fetching: bool,
}

impl ActiveTask {
    /// Starts the timer loop for `task`
    ///
    /// `in_flight` is the key's in-flight flag; it is shared with any earlier
    /// instance for the same key so that a replacement never overlaps a fetch
    /// the old instance still has running. The first tick fires immediately.
    pub(crate) fn start(
        task: Task,
        generation: u64,
        in_flight: Arc<AtomicBool>,
        ctx: TickContext,
    ) -> Self {
        let control = Arc::new(TaskControl {
            cancel: CancellationToken::new(),
            gate: Mutex::new(()),
            in_flight,
        });

        tokio::spawn(run_timer(task.clone(), generation, Arc::clone(&control), ctx));

        Self {
            task,
            generation,
            started_at: Utc::now(),
            control,
        }
    }

    /// Stops the timer
    ///
    /// Once this returns no further fetches are dispatched for this instance.
    /// A fetch already in flight still completes and writes its result.
    pub fn cancel(&self) {
        self.control.cancel();
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn info(&self) -> ActiveTaskInfo {
        ActiveTaskInfo {
            key: self.task.key.clone(),
            url: self.task.url.clone(),
            interval_secs: self.task.interval_secs,
            generation: self.generation,
            started_at: self.started_at,
            fetching: self.control.in_flight.load(Ordering::Acquire),
        }
    }
}

async fn run_timer(task: Task, generation: u64, control: Arc<TaskControl>, ctx: TickContext) {
    let mut ticker = tokio::time::interval(task.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!(
        "Timer started for {} (generation {}, every {}s)",
        task.url,
        generation,
        task.interval_secs
    );

    loop {
        tokio::select! {
            biased;
            _ = control.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match control.try_dispatch(&task, &ctx) {
            Tick::Dispatched => tracing::trace!("Dispatched fetch for {}", task.url),
            Tick::Skipped => {
                tracing::debug!("Skipping tick for {}: previous fetch still running", task.url)
            }
            Tick::Cancelled => break,
        }
    }

    tracing::debug!("Timer stopped for {} (generation {})", task.url, generation);
}
