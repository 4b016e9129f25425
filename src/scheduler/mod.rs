//! Scheduler for running scrape tasks on their intervals
//!
//! This module handles:
//! - The registry of active tasks, owned by a single coordinator loop
//! - Starting, replacing and stopping per-task timers
//! - The bounded command queue between intake and the coordinator
//! - Draining in-flight fetches on shutdown
//!
//! All registry changes go through the coordinator, so "is there a task for
//! this key" and "start one" happen as one step. The scheduler never holds a
//! store lock; fetches write to the store from their own tasks.

mod runner;

pub use runner::{ActiveTask, ActiveTaskInfo};

use crate::config::SchedulerConfig;
use crate::events::EventSink;
use crate::fetch::ScrapeExecutor;
use crate::storage::ResultStore;
use crate::task::{Task, TaskKey};
use crate::IntakeError;
use runner::TickContext;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

/// Messages accepted by the scheduler's coordinator loop
#[derive(Debug)]
pub enum SchedulerCommand {
    /// Start a task, replacing any active task with the same key
    Start(Task),

    /// Stop the task with the given key; replies whether one was active
    Stop {
        key: TaskKey,
        reply: oneshot::Sender<bool>,
    },

    /// Reply with every active task
    List {
        reply: oneshot::Sender<Vec<ActiveTaskInfo>>,
    },

    /// Cancel every task and exit once in-flight fetches have finished
    Shutdown,
}

/// Sending side of the scheduler's command queue; cheap to clone
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<SchedulerCommand>,
    submission_timeout: Duration,
}

impl SchedulerHandle {
    /// Wraps a command sender; sends wait at most `submission_timeout` for room
    pub fn new(tx: mpsc::Sender<SchedulerCommand>, submission_timeout: Duration) -> Self {
        Self {
            tx,
            submission_timeout,
        }
    }

    async fn send(&self, command: SchedulerCommand) -> Result<(), IntakeError> {
        match self.tx.send_timeout(command, self.submission_timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => Err(IntakeError::QueueFull),
            Err(SendTimeoutError::Closed(_)) => Err(IntakeError::SchedulerClosed),
        }
    }

    /// Queues a task to be started (or to replace the active task for its key)
    pub async fn schedule(&self, task: Task) -> Result<(), IntakeError> {
        self.send(SchedulerCommand::Start(task)).await
    }

    /// Stops a task; once this returns the task dispatches no further fetches
    pub async fn stop(&self, key: &TaskKey) -> Result<bool, IntakeError> {
        let (reply, rx) = oneshot::channel();
        self.send(SchedulerCommand::Stop {
            key: key.clone(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| IntakeError::SchedulerClosed)
    }

    /// Returns every active task, ordered by key
    pub async fn active_tasks(&self) -> Result<Vec<ActiveTaskInfo>, IntakeError> {
        let (reply, rx) = oneshot::channel();
        self.send(SchedulerCommand::List { reply }).await?;
        rx.await.map_err(|_| IntakeError::SchedulerClosed)
    }

    /// Asks the scheduler to stop every task and exit
    pub async fn shutdown(&self) {
        if self.tx.send(SchedulerCommand::Shutdown).await.is_err() {
            tracing::debug!("Scheduler already stopped");
        }
    }
}

/// Coordinator owning the registry of active tasks
pub struct Scheduler {
    rx: mpsc::Receiver<SchedulerCommand>,
    registry: HashMap<TaskKey, ActiveTask>,
    /// Per-key in-flight flags, kept across replacements; a stopped key's flag
    /// is dropped once no fetch holds it
    in_flight: HashMap<TaskKey, Arc<AtomicBool>>,
    ctx: TickContext,
    next_generation: u64,
}

impl Scheduler {
    /// Creates a scheduler and the handle used to command it
    ///
    /// The scheduler does nothing until [`run`](Self::run) is awaited or
    /// spawned.
    pub fn new(
        config: &SchedulerConfig,
        executor: ScrapeExecutor,
        store: Arc<dyn ResultStore>,
        events: EventSink,
    ) -> (Self, SchedulerHandle) {
        let (tx, rx) = mpsc::channel(config.submission_queue_capacity.max(1));
        let handle = SchedulerHandle::new(tx, config.submission_timeout());

        let scheduler = Self {
            rx,
            registry: HashMap::new(),
            in_flight: HashMap::new(),
            ctx: TickContext {
                executor,
                store,
                events,
                tracker: TaskTracker::new(),
            },
            next_generation: 1,
        };

        (scheduler, handle)
    }

    /// Creates a scheduler and spawns its coordinator loop
    pub fn spawn(
        config: &SchedulerConfig,
        executor: ScrapeExecutor,
        store: Arc<dyn ResultStore>,
        events: EventSink,
    ) -> (SchedulerHandle, JoinHandle<()>) {
        let (scheduler, handle) = Self::new(config, executor, store, events);
        (handle, tokio::spawn(scheduler.run()))
    }

    /// Runs the coordinator loop
    ///
    /// Exits on [`SchedulerCommand::Shutdown`] or when every handle has been
    /// dropped. Either way all timers are cancelled and in-flight fetches are
    /// allowed to finish writing their results before this returns.
    pub async fn run(mut self) {
        tracing::info!("Scheduler started");

        while let Some(command) = self.rx.recv().await {
            match command {
                SchedulerCommand::Start(task) => self.start_task(task).await,
                SchedulerCommand::Stop { key, reply } => {
                    let stopped = self.stop_task(&key).await;
                    let _ = reply.send(stopped);
                }
                SchedulerCommand::List { reply } => {
                    let _ = reply.send(self.list_tasks());
                }
                SchedulerCommand::Shutdown => break,
            }
        }

        self.shutdown().await;
    }

    async fn start_task(&mut self, task: Task) {
        let key = task.key.clone();
        let in_flight = Arc::clone(
            self.in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AtomicBool::new(false))),
        );

        let generation = self.next_generation;
        self.next_generation += 1;

        let message = match self.registry.remove(&key) {
            Some(previous) => {
                previous.cancel();
                tracing::info!(
                    "Replaced task {} for {}: every {}s -> every {}s",
                    key,
                    task.url,
                    previous.task().interval_secs,
                    task.interval_secs
                );
                format!("Replaced URL {} (every {}s)", task.url, task.interval_secs)
            }
            None => {
                tracing::info!(
                    "Started task {} for {} every {}s",
                    key,
                    task.url,
                    task.interval_secs
                );
                format!("Started URL {} (every {}s)", task.url, task.interval_secs)
            }
        };

        let active = ActiveTask::start(task, generation, in_flight, self.ctx.clone());
        self.registry.insert(key, active);
        self.ctx.events.record(message).await;
    }

    async fn stop_task(&mut self, key: &TaskKey) -> bool {
        match self.registry.remove(key) {
            Some(active) => {
                active.cancel();
                tracing::info!("Stopped task {} for {}", key, active.task().url);
                self.release_idle_flag(key);
                self.ctx
                    .events
                    .record(format!("Stopped URL {}", active.task().url))
                    .await;
                true
            }
            None => {
                tracing::debug!("No active task {} to stop", key);
                false
            }
        }
    }

    /// Forgets a stopped key's in-flight flag unless a fetch still holds it
    ///
    /// The cancelled timer can no longer dispatch, so an idle flag will never
    /// be set again; a held flag stays until the key is resubmitted.
    fn release_idle_flag(&mut self, key: &TaskKey) {
        let idle = self
            .in_flight
            .get(key)
            .is_some_and(|flag| !flag.load(Ordering::Acquire));
        if idle && !self.registry.contains_key(key) {
            self.in_flight.remove(key);
        }
    }

    fn list_tasks(&self) -> Vec<ActiveTaskInfo> {
        let mut tasks: Vec<ActiveTaskInfo> = self.registry.values().map(ActiveTask::info).collect();
        tasks.sort_by(|a, b| a.key.cmp(&b.key));
        tasks
    }

    async fn shutdown(&mut self) {
        for (_, active) in self.registry.drain() {
            active.cancel();
        }

        self.ctx.tracker.close();
        let pending = self.ctx.tracker.len();
        if pending > 0 {
            tracing::info!("Waiting for {} in-flight fetches to finish", pending);
        }
        self.ctx.tracker.wait().await;

        tracing::info!("Scheduler stopped");
    }
}
