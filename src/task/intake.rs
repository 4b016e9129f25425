use crate::events::EventSink;
use crate::scheduler::{ActiveTaskInfo, SchedulerHandle};
use crate::task::{Task, TaskKey};
use crate::IntakeError;

/// Front door for scrape tasks
///
/// Validates requests, derives their keys and forwards them to the scheduler
/// over its bounded submission queue. Cheap to clone; every clone feeds the
/// same scheduler.
#[derive(Clone)]
pub struct TaskIntake {
    scheduler: SchedulerHandle,
    events: EventSink,
}

impl TaskIntake {
    pub fn new(scheduler: SchedulerHandle, events: EventSink) -> Self {
        Self { scheduler, events }
    }

    /// Submits a URL to be fetched every `interval_secs` seconds
    ///
    /// Submitting a URL that already has an active task replaces that task
    /// with the new interval.
    ///
    /// # Returns
    ///
    /// * `Ok(TaskKey)` - The key the task's results are stored under
    /// * `Err(IntakeError::InvalidInput)` - The request failed validation
    /// * `Err(IntakeError::QueueFull)` - The scheduler did not accept the task in time
    /// * `Err(IntakeError::SchedulerClosed)` - The scheduler has shut down
    pub async fn submit(&self, url: &str, interval_secs: u64) -> Result<TaskKey, IntakeError> {
        let task = Task::new(url, interval_secs)?;
        let key = task.key.clone();
        let url = task.url.clone();

        self.scheduler.schedule(task).await?;

        tracing::debug!("Queued task {} for {} every {}s", key, url, interval_secs);
        self.events.record(format!("Added URL {}", url)).await;

        Ok(key)
    }

    /// Stops the task with the given key
    ///
    /// Returns `Ok(false)` if no task was active under that key.
    pub async fn stop(&self, key: &TaskKey) -> Result<bool, IntakeError> {
        self.scheduler.stop(key).await
    }

    /// Lists the tasks currently scheduled
    pub async fn active_tasks(&self) -> Result<Vec<ActiveTaskInfo>, IntakeError> {
        self.scheduler.active_tasks().await
    }
}
