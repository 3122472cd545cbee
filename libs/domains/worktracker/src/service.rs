use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;
use validator::Validate;

use crate::clock::Clock;
use crate::error::{WorktrackerError, WorktrackerResult};
use crate::models::{NewTask, Task, TaskId, TimeInterval};
use crate::report::{render_report, start_of_week, Report};
use crate::store::WorktrackerStore;

/// Service layer for task business logic.
///
/// Handlers never touch entities directly; every state change goes through
/// here into the store.
pub struct WorktrackerService<S: WorktrackerStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: WorktrackerStore> WorktrackerService<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(store),
            clock,
        }
    }

    /// List all tasks; durations of active tasks reflect elapsed time.
    pub async fn list_tasks(&self) -> WorktrackerResult<Vec<Task>> {
        self.store.get_all().await
    }

    /// Get a task by id.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn get_task(&self, id: TaskId) -> WorktrackerResult<Task> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(WorktrackerError::NotFound(id))
    }

    /// Create a new task with validation.
    ///
    /// Any currently running task is stopped first; the new task is active
    /// unless the payload carries an end time.
    #[instrument(skip(self, input), fields(task_title = %input.title))]
    pub async fn create_task(&self, input: NewTask) -> WorktrackerResult<Task> {
        input
            .validate()
            .map_err(|e| WorktrackerError::Validation(e.to_string()))?;

        self.store.create(input).await
    }

    /// Start (or resume) the task, stopping whichever task was running.
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn start_task(
        &self,
        id: TaskId,
        start_time: DateTime<Utc>,
    ) -> WorktrackerResult<TimeInterval> {
        self.store.start(id, start_time).await
    }

    /// Stop every running task, closing open intervals at the current time.
    #[instrument(skip(self))]
    pub async fn stop_all(&self) -> WorktrackerResult<()> {
        self.store.stop_all().await
    }

    /// Markdown summary of the tasks worked on in the current ISO week.
    #[instrument(skip(self))]
    pub async fn weekly_report(&self) -> WorktrackerResult<Report> {
        let since = start_of_week(self.clock.now());
        let tasks = self.store.get_all_since(since).await?;
        Ok(Report {
            report: render_report(&tasks),
        })
    }
}
