use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::WorktrackerResult;
use crate::models::{NewTask, Task, TaskId, TimeInterval};

/// Storage contract for tasks and their time intervals.
///
/// The store exclusively owns all task and interval state; callers receive
/// clones. Implementations can use different backends (in-memory, database).
///
/// The compound operations (`create`, `start`, `stop_all`) must be atomic
/// with respect to concurrent requests: once any of them returns, at most
/// one task holds an open interval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorktrackerStore: Send + Sync {
    /// Store a task under the next free id (derived from the current size)
    /// and return that id.
    async fn insert(&self, task: Task) -> WorktrackerResult<TaskId>;

    /// All tasks, no ordering guarantee. Durations of active tasks are
    /// recomputed against the clock before being returned.
    async fn get_all(&self) -> WorktrackerResult<Vec<Task>>;

    /// Tasks with an interval starting at or after `since`.
    async fn get_all_since(&self, since: DateTime<Utc>) -> WorktrackerResult<Vec<Task>>;

    /// Get a task by id, with its duration recomputed when active.
    async fn get_by_id(&self, id: TaskId) -> WorktrackerResult<Option<Task>>;

    /// Replace the stored task at its id.
    async fn update(&self, task: Task) -> WorktrackerResult<()>;

    /// Append an interval to the task's list and recompute its duration.
    async fn add_interval(&self, id: TaskId, interval: TimeInterval) -> WorktrackerResult<()>;

    /// The task's intervals, ordered by start time.
    async fn intervals_for(&self, id: TaskId) -> WorktrackerResult<Vec<TimeInterval>>;

    /// Mark the task active.
    async fn set_active(&self, id: TaskId) -> WorktrackerResult<()>;

    /// Mark the task inactive. Any open interval is closed at the current
    /// clock time and the duration recomputed; with no open interval the
    /// duration is left untouched.
    async fn set_inactive(&self, id: TaskId) -> WorktrackerResult<()>;

    /// Deactivate every task, then insert the described task with its first
    /// interval. The new task is active exactly when the payload has no end
    /// time. Atomic.
    async fn create(&self, input: NewTask) -> WorktrackerResult<Task>;

    /// Deactivate every task, then mark the target active with a new open
    /// interval starting at `start_time`. Atomic.
    async fn start(&self, id: TaskId, start_time: DateTime<Utc>)
        -> WorktrackerResult<TimeInterval>;

    /// Close every open interval at the current clock time and deactivate
    /// every task. Atomic.
    async fn stop_all(&self) -> WorktrackerResult<()>;
}
