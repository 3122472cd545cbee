use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::error::{WorktrackerError, WorktrackerResult};
use crate::models::{total_duration, NewTask, Task, TaskId, TimeInterval};
use crate::store::WorktrackerStore;

/// In-memory store: one mutex over the whole task table.
///
/// The single lock is what makes the compound operations atomic - the
/// "at most one active task" invariant and duration recomputation cannot
/// interleave across concurrent requests. The lock is never held across an
/// await point.
pub struct InMemoryWorktrackerStore {
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    tasks: HashMap<TaskId, Task>,
    intervals: HashMap<TaskId, Vec<TimeInterval>>,
}

impl InMemoryWorktrackerStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Seed the store with existing tasks, keyed by their ids, and no
    /// recorded intervals.
    pub fn with_tasks(clock: Arc<dyn Clock>, tasks: Vec<Task>) -> Self {
        Self::with_intervals(clock, tasks, HashMap::new())
    }

    /// Seed the store with existing tasks and their interval lists.
    pub fn with_intervals(
        clock: Arc<dyn Clock>,
        tasks: Vec<Task>,
        intervals: HashMap<TaskId, Vec<TimeInterval>>,
    ) -> Self {
        let tasks = tasks.into_iter().map(|task| (task.id, task)).collect();
        Self {
            clock,
            inner: Mutex::new(Inner { tasks, intervals }),
        }
    }

    fn lock(&self) -> WorktrackerResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| WorktrackerError::Internal("store mutex poisoned".to_string()))
    }
}

impl Inner {
    fn require(&self, id: TaskId) -> WorktrackerResult<&Task> {
        self.tasks.get(&id).ok_or(WorktrackerError::NotFound(id))
    }

    fn recompute_duration(&mut self, id: TaskId, now: DateTime<Utc>) {
        if let Some(task) = self.tasks.get_mut(&id) {
            let intervals = self.intervals.get(&id).map(Vec::as_slice).unwrap_or(&[]);
            task.duration = total_duration(intervals, now);
        }
    }

    fn deactivate(&mut self, id: TaskId, now: DateTime<Utc>) {
        if let Some(task) = self.tasks.get_mut(&id) {
            task.active = false;
        }
        let mut closed_any = false;
        if let Some(intervals) = self.intervals.get_mut(&id) {
            for interval in intervals.iter_mut() {
                if interval.end_time.is_none() {
                    interval.end_time = Some(now);
                    closed_any = true;
                }
            }
        }
        // Stopping a task with no open interval must not touch its duration.
        if closed_any {
            self.recompute_duration(id, now);
        }
    }

    fn deactivate_all(&mut self, now: DateTime<Utc>) {
        let ids: Vec<TaskId> = self.tasks.keys().copied().collect();
        for id in ids {
            self.deactivate(id, now);
        }
    }

    /// Refresh the duration of a still-running task before it is read.
    fn refresh_if_active(&mut self, id: TaskId, now: DateTime<Utc>) {
        if self.tasks.get(&id).is_some_and(|task| task.active) {
            self.recompute_duration(id, now);
        }
    }

    fn push_interval(
        &mut self,
        id: TaskId,
        interval: TimeInterval,
        now: DateTime<Utc>,
    ) -> WorktrackerResult<()> {
        if let Some(end) = interval.end_time {
            if end < interval.start_time {
                return Err(WorktrackerError::Validation(
                    "interval end time precedes its start time".to_string(),
                ));
            }
        }
        self.intervals.entry(id).or_default().push(interval);
        self.recompute_duration(id, now);
        Ok(())
    }
}

#[async_trait]
impl WorktrackerStore for InMemoryWorktrackerStore {
    async fn insert(&self, task: Task) -> WorktrackerResult<TaskId> {
        let mut inner = self.lock()?;
        let id = inner.tasks.len();
        let mut task = task;
        task.id = id;
        inner.tasks.insert(id, task);
        Ok(id)
    }

    async fn get_all(&self) -> WorktrackerResult<Vec<Task>> {
        let now = self.clock.now();
        let mut inner = self.lock()?;
        let ids: Vec<TaskId> = inner.tasks.keys().copied().collect();
        for id in ids {
            inner.refresh_if_active(id, now);
        }
        Ok(inner.tasks.values().cloned().collect())
    }

    async fn get_all_since(&self, since: DateTime<Utc>) -> WorktrackerResult<Vec<Task>> {
        let now = self.clock.now();
        let mut inner = self.lock()?;
        let ids: Vec<TaskId> = inner.tasks.keys().copied().collect();
        for id in ids {
            inner.refresh_if_active(id, now);
        }
        let tasks = inner
            .tasks
            .values()
            .filter(|task| {
                inner
                    .intervals
                    .get(&task.id)
                    .is_some_and(|intervals| {
                        intervals.iter().any(|i| i.start_time >= since)
                    })
            })
            .cloned()
            .collect();
        Ok(tasks)
    }

    async fn get_by_id(&self, id: TaskId) -> WorktrackerResult<Option<Task>> {
        let now = self.clock.now();
        let mut inner = self.lock()?;
        inner.refresh_if_active(id, now);
        Ok(inner.tasks.get(&id).cloned())
    }

    async fn update(&self, task: Task) -> WorktrackerResult<()> {
        let mut inner = self.lock()?;
        inner.require(task.id)?;
        inner.tasks.insert(task.id, task);
        Ok(())
    }

    async fn add_interval(&self, id: TaskId, interval: TimeInterval) -> WorktrackerResult<()> {
        let now = self.clock.now();
        let mut inner = self.lock()?;
        inner.require(id)?;
        inner.push_interval(id, interval, now)
    }

    async fn intervals_for(&self, id: TaskId) -> WorktrackerResult<Vec<TimeInterval>> {
        let inner = self.lock()?;
        inner.require(id)?;
        Ok(inner.intervals.get(&id).cloned().unwrap_or_default())
    }

    async fn set_active(&self, id: TaskId) -> WorktrackerResult<()> {
        let mut inner = self.lock()?;
        inner.require(id)?;
        if let Some(task) = inner.tasks.get_mut(&id) {
            task.active = true;
        }
        Ok(())
    }

    async fn set_inactive(&self, id: TaskId) -> WorktrackerResult<()> {
        let now = self.clock.now();
        let mut inner = self.lock()?;
        inner.require(id)?;
        inner.deactivate(id, now);
        Ok(())
    }

    async fn create(&self, input: NewTask) -> WorktrackerResult<Task> {
        let now = self.clock.now();
        let interval = input.interval();
        if let Some(end) = interval.end_time {
            if end < interval.start_time {
                return Err(WorktrackerError::Validation(
                    "interval end time precedes its start time".to_string(),
                ));
            }
        }

        let mut inner = self.lock()?;
        inner.deactivate_all(now);

        let id = inner.tasks.len();
        let mut task = Task::new(input.title, input.description, interval.is_open());
        task.id = id;
        inner.tasks.insert(id, task);
        inner.push_interval(id, interval, now)?;

        tracing::info!(task_id = id, "Created task");
        inner.require(id).cloned()
    }

    async fn start(
        &self,
        id: TaskId,
        start_time: DateTime<Utc>,
    ) -> WorktrackerResult<TimeInterval> {
        let now = self.clock.now();
        let mut inner = self.lock()?;
        inner.require(id)?;

        inner.deactivate_all(now);
        if let Some(task) = inner.tasks.get_mut(&id) {
            task.active = true;
        }
        let interval = TimeInterval::open(start_time);
        inner.push_interval(id, interval, now)?;

        tracing::info!(task_id = id, "Started task");
        Ok(interval)
    }

    async fn stop_all(&self) -> WorktrackerResult<()> {
        let now = self.clock.now();
        let mut inner = self.lock()?;
        inner.deactivate_all(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeDelta;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn fixed_clock(s: &str) -> Arc<FixedClock> {
        Arc::new(FixedClock::new(ts(s)))
    }

    fn task(id: TaskId, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: format!("{} description", title),
            duration: TimeDelta::zero(),
            active: false,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids() {
        let clock = fixed_clock("2024-05-13T09:00:00Z");
        let store = InMemoryWorktrackerStore::new(clock);

        let first = store.insert(task(0, "Task One")).await.unwrap();
        let second = store.insert(task(0, "Task Two")).await.unwrap();

        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(store.get_by_id(1).await.unwrap().unwrap().title, "Task Two");
    }

    #[tokio::test]
    async fn test_round_trip_preserves_title_description_and_intervals() {
        let clock = fixed_clock("2024-05-13T09:00:00Z");
        let store = InMemoryWorktrackerStore::new(clock);

        let id = store.insert(task(0, "Task One")).await.unwrap();
        let interval = TimeInterval::closed(
            ts("2024-05-13T08:00:00Z"),
            ts("2024-05-13T08:30:00Z"),
        );
        store.add_interval(id, interval).await.unwrap();

        let stored = store.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Task One");
        assert_eq!(stored.description, "Task One description");
        assert_eq!(store.intervals_for(id).await.unwrap(), vec![interval]);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let clock = fixed_clock("2024-05-13T09:00:00Z");
        let store = InMemoryWorktrackerStore::new(clock);

        assert!(store.get_by_id(7).await.unwrap().is_none());
        assert!(matches!(
            store.update(task(7, "ghost")).await,
            Err(WorktrackerError::NotFound(7))
        ));
        assert!(matches!(
            store.start(7, ts("2024-05-13T09:00:00Z")).await,
            Err(WorktrackerError::NotFound(7))
        ));
    }

    #[tokio::test]
    async fn test_add_interval_rejects_end_before_start() {
        let clock = fixed_clock("2024-05-13T09:00:00Z");
        let store = InMemoryWorktrackerStore::new(clock);
        let id = store.insert(task(0, "Task One")).await.unwrap();

        let backwards = TimeInterval::closed(
            ts("2024-05-13T08:00:00Z"),
            ts("2024-05-13T07:00:00Z"),
        );
        assert!(matches!(
            store.add_interval(id, backwards).await,
            Err(WorktrackerError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_stop_all_closes_open_interval_and_sets_duration() {
        let start = ts("2024-05-13T09:00:00Z");
        let clock = Arc::new(FixedClock::new(start));
        let mut seeded = task(0, "Some task");
        seeded.active = true;
        let intervals = HashMap::from([(0, vec![TimeInterval::open(start)])]);
        let store =
            InMemoryWorktrackerStore::with_intervals(clock.clone(), vec![seeded], intervals);

        clock.advance(TimeDelta::hours(1));
        store.stop_all().await.unwrap();

        let stored = store.get_by_id(0).await.unwrap().unwrap();
        assert!(!stored.active);
        assert_eq!(stored.duration, TimeDelta::hours(1));
        let intervals = store.intervals_for(0).await.unwrap();
        assert_eq!(intervals[0].end_time, Some(start + TimeDelta::hours(1)));
    }

    #[tokio::test]
    async fn test_duration_accumulates_across_intervals_after_stop() {
        let start1 = ts("2024-05-13T09:00:00Z");
        let end1 = start1 + TimeDelta::minutes(5);
        let start2 = end1 + TimeDelta::minutes(10);
        let clock = Arc::new(FixedClock::new(start2));
        let mut seeded = task(0, "Some task");
        seeded.active = true;
        let intervals = HashMap::from([(
            0,
            vec![
                TimeInterval::closed(start1, end1),
                TimeInterval::open(start2),
            ],
        )]);
        let store =
            InMemoryWorktrackerStore::with_intervals(clock.clone(), vec![seeded], intervals);

        clock.set(start2 + TimeDelta::hours(1));
        store.stop_all().await.unwrap();

        let stored = store.get_by_id(0).await.unwrap().unwrap();
        assert_eq!(
            stored.duration,
            TimeDelta::minutes(5) + TimeDelta::hours(1)
        );
    }

    #[tokio::test]
    async fn test_stop_all_is_noop_for_closed_intervals() {
        let start = ts("2024-05-13T09:00:00Z");
        let end = start + TimeDelta::minutes(30);
        let clock = Arc::new(FixedClock::new(end));
        let intervals = HashMap::from([(0, vec![TimeInterval::closed(start, end)])]);
        let mut seeded = task(0, "Some task");
        seeded.duration = TimeDelta::minutes(30);
        let store =
            InMemoryWorktrackerStore::with_intervals(clock.clone(), vec![seeded], intervals);

        clock.advance(TimeDelta::hours(2));
        store.stop_all().await.unwrap();

        let stored = store.get_by_id(0).await.unwrap().unwrap();
        assert_eq!(stored.duration, TimeDelta::minutes(30));
    }

    #[tokio::test]
    async fn test_create_deactivates_previous_active_task() {
        let start = ts("2024-05-13T09:00:00Z");
        let clock = Arc::new(FixedClock::new(start));
        let mut seeded = task(0, "Some task");
        seeded.active = true;
        let intervals = HashMap::from([(0, vec![TimeInterval::open(start)])]);
        let store =
            InMemoryWorktrackerStore::with_intervals(clock.clone(), vec![seeded], intervals);

        clock.advance(TimeDelta::hours(1));
        let created = store
            .create(NewTask {
                title: "New task".to_string(),
                description: "Some desc".to_string(),
                start_time: start,
                end_time: None,
            })
            .await
            .unwrap();

        assert!(created.active);
        assert_eq!(created.id, 1);

        let previous = store.get_by_id(0).await.unwrap().unwrap();
        assert!(!previous.active);
        assert_eq!(previous.duration, TimeDelta::hours(1));
    }

    #[tokio::test]
    async fn test_create_with_closed_interval_is_inactive_with_duration() {
        let start = ts("2024-05-13T09:00:00Z");
        let clock = fixed_clock("2024-05-13T12:00:00Z");
        let store = InMemoryWorktrackerStore::new(clock);

        let created = store
            .create(NewTask {
                title: "Some Task".to_string(),
                description: "Description".to_string(),
                start_time: start,
                end_time: Some(start + TimeDelta::hours(1)),
            })
            .await
            .unwrap();

        assert!(!created.active);
        assert_eq!(created.duration, TimeDelta::hours(1));
    }

    #[tokio::test]
    async fn test_start_leaves_exactly_one_task_active() {
        let start = ts("2024-05-13T09:00:00Z");
        let clock = Arc::new(FixedClock::new(start));
        let mut first = task(0, "Task One");
        first.active = true;
        let intervals = HashMap::from([(0, vec![TimeInterval::open(start)])]);
        let store = InMemoryWorktrackerStore::with_intervals(
            clock.clone(),
            vec![first, task(1, "Task Two")],
            intervals,
        );

        let interval = store
            .start(1, start + TimeDelta::minutes(10))
            .await
            .unwrap();
        assert!(interval.is_open());
        assert_eq!(interval.start_time, start + TimeDelta::minutes(10));

        let tasks = store.get_all().await.unwrap();
        let active: Vec<TaskId> = tasks.iter().filter(|t| t.active).map(|t| t.id).collect();
        assert_eq!(active, vec![1]);
    }

    #[tokio::test]
    async fn test_get_all_since_filters_by_interval_start() {
        let monday = ts("2024-05-13T00:00:00Z");
        let clock = fixed_clock("2024-05-15T12:00:00Z");
        let intervals = HashMap::from([
            (
                0,
                vec![TimeInterval::closed(
                    monday + TimeDelta::hours(9),
                    monday + TimeDelta::hours(10),
                )],
            ),
            (
                1,
                vec![TimeInterval::closed(
                    monday - TimeDelta::days(3),
                    monday - TimeDelta::days(3) + TimeDelta::hours(1),
                )],
            ),
        ]);
        let store = InMemoryWorktrackerStore::with_intervals(
            clock,
            vec![task(0, "This week"), task(1, "Last week")],
            intervals,
        );

        let tasks = store.get_all_since(monday).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 0);
    }

    #[tokio::test]
    async fn test_get_all_refreshes_active_durations_only() {
        let start = ts("2024-05-13T09:00:00Z");
        let clock = Arc::new(FixedClock::new(start));
        let mut idle = task(0, "Task One");
        idle.duration = TimeDelta::nanoseconds(1994);
        let mut running = task(1, "Task Two");
        running.active = true;
        let intervals = HashMap::from([(1, vec![TimeInterval::open(start)])]);
        let store = InMemoryWorktrackerStore::with_intervals(
            clock.clone(),
            vec![idle, running],
            intervals,
        );

        clock.advance(TimeDelta::minutes(30));
        let tasks = store.get_all().await.unwrap();
        let by_id = |id: TaskId| tasks.iter().find(|t| t.id == id).unwrap();

        // Seeded duration untouched for the inactive task, live for the active one.
        assert_eq!(by_id(0).duration, TimeDelta::nanoseconds(1994));
        assert_eq!(by_id(1).duration, TimeDelta::minutes(30));
    }
}
