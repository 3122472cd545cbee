use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Task identifier, assigned by the store on insert.
pub type TaskId = usize;

/// One contiguous span during which a task was worked on.
///
/// An interval with no end time is "open": the task is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeInterval {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl TimeInterval {
    /// An interval that started at `start_time` and is still running.
    pub fn open(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time: None,
        }
    }

    /// A finished interval.
    pub fn closed(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time: Some(end_time),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Elapsed time of this interval, counting an open interval up to `now`.
    pub fn elapsed(&self, now: DateTime<Utc>) -> TimeDelta {
        self.end_time.unwrap_or(now) - self.start_time
    }
}

/// Total elapsed time across `intervals`, counting an open interval up to `now`.
pub fn total_duration(intervals: &[TimeInterval], now: DateTime<Utc>) -> TimeDelta {
    intervals
        .iter()
        .fold(TimeDelta::zero(), |total, interval| {
            total + interval.elapsed(now)
        })
}

/// Task entity - a unit of trackable work.
///
/// `duration` is the accumulated time across all of the task's intervals and
/// travels as an integer nanosecond count on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    #[serde(with = "duration_ns")]
    #[schema(value_type = i64)]
    pub duration: TimeDelta,
    pub active: bool,
}

impl Task {
    /// A fresh task with no recorded time. The store assigns the real id.
    pub fn new(title: String, description: String, active: bool) -> Self {
        Self {
            id: 0,
            title,
            description,
            duration: TimeDelta::zero(),
            active,
        }
    }
}

/// DTO for creating a new task.
///
/// The initial interval is open (task starts running) unless `endTime` is
/// given, in which case the task is created inactive with one closed interval.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

impl NewTask {
    /// The initial interval the payload describes.
    pub fn interval(&self) -> TimeInterval {
        TimeInterval {
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// DTO for starting (or resuming) an existing task.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartTask {
    pub start_time: DateTime<Utc>,
}

/// Serde adapter: `TimeDelta` travels as integer nanoseconds on the wire.
mod duration_ns {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_nanoseconds().unwrap_or(i64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let nanos = i64::deserialize(deserializer)?;
        Ok(TimeDelta::nanoseconds(nanos))
    }
}
