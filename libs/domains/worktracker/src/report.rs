use chrono::{DateTime, Datelike, NaiveTime, TimeDelta, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Task;

/// Weekly activity report payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Report {
    pub report: String,
}

/// Start of the ISO week containing `now` (Monday 00:00 UTC).
pub fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_into_week = now.weekday().num_days_from_monday() as i64;
    let monday = now.date_naive() - TimeDelta::days(days_into_week);
    monday.and_time(NaiveTime::MIN).and_utc()
}

/// Render tasks as a Markdown bullet list.
pub fn render_report(tasks: &[Task]) -> String {
    let mut report = String::from("# Tasks\n\n");
    for task in tasks {
        report.push_str(&format!("* {}\n  {}\n\n", task.title, task.description));
    }
    report
}
