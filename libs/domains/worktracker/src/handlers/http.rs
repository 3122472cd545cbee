use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::error::{WorktrackerError, WorktrackerResult};
use crate::models::{NewTask, StartTask, Task, TaskId, TimeInterval};
use crate::report::Report;
use crate::service::WorktrackerService;
use crate::store::WorktrackerStore;

fn parse_task_id(id: &str) -> WorktrackerResult<TaskId> {
    id.parse::<TaskId>()
        .map_err(|_| WorktrackerError::Validation(format!("Invalid task id: {}", id)))
}

// A malformed or undecodable body is always a 400.
fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> WorktrackerResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| WorktrackerError::Validation(e.body_text()))
}

/// List all tasks
#[utoipa::path(
    get,
    path = "",
    tag = "tasks",
    responses(
        (status = 200, description = "All tasks, durations of active tasks freshly computed", body = Vec<Task>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_tasks<S: WorktrackerStore>(
    State(service): State<Arc<WorktrackerService<S>>>,
) -> WorktrackerResult<Json<Vec<Task>>> {
    let tasks = service.list_tasks().await?;
    Ok(Json(tasks))
}

/// Get a task by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 400, description = "Invalid task ID"),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_task<S: WorktrackerStore>(
    State(service): State<Arc<WorktrackerService<S>>>,
    Path(id): Path<String>,
) -> WorktrackerResult<impl IntoResponse> {
    let task_id = parse_task_id(&id)?;

    let task = service.get_task(task_id).await?;
    Ok(Json(task))
}

/// Create a new task
///
/// Stops whichever task is currently running; the new task starts running
/// unless the payload carries an `endTime`.
#[utoipa::path(
    post,
    path = "",
    tag = "tasks",
    request_body = NewTask,
    responses(
        (status = 201, description = "Task created successfully", body = Task),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_task<S: WorktrackerStore>(
    State(service): State<Arc<WorktrackerService<S>>>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> WorktrackerResult<impl IntoResponse> {
    let input = decode(payload)?;

    let task = service.create_task(input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Start (or resume) a task
///
/// Stops whichever task is currently running and opens a new interval on the
/// target task at the given start time.
#[utoipa::path(
    post,
    path = "/{id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    request_body = StartTask,
    responses(
        (status = 200, description = "Task started, the opened interval", body = TimeInterval),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Task not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn start_task<S: WorktrackerStore>(
    State(service): State<Arc<WorktrackerService<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<StartTask>, JsonRejection>,
) -> WorktrackerResult<impl IntoResponse> {
    let task_id = parse_task_id(&id)?;
    let input = decode(payload)?;

    let interval = service.start_task(task_id, input.start_time).await?;
    Ok(Json(interval))
}

/// Stop all running tasks
#[utoipa::path(
    post,
    path = "/stop",
    tag = "tasks",
    responses(
        (status = 204, description = "Every open interval closed"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn stop_tasks<S: WorktrackerStore>(
    State(service): State<Arc<WorktrackerService<S>>>,
) -> WorktrackerResult<impl IntoResponse> {
    service.stop_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Weekly activity report
#[utoipa::path(
    get,
    path = "",
    tag = "report",
    responses(
        (status = 200, description = "Markdown summary of the current week's tasks", body = Report),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn report<S: WorktrackerStore>(
    State(service): State<Arc<WorktrackerService<S>>>,
) -> WorktrackerResult<Json<Report>> {
    let report = service.weekly_report().await?;
    Ok(Json(report))
}
