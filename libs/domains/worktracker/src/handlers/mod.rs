mod http;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{NewTask, StartTask, Task, TimeInterval};
use crate::report::Report;
use crate::service::WorktrackerService;
use crate::store::WorktrackerStore;

/// OpenAPI documentation for the tasks API
#[derive(OpenApi)]
#[openapi(
    paths(
        http::list_tasks,
        http::create_task,
        http::stop_tasks,
        http::get_task,
        http::start_task,
    ),
    components(
        schemas(Task, TimeInterval, NewTask, StartTask)
    ),
    tags(
        (name = "tasks", description = "Task and time-interval operations")
    )
)]
pub struct TasksApiDoc;

/// OpenAPI documentation for the weekly report API
#[derive(OpenApi)]
#[openapi(
    paths(http::report),
    components(schemas(Report)),
    tags(
        (name = "report", description = "Weekly activity report")
    )
)]
pub struct ReportApiDoc;

/// Create the router for the task endpoints.
///
/// Nest this under `/tasks`. The static `/stop` segment takes precedence
/// over the `/{id}` capture, so `stop` is never parsed as an id.
pub fn tasks_router<S: WorktrackerStore + 'static>(
    service: Arc<WorktrackerService<S>>,
) -> Router {
    Router::new()
        .route("/", get(http::list_tasks).post(http::create_task))
        .route("/stop", post(http::stop_tasks))
        .route("/{id}", get(http::get_task).post(http::start_task))
        .with_state(service)
}

/// Create the router for the weekly report endpoint. Nest under `/report`.
pub fn report_router<S: WorktrackerStore + 'static>(
    service: Arc<WorktrackerService<S>>,
) -> Router {
    Router::new()
        .route("/", get(http::report))
        .with_state(service)
}
