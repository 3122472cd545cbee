use domain_worktracker::{ReportApiDoc, TasksApiDoc};
use utoipa::OpenApi;

/// Aggregated OpenAPI documentation for the worktracker API.
///
/// Domain docs are nested at the same paths the routers are mounted on.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Worktracker API",
        description = "Track time spent on tasks via start/stop intervals"
    ),
    nest(
        (path = "/tasks", api = TasksApiDoc),
        (path = "/report", api = ReportApiDoc)
    )
)]
pub struct ApiDoc;
