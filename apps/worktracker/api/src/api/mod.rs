use axum::Router;
use domain_worktracker::handlers;

/// Creates the API routes.
///
/// Takes a reference to AppState; the domain routers apply their own state,
/// so the returned router is stateless and ready to merge with the
/// cross-cutting concerns in `create_router`.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new()
        .nest("/tasks", handlers::tasks_router(state.service.clone()))
        .nest("/report", handlers::report_router(state.service.clone()))
}
