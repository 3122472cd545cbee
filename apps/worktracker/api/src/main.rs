use axum_helpers::server::{create_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_worktracker::clock::SystemClock;
use domain_worktracker::{InMemoryWorktrackerStore, WorktrackerService};
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    // The store owns all task state; the service is the only path into it.
    let clock = Arc::new(SystemClock);
    let store = InMemoryWorktrackerStore::new(clock.clone());
    let service = Arc::new(WorktrackerService::new(store, clock));

    let state = AppState { config, service };

    // Build router with API routes (pass reference, not ownership!)
    let api_routes = api::routes(&state);

    // create_router adds docs/middleware to our composed routes
    let router = create_router::<openapi::ApiDoc>(api_routes);

    // Merge the /health liveness endpoint into the app
    let app = router.merge(health_router(state.config.app));

    info!("Starting worktracker API");
    create_app(app, &state.config.server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Worktracker API shutdown complete");
    Ok(())
}
