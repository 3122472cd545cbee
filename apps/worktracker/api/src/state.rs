//! Application state management.
//!
//! The state holds the configuration and the single worktracker service
//! instance. The store is constructed in `main` and reaches handlers only
//! through this state.

use std::sync::Arc;

use domain_worktracker::{InMemoryWorktrackerStore, WorktrackerService};

/// Shared application state.
///
/// Cloned per use (inexpensive Arc clones).
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// Task service backed by the in-memory store
    pub service: Arc<WorktrackerService<InMemoryWorktrackerStore>>,
}
