//! Worktracker Domain
//!
//! This module provides a complete domain implementation for tracking time
//! spent on tasks: tasks accumulate duration over a list of time intervals,
//! and at most one task holds an open interval at any moment.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP surface, request/response encoding
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Business logic, validation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │    Store    │  ← Task/interval ownership (trait + in-memory impl)
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_worktracker::{
//!     clock::SystemClock, InMemoryWorktrackerStore, WorktrackerService,
//! };
//!
//! let clock = Arc::new(SystemClock);
//! let store = InMemoryWorktrackerStore::new(clock.clone());
//! let service = WorktrackerService::new(store, clock);
//! ```

pub mod clock;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod report;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use error::{WorktrackerError, WorktrackerResult};
pub use handlers::{ReportApiDoc, TasksApiDoc};
pub use memory::InMemoryWorktrackerStore;
pub use models::{NewTask, StartTask, Task, TaskId, TimeInterval};
pub use report::Report;
pub use service::WorktrackerService;
pub use store::WorktrackerStore;
