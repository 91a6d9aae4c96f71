//! # Habitrack - daily habit tracker
//!
//! A small SQLite-backed habit tracker:
//! - Two-table store (`habits`, `habit_entries`) with cascade delete
//! - Per-day completion upserts keyed by (habit, date)
//! - JSON action API (`get_habits`, `add_habit`, `toggle_habit`, `delete_habit`)
//! - axum server that also hosts the browser front-end

pub mod habit;
pub mod storage;
pub mod api;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use habit::{Habit, HabitEntry, HabitId, HabitStatus};
pub use storage::HabitStore;
pub use api::{Action, ApiError, ApiResponse};

/// Result type alias for Habitrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Habitrack operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad or missing input (empty name, non-integer id)
    #[error("{0}")]
    Validation(String),

    #[error("Habit not found: {0}")]
    NotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}
