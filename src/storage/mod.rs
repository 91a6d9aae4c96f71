//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - habits(id, name, created_at)
//! - habit_entries(id, habit_id, entry_date, is_completed), one row per (habit, day)

pub mod schema;
pub mod sqlite;

pub use sqlite::{HabitStore, DbStats};
