//! Database schema definitions

/// SQL to create the habits table
pub const CREATE_HABITS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS habits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create the habit_entries table
/// At most one row per habit per day; rows go away with their habit
pub const CREATE_HABIT_ENTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS habit_entries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    habit_id INTEGER NOT NULL,
    entry_date DATE NOT NULL,
    is_completed INTEGER DEFAULT 0,
    FOREIGN KEY (habit_id) REFERENCES habits(id) ON DELETE CASCADE,
    UNIQUE(habit_id, entry_date)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_habits_created ON habits(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_entries_date ON habit_entries(entry_date)",
];

/// Connection pragmas. SQLite ships with foreign keys off, and the cascade
/// from habits to habit_entries depends on them.
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_HABITS_TABLE,
        CREATE_HABIT_ENTRIES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
