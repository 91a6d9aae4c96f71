//! SQLite storage implementation

use std::path::Path;
use std::time::Duration;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use crate::{Result, Error};
use crate::habit::{self, Habit, HabitEntry, HabitId, HabitStatus, ToggleOutcome};
use super::schema;

/// SQLite-backed storage for habits and their daily entries
pub struct HabitStore {
    conn: Connection,
}

impl HabitStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(schema::CONNECTION_PRAGMAS)?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Habit Operations ==========

    /// Every habit, newest first, with its completion state on `today`.
    pub fn list_habits_with_today(&self, today: NaiveDate) -> Result<Vec<HabitStatus>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT h.id, h.name, COALESCE(he.is_completed, 0) AS is_completed_today
            FROM habits h
            LEFT JOIN habit_entries he ON h.id = he.habit_id AND he.entry_date = ?1
            ORDER BY h.created_at DESC, h.id DESC
            "#,
        )?;

        let habits = stmt
            .query_map([date_key(today)], |row| {
                Ok(HabitStatus {
                    id: HabitId(row.get(0)?),
                    name: row.get(1)?,
                    is_completed_today: row.get::<_, i64>(2)? != 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(habits)
    }

    /// Create a habit. The name is trimmed and HTML-escaped before storing.
    pub fn add_habit(&self, name: &str) -> Result<HabitStatus> {
        let name = habit::normalize_name(name)?;
        self.conn.execute("INSERT INTO habits (name) VALUES (?1)", [&name])?;
        let id = HabitId(self.conn.last_insert_rowid());
        tracing::debug!(%id, name = %name, "habit added");

        Ok(HabitStatus {
            id,
            name,
            is_completed_today: false,
        })
    }

    /// Set the completion state of a habit for `today`.
    ///
    /// Upserts on (habit_id, entry_date) so repeated toggles leave a single
    /// row holding the latest state.
    pub fn toggle_habit(&self, id: HabitId, completed: bool, today: NaiveDate) -> Result<ToggleOutcome> {
        HabitId::new(id.get())?;

        let result = self.conn.execute(
            r#"
            INSERT INTO habit_entries (habit_id, entry_date, is_completed)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(habit_id, entry_date) DO UPDATE SET is_completed = excluded.is_completed
            "#,
            params![id.get(), date_key(today), completed],
        );

        match result {
            Ok(_) => {
                tracing::debug!(%id, completed, date = %today, "habit toggled");
                Ok(ToggleOutcome { id, completed })
            }
            Err(e) if is_foreign_key_violation(&e) => Err(Error::NotFound(id.get())),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a habit and, through the cascade, all of its entries.
    pub fn delete_habit(&self, id: HabitId) -> Result<()> {
        HabitId::new(id.get())?;

        let removed = self.conn.execute("DELETE FROM habits WHERE id = ?1", [id.get()])?;
        if removed == 0 {
            return Err(Error::NotFound(id.get()));
        }
        tracing::debug!(%id, "habit deleted");
        Ok(())
    }

    /// Get a habit by id
    pub fn get_habit(&self, id: HabitId) -> Result<Option<Habit>> {
        self.conn
            .query_row(
                "SELECT id, name, created_at FROM habits WHERE id = ?1",
                [id.get()],
                |row| {
                    let created_at: String = row.get(2)?;
                    let created_at = NaiveDateTime::parse_from_str(&created_at, habit::TIMESTAMP_FORMAT)
                        .map_err(|e| {
                            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
                        })?;
                    Ok(Habit {
                        id: HabitId(row.get(0)?),
                        name: row.get(1)?,
                        created_at,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    // ========== Entry Operations ==========

    /// All entries recorded for a habit, oldest date first
    pub fn entries_for(&self, id: HabitId) -> Result<Vec<HabitEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, entry_date, is_completed FROM habit_entries WHERE habit_id = ?1 ORDER BY entry_date",
        )?;

        let entries = stmt
            .query_map([id.get()], |row| self.row_to_entry(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }

    /// Helper to convert a row to a HabitEntry
    fn row_to_entry(&self, row: &rusqlite::Row) -> rusqlite::Result<HabitEntry> {
        let date_str: String = row.get(2)?;
        let entry_date = NaiveDate::parse_from_str(&date_str, habit::DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(HabitEntry {
            id: row.get(0)?,
            habit_id: HabitId(row.get(1)?),
            entry_date,
            is_completed: row.get::<_, Option<i64>>(3)?.unwrap_or(0) != 0,
        })
    }

    // ========== Utility Operations ==========

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        let (habits, entries, completed_entries): (i64, i64, i64) = self.conn.query_row(
            r#"
            SELECT
                (SELECT COUNT(*) FROM habits),
                (SELECT COUNT(*) FROM habit_entries),
                (SELECT COUNT(*) FROM habit_entries WHERE is_completed = 1)
            "#,
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(DbStats {
            habits: habits as usize,
            entries: entries as usize,
            completed_entries: completed_entries as usize,
        })
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format(habit::DATE_FORMAT).to_string()
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub habits: usize,
    pub entries: usize,
    pub completed_entries: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Habits: {}", self.habits)?;
        writeln!(f, "  Entries: {}", self.entries)?;
        writeln!(f, "  Completed: {}", self.completed_entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn names(list: &[HabitStatus]) -> Vec<&str> {
        list.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_add_and_list() {
        let store = HabitStore::open_in_memory().unwrap();

        let added = store.add_habit("  Read ").unwrap();
        assert_eq!(added.name, "Read");
        assert!(!added.is_completed_today);

        let list = store.list_habits_with_today(day(1)).unwrap();
        assert_eq!(list, vec![added]);
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let store = HabitStore::open_in_memory().unwrap();
        let a = store.add_habit("a").unwrap();
        let b = store.add_habit("b").unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let store = HabitStore::open_in_memory().unwrap();

        let err = store.add_habit("   ").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.stats().unwrap().habits, 0);
    }

    #[test]
    fn test_newest_first() {
        let store = HabitStore::open_in_memory().unwrap();
        store.add_habit("Read").unwrap();
        store.add_habit("Exercise").unwrap();
        store.add_habit("Sleep").unwrap();

        let list = store.list_habits_with_today(day(1)).unwrap();
        assert_eq!(names(&list), vec!["Sleep", "Exercise", "Read"]);
    }

    #[test]
    fn test_toggle_upserts_single_row() {
        let store = HabitStore::open_in_memory().unwrap();
        let habit = store.add_habit("Read").unwrap();

        store.toggle_habit(habit.id, true, day(1)).unwrap();
        let outcome = store.toggle_habit(habit.id, false, day(1)).unwrap();
        assert_eq!(outcome, ToggleOutcome { id: habit.id, completed: false });

        let entries = store.entries_for(habit.id).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_completed);
        assert_eq!(entries[0].entry_date, day(1));
    }

    #[test]
    fn test_toggle_is_idempotent() {
        let store = HabitStore::open_in_memory().unwrap();
        let habit = store.add_habit("Read").unwrap();

        store.toggle_habit(habit.id, true, day(1)).unwrap();
        store.toggle_habit(habit.id, true, day(1)).unwrap();

        let list = store.list_habits_with_today(day(1)).unwrap();
        assert!(list[0].is_completed_today);
        assert_eq!(store.stats().unwrap().entries, 1);
    }

    #[test]
    fn test_completion_is_per_day() {
        let store = HabitStore::open_in_memory().unwrap();
        let habit = store.add_habit("Read").unwrap();

        store.toggle_habit(habit.id, true, day(1)).unwrap();

        assert!(store.list_habits_with_today(day(1)).unwrap()[0].is_completed_today);
        assert!(!store.list_habits_with_today(day(2)).unwrap()[0].is_completed_today);

        store.toggle_habit(habit.id, true, day(2)).unwrap();
        let dates: Vec<_> = store.entries_for(habit.id).unwrap().iter().map(|e| e.entry_date).collect();
        assert_eq!(dates, vec![day(1), day(2)]);
    }

    #[test]
    fn test_toggle_missing_habit() {
        let store = HabitStore::open_in_memory().unwrap();

        let err = store.toggle_habit(HabitId(42), true, day(1)).unwrap_err();
        assert!(matches!(err, Error::NotFound(42)));
        assert_eq!(store.stats().unwrap().entries, 0);
    }

    #[test]
    fn test_non_positive_ids_are_rejected() {
        let store = HabitStore::open_in_memory().unwrap();

        assert!(matches!(store.toggle_habit(HabitId(0), true, day(1)), Err(Error::Validation(_))));
        assert!(matches!(store.delete_habit(HabitId(-1)), Err(Error::Validation(_))));
    }

    #[test]
    fn test_delete_cascades_entries() {
        let store = HabitStore::open_in_memory().unwrap();
        let keep = store.add_habit("Read").unwrap();
        let gone = store.add_habit("Exercise").unwrap();

        store.toggle_habit(keep.id, true, day(1)).unwrap();
        store.toggle_habit(gone.id, true, day(1)).unwrap();
        store.toggle_habit(gone.id, false, day(2)).unwrap();

        store.delete_habit(gone.id).unwrap();

        assert!(store.get_habit(gone.id).unwrap().is_none());
        assert!(store.entries_for(gone.id).unwrap().is_empty());
        let stats = store.stats().unwrap();
        assert_eq!(stats.habits, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_delete_missing_leaves_store_unchanged() {
        let store = HabitStore::open_in_memory().unwrap();
        let habit = store.add_habit("Read").unwrap();
        store.toggle_habit(habit.id, true, day(1)).unwrap();

        let err = store.delete_habit(HabitId(999)).unwrap_err();
        assert!(matches!(err, Error::NotFound(999)));

        let stats = store.stats().unwrap();
        assert_eq!((stats.habits, stats.entries), (1, 1));
    }

    #[test]
    fn test_get_habit_has_created_at() {
        let store = HabitStore::open_in_memory().unwrap();
        let added = store.add_habit("Read").unwrap();

        let habit = store.get_habit(added.id).unwrap().unwrap();
        assert_eq!(habit.name, "Read");
        assert!(habit.created_at.and_utc().timestamp() > 0);
    }
}
