//! Habit types and input normalization
//!
//! - `Habit`: a named activity, owned rows in `habits`
//! - `HabitEntry`: completion record for one habit on one date
//! - `HabitStatus`: a habit joined with its completion for a given day
//!
//! The normalizers here accept the loosely-typed JSON the browser sends
//! (ids as numbers or numeric strings, booleans as `"1"`/`"on"`/`true`).

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::str::FromStr;

/// Timestamp layout written by SQLite's `CURRENT_TIMESTAMP`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date layout of `habit_entries.entry_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// System-assigned habit identifier (always positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HabitId(pub i64);

impl HabitId {
    /// Validate a raw id. Zero and negative ids are rejected.
    pub fn new(raw: i64) -> Result<Self> {
        if raw > 0 {
            Ok(HabitId(raw))
        } else {
            Err(invalid_id())
        }
    }

    /// Coerce a JSON value into an id.
    ///
    /// Accepts integers, integral floats (`3.0`) and strings holding a
    /// decimal integer without leading zeros (surrounding whitespace and a
    /// sign allowed). Fractions, booleans, null and garbage are rejected.
    pub fn from_json(value: Option<&Value>) -> Result<Self> {
        match value {
            Some(Value::Number(n)) => integral(n).ok_or_else(invalid_id).and_then(Self::new),
            Some(Value::String(s)) => s.parse(),
            _ => Err(invalid_id()),
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl FromStr for HabitId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid_id());
        }
        if digits.len() > 1 && digits.starts_with('0') {
            return Err(invalid_id());
        }
        s.parse::<i64>()
            .map_err(|_| invalid_id())
            .and_then(Self::new)
    }
}

impl std::fmt::Display for HabitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn integral(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

fn invalid_id() -> Error {
    Error::Validation("Invalid habit ID".to_string())
}

/// A tracked habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Habit {
    pub id: HabitId,
    /// Stored (trimmed, HTML-escaped) name
    pub name: String,
    /// UTC creation time, set by the database
    pub created_at: NaiveDateTime,
}

/// Completion record for one habit on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitEntry {
    pub id: i64,
    pub habit_id: HabitId,
    pub entry_date: NaiveDate,
    #[serde(serialize_with = "bool_as_int")]
    pub is_completed: bool,
}

/// A habit together with its completion state for one day.
///
/// A day without an entry reads as not completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitStatus {
    pub id: HabitId,
    pub name: String,
    #[serde(serialize_with = "bool_as_int")]
    pub is_completed_today: bool,
}

/// Latest completion state written by a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub id: HabitId,
    #[serde(serialize_with = "bool_as_int")]
    pub completed: bool,
}

/// Booleans go over the wire as `0`/`1`, which is what the front-end expects.
pub fn bool_as_int<S: Serializer>(value: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// Trim and escape a habit name for storage.
///
/// Fails with a validation error when nothing is left after trimming.
pub fn normalize_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Habit name is required".to_string()));
    }
    Ok(escape_html(trimmed))
}

/// Minimal HTML escaping of `& < > " '`.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Loose boolean coercion for the `completed` flag.
///
/// `true`, the number `1` and `1`/`true`/`on`/`yes` strings are true.
/// Anything else, a missing value included, is false.
pub fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        ),
        _ => false,
    }
}
