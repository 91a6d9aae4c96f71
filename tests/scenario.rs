use chrono::NaiveDate;
use habitrack::api;
use habitrack::HabitStore;
use axum::http::StatusCode;
use rusqlite::Connection;
use serde_json::{json, Value};
use std::path::Path;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// One request against a file-backed store, fresh connection each time
fn request(db: &Path, action: &str, payload: Value) -> api::ApiResponse {
    api::handle(db, action, &payload, today())
}

fn listed_names(db: &Path) -> Vec<String> {
    let resp = request(db, "get_habits", Value::Null);
    assert_eq!(resp.status, StatusCode::OK);
    resp.body
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn read_exercise_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("habits.sqlite");

    let read = request(&db, "add_habit", json!({"name": "Read"})).body["id"].clone();
    let exercise = request(&db, "add_habit", json!({"name": "Exercise"})).body["id"].clone();
    assert_ne!(read, exercise);
    assert_eq!(listed_names(&db), vec!["Exercise", "Read"]);

    let resp = request(&db, "toggle_habit", json!({"action": "toggle_habit", "id": read, "completed": true}));
    assert_eq!(resp.status, StatusCode::OK);

    let list = request(&db, "get_habits", Value::Null).body;
    assert_eq!(
        list,
        json!([
            {"id": exercise, "name": "Exercise", "is_completed_today": 0},
            {"id": read, "name": "Read", "is_completed_today": 1},
        ])
    );

    let resp = request(&db, "delete_habit", json!({"id": exercise}));
    assert_eq!(resp.body, json!({"success": true, "id": exercise}));
    assert_eq!(listed_names(&db), vec!["Read"]);
}

#[test]
fn delete_leaves_no_orphan_entries() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("habits.sqlite");

    let id = request(&db, "add_habit", json!({"name": "Stretch"})).body["id"].clone();
    request(&db, "toggle_habit", json!({"id": id, "completed": 1}));
    request(&db, "toggle_habit", json!({"id": id, "completed": 0}));

    let resp = request(&db, "delete_habit", json!({"id": id}));
    assert_eq!(resp.status, StatusCode::OK);

    let conn = Connection::open(&db).unwrap();
    let orphans: i64 = conn
        .query_row("SELECT COUNT(*) FROM habit_entries", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn toggle_back_and_forth_keeps_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("habits.sqlite");

    let id = request(&db, "add_habit", json!({"name": "Water"})).body["id"].clone();
    request(&db, "toggle_habit", json!({"id": id, "completed": true}));
    let resp = request(&db, "toggle_habit", json!({"id": id, "completed": false}));
    assert_eq!(resp.body["completed"], json!(0));

    let conn = Connection::open(&db).unwrap();
    let rows: Vec<(String, i64)> = conn
        .prepare("SELECT entry_date, is_completed FROM habit_entries")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows, vec![("2024-06-01".to_string(), 0)]);
}

#[test]
fn failed_requests_change_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("habits.sqlite");
    request(&db, "add_habit", json!({"name": "Read"}));

    assert_eq!(request(&db, "add_habit", json!({"name": "  "})).status, StatusCode::BAD_REQUEST);
    assert_eq!(request(&db, "delete_habit", json!({"id": 12345})).status, StatusCode::NOT_FOUND);
    assert_eq!(request(&db, "rename_habit", json!({"id": 1})).status, StatusCode::BAD_REQUEST);

    let store = HabitStore::open(&db).unwrap();
    let stats = store.stats().unwrap();
    assert_eq!((stats.habits, stats.entries), (1, 0));
}
