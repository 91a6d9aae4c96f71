//! JSON action API
//!
//! Requests name an action (`?action=` on GET, `"action"` in the POST body)
//! plus a loosely-typed payload. [`Action::parse`] turns that into one of
//! four typed operations, [`dispatch`] runs it against a [`HabitStore`], and
//! every outcome becomes an [`ApiResponse`] with a status code and a JSON
//! body: `{"success": true, ...}` or `{"error": "..."}`.

use std::path::Path;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde_json::{Value, json};
use crate::habit::{self, HabitId};
use crate::storage::HabitStore;
use crate::Error;

/// The four operations the API understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GetHabits,
    AddHabit { name: String },
    ToggleHabit { id: HabitId, completed: bool },
    DeleteHabit { id: HabitId },
}

impl Action {
    /// Build an action from its wire name and payload.
    ///
    /// Unknown names fail with [`ApiError::InvalidAction`] before the
    /// payload is looked at.
    pub fn parse(name: &str, payload: &Value) -> Result<Self, ApiError> {
        match name {
            "get_habits" => Ok(Action::GetHabits),
            "add_habit" => match payload.get("name") {
                Some(Value::String(name)) => Ok(Action::AddHabit { name: name.clone() }),
                _ => Err(ApiError::Validation("Habit name is required".to_string())),
            },
            "toggle_habit" => Ok(Action::ToggleHabit {
                id: HabitId::from_json(payload.get("id"))?,
                completed: habit::truthy(payload.get("completed")),
            }),
            "delete_habit" => Ok(Action::DeleteHabit {
                id: HabitId::from_json(payload.get("id"))?,
            }),
            _ => Err(ApiError::InvalidAction),
        }
    }

    /// Wire name of the action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::GetHabits => "get_habits",
            Action::AddHabit { .. } => "add_habit",
            Action::ToggleHabit { .. } => "toggle_habit",
            Action::DeleteHabit { .. } => "delete_habit",
        }
    }

    /// Prefix for storage failure messages
    fn failure_context(&self) -> &'static str {
        match self {
            Action::GetHabits => "Failed to load habits",
            Action::AddHabit { .. } => "Failed to add habit",
            Action::ToggleHabit { .. } => "Failed to toggle habit",
            Action::DeleteHabit { .. } => "Failed to delete habit",
        }
    }
}

/// Errors surfaced to API clients
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid action")]
    InvalidAction,

    #[error("{0}")]
    Validation(String),

    #[error("Habit not found")]
    NotFound,

    #[error("{context}: {source}")]
    Storage {
        context: &'static str,
        source: rusqlite::Error,
    },

    #[error("Database connection failed: {0}")]
    Connection(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidAction | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } | ApiError::Connection(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn from_store(err: Error, context: &'static str) -> Self {
        match err {
            Error::Validation(msg) => ApiError::Validation(msg),
            Error::NotFound(_) => ApiError::NotFound,
            Error::Storage(source) => ApiError::Storage { context, source },
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::from_store(err, "Storage failure")
    }
}

/// Status code plus JSON body, ready for the transport layer
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: StatusCode::OK, body }
    }
}

impl From<ApiError> for ApiResponse {
    fn from(err: ApiError) -> Self {
        Self {
            status: err.status(),
            body: json!({ "error": err.to_string() }),
        }
    }
}

impl From<Result<Value, ApiError>> for ApiResponse {
    fn from(result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(body) => ApiResponse::ok(body),
            Err(err) => err.into(),
        }
    }
}

/// Run an action against the store.
pub fn dispatch(store: &HabitStore, action: &Action, today: NaiveDate) -> Result<Value, ApiError> {
    let context = action.failure_context();
    let fail = |e| ApiError::from_store(e, context);

    match action {
        Action::GetHabits => {
            let habits = store.list_habits_with_today(today).map_err(fail)?;
            Ok(json!(habits))
        }
        Action::AddHabit { name } => {
            let added = store.add_habit(name).map_err(fail)?;
            tracing::info!(id = %added.id, name = %added.name, "Added habit");
            Ok(json!({
                "success": true,
                "id": added.id,
                "name": added.name,
                "is_completed_today": 0,
            }))
        }
        Action::ToggleHabit { id, completed } => {
            let outcome = store.toggle_habit(*id, *completed, today).map_err(fail)?;
            tracing::info!(%id, completed, "Toggled habit");
            Ok(json!({
                "success": true,
                "id": outcome.id,
                "completed": u8::from(outcome.completed),
            }))
        }
        Action::DeleteHabit { id } => {
            store.delete_habit(*id).map_err(fail)?;
            tracing::info!(%id, "Deleted habit");
            Ok(json!({ "success": true, "id": id }))
        }
    }
}

/// Handle one request end to end: parse, open the store, dispatch.
///
/// A fresh connection is opened per call and dropped on return.
pub fn handle(database_path: &Path, action_name: &str, payload: &Value, today: NaiveDate) -> ApiResponse {
    let action = match Action::parse(action_name, payload) {
        Ok(action) => action,
        Err(err) => {
            tracing::debug!(action = action_name, error = %err, "Rejected request");
            return err.into();
        }
    };

    let store = match HabitStore::open(database_path) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open {}: {}", database_path.display(), e);
            return ApiError::Connection(e.to_string()).into();
        }
    };

    let result = dispatch(&store, &action, today);
    if let Err(err) = &result {
        if err.status().is_server_error() {
            tracing::error!(action = action.as_str(), error = %err, "Request failed");
        }
    }
    result.into()
}
