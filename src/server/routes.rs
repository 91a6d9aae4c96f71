use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use crate::api::{self, ApiResponse};
use crate::server::AppState;

#[derive(Deserialize)]
pub struct ActionParams {
    pub action: Option<String>,
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// `GET /api?action=...`, no payload
pub async fn get_api(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActionParams>,
) -> ApiResponse {
    let action = params.action.unwrap_or_default();
    run_blocking(state, action, Value::Null).await
}

/// `POST /api` with a JSON body carrying `action` and its fields.
///
/// A body that is not JSON is treated as empty, which then fails as an
/// invalid action.
pub async fn post_api(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResponse {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let action = payload
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    run_blocking(state, action, payload).await
}

async fn run_blocking(state: Arc<AppState>, action: String, payload: Value) -> ApiResponse {
    let today = (state.today)();
    let result = tokio::task::spawn_blocking(move || {
        api::handle(&state.database_path, &action, &payload, today)
    })
    .await;

    match result {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Request task failed: {}", e);
            ApiResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: json!({ "error": format!("Request task failed: {}", e) }),
            }
        }
    }
}
