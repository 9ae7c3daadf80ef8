//! # General Route Handlers
//!
//! The unauthenticated root, health check and database check endpoints.

use super::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "consulta server is running."
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// The handler for `/test-db`: performs a round-trip to the database.
pub async fn test_db_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    match app_state.sqlite_provider.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "time": chrono::Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => {
            error!("Database check failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": "Database error" })),
            )
        }
    }
}
