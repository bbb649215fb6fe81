use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::router::AppState;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Todo API",
            "version": version,
            "endpoints": {
                "health": "/health (public)",
                "todos": "/api/todos[/:id] (protected)",
            }
        }
    }))
}

/// 503 `SERVICE_UNAVAILABLE` when the store fails its health check
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.todos.health_check().await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "store": "ok"
        }
    })))
}
