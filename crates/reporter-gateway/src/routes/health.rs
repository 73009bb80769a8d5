//! Liveness and metrics endpoints.

use crate::routes::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// Health check
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}

pub async fn metrics(State(state): State<AppState>) -> Json<Value> {
    Json(state.metrics.to_json())
}
