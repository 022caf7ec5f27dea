use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "ResuMatch API is running"
    }))
}

/// GET /health
/// Returns service version and the active storage backends.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resumatch-api",
        "storage": {
            "records": state.store.backend(),
            "files": state.files.backend(),
        }
    }))
}
