use axum::{extract::State, Json};

use crate::analysis::analyzer::ModelStatus;
use crate::state::AppState;

/// GET /api/model/status
/// Probes OpenRouter (unless regex mode is forced) and reports which analyzer is live.
pub async fn handle_model_status(State(state): State<AppState>) -> Json<ModelStatus> {
    Json(state.analyzer.status().await)
}
