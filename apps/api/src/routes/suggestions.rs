use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsRequest {
    #[serde(default)]
    pub resume_skills: Vec<String>,
    #[serde(default)]
    pub job_description_skills: Vec<String>,
    #[serde(default)]
    pub resume_summary: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: String,
}

/// POST /api/ai-suggestions
pub async fn handle_ai_suggestions(
    State(state): State<AppState>,
    Json(req): Json<SuggestionsRequest>,
) -> Json<SuggestionsResponse> {
    let suggestions = state
        .analyzer
        .suggestions(
            &req.resume_skills,
            &req.job_description_skills,
            &req.resume_summary,
        )
        .await;
    Json(SuggestionsResponse { suggestions })
}
