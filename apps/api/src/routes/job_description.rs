use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::text::extract_text;
use crate::errors::AppError;
use crate::models::job::JobDescriptionAnalysis;
use crate::routes::read_file_field;
use crate::state::AppState;

const PASTED_FILENAME: &str = "job-description.txt";

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    #[serde(default)]
    pub text: String,
}

/// POST /api/job-description/analyze
pub async fn handle_analyze_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<JobDescriptionAnalysis>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            upload = Some(read_file_field(field).await?);
            break;
        }
    }
    let upload = upload.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let text = extract_text(&upload.filename, upload.bytes).await?;
    analyze(&state, upload.filename, &text).await
}

/// POST /api/job-description/analyze-text
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeTextRequest>,
) -> Result<Json<JobDescriptionAnalysis>, AppError> {
    analyze(&state, PASTED_FILENAME.to_string(), &req.text).await
}

async fn analyze(
    state: &AppState,
    filename: String,
    text: &str,
) -> Result<Json<JobDescriptionAnalysis>, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation("No text provided".to_string()));
    }

    info!("Analyzing job description '{filename}' ({} chars)", text.len());
    let fields = state.analyzer.analyze_job_description(text).await;

    Ok(Json(JobDescriptionAnalysis {
        id: Uuid::new_v4(),
        filename,
        fields,
    }))
}
