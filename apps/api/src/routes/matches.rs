use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::match_record::MatchRecord;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub resume_id: Uuid,
    pub job_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    pub resume_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
}

/// POST /api/matches
pub async fn handle_create_match(
    State(state): State<AppState>,
    Json(req): Json<CreateMatchRequest>,
) -> Result<(StatusCode, Json<MatchRecord>), AppError> {
    let resume = state
        .store
        .get_resume(req.resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {} not found", req.resume_id)))?;
    let job = state
        .store
        .get_job(req.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", req.job_id)))?;

    let scored = state.matcher.score(&resume, &job).await?;
    let record = state
        .store
        .insert_match(MatchRecord {
            id: Uuid::new_v4(),
            resume_id: resume.id,
            job_id: job.id,
            score: scored.score,
            reason: scored.reason,
            source: scored.source,
            created_at: Utc::now(),
        })
        .await?;

    info!(
        resume_id = %record.resume_id,
        job_id = %record.job_id,
        score = record.score,
        "Recorded match"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/matches
pub async fn handle_list_matches(
    State(state): State<AppState>,
    Query(params): Query<MatchQuery>,
) -> Result<Json<Vec<MatchRecord>>, AppError> {
    Ok(Json(
        state
            .store
            .list_matches(params.resume_id, params.job_id)
            .await?,
    ))
}
