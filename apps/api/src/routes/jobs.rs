use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::scorer::MatchScore;
use crate::models::job::{JobPatch, JobPosting, JobStatus};
use crate::models::resume::Resume;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

#[derive(Debug, Deserialize)]
pub struct JobListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RankedResume {
    pub resume: Resume,
    #[serde(flatten)]
    pub score: MatchScore,
}

/// POST /api/jobs
/// Skills, requirements, experience and category left empty are filled in by
/// analysing the description.
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobPosting>), AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Job title must not be empty".to_string()));
    }

    let mut job = JobPosting::new(title, req.company.trim(), req.description);
    job.requirements = req.requirements;
    job.skills = req.skills;
    job.experience = req.experience;
    job.category = req.category;
    if let Some(status) = req.status {
        job.status = status;
    }

    let needs_analysis = job.skills.is_empty()
        || job.requirements.is_empty()
        || job.experience.trim().is_empty()
        || job.category.trim().is_empty();
    if needs_analysis && !job.description.trim().is_empty() {
        let fields = state.analyzer.analyze_job_description(&job.description).await;
        if job.skills.is_empty() {
            job.skills = fields.skills;
        }
        if job.requirements.is_empty() {
            job.requirements = fields.requirements;
        }
        if job.experience.trim().is_empty() {
            job.experience = fields.experience;
        }
        if job.category.trim().is_empty() {
            job.category = fields.category;
        }
    }

    let job = state.store.insert_job(job).await?;
    info!(job_id = %job.id, title = %job.title, "Created job posting");
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> Result<Json<Vec<JobPosting>>, AppError> {
    let status = match params.status.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(raw.parse::<JobStatus>().map_err(AppError::Validation)?),
        _ => None,
    };
    Ok(Json(state.store.list_jobs(status).await?))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPosting>, AppError> {
    Ok(Json(load_job(&state, id).await?))
}

/// PATCH /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<JobPatch>,
) -> Result<Json<JobPosting>, AppError> {
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::Validation("Job title must not be empty".to_string()));
    }

    let mut job = load_job(&state, id).await?;
    job.apply(patch);

    let job = state
        .store
        .update_job(job)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    info!(job_id = %id, "Updated job posting");
    Ok(Json(job))
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !state.store.delete_job(id).await? {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    info!(job_id = %id, "Deleted job posting");
    Ok(Json(json!({
        "status": "success",
        "message": format!("Job {id} deleted successfully")
    })))
}

/// GET /api/jobs/:id/rank
/// Scores every stored resume against the posting, best first.
pub async fn handle_rank_resumes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<RankedResume>>, AppError> {
    let job = load_job(&state, id).await?;
    let resumes = state.store.list_resumes(None).await?;

    let mut ranked = Vec::with_capacity(resumes.len());
    for resume in resumes {
        let score = state.matcher.score(&resume, &job).await?;
        ranked.push(RankedResume { resume, score });
    }
    ranked.sort_by(|a, b| b.score.score.cmp(&a.score.score));

    info!(job_id = %id, "Ranked {} resumes", ranked.len());
    Ok(Json(ranked))
}

async fn load_job(state: &AppState, id: Uuid) -> Result<JobPosting, AppError> {
    state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}
