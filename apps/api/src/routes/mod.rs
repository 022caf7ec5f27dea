pub mod files;
pub mod health;
pub mod job_description;
pub mod jobs;
pub mod matches;
pub mod model;
pub mod resumes;
pub mod suggestions;
pub mod users;


use axum::{
    extract::{multipart::Field, DefaultBodyLimit},
    routing::{delete, get, post},
    Router,
};
use bytes::Bytes;

use crate::errors::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/api/model/status", get(model::handle_model_status))
        // Resumes
        .route("/api/resumes", get(resumes::handle_list_resumes))
        .route("/api/resumes/user", get(resumes::handle_list_resumes))
        .route("/api/resumes/analyze", post(resumes::handle_analyze_resume))
        .route("/api/resumes/upload", post(resumes::handle_upload_resume))
        .route("/api/resumes/search", post(resumes::handle_search_resumes))
        .route(
            "/api/resumes/download/:id",
            get(resumes::handle_download_resume),
        )
        .route("/api/resumes/:id", delete(resumes::handle_delete_resume))
        .route("/download/*path", get(files::handle_download_file))
        // Job descriptions
        .route(
            "/api/job-description/analyze",
            post(job_description::handle_analyze_file),
        )
        .route(
            "/api/job-description/analyze-text",
            post(job_description::handle_analyze_text),
        )
        .route("/api/ai-suggestions", post(suggestions::handle_ai_suggestions))
        // Job postings
        .route(
            "/api/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/jobs/:id",
            get(jobs::handle_get_job)
                .patch(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route("/api/jobs/:id/rank", get(jobs::handle_rank_resumes))
        // Matches
        .route(
            "/api/matches",
            get(matches::handle_list_matches).post(matches::handle_create_match),
        )
        // Users
        .route(
            "/api/users",
            get(users::handle_list_users).post(users::handle_create_user),
        )
        .route("/api/users/:id", get(users::handle_get_user))
        .layer(body_limit)
        .with_state(state)
}

/// An uploaded file pulled out of a multipart body.
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

async fn read_file_field(field: Field<'_>) -> Result<UploadedFile, AppError> {
    let filename = field
        .file_name()
        .map(str::to_string)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Uploaded file has no filename".to_string()))?;
    let bytes = field.bytes().await?;
    Ok(UploadedFile { filename, bytes })
}
