use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::text::{content_type_for, ensure_analyzable, extract_text};
use crate::errors::AppError;
use crate::matching::keyword::keyword_match_score;
use crate::matching::ScoreResult;
use crate::models::resume::{Resume, ResumeAnalysis};
use crate::routes::files::attachment;
use crate::routes::{read_file_field, UploadedFile};
use crate::state::AppState;
use crate::storage::files::resume_key;

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchFilters {
    pub category: Option<String>,
    #[serde(alias = "educationLevel")]
    pub education_level: Option<String>,
    #[serde(alias = "minExperience")]
    pub min_experience: Option<u32>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// LLM relevance over the stored document, keyword scoring as fallback.
    #[default]
    AiAnalysis,
    /// Keyword scoring over the extracted fields only.
    ResumeMatching,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub filters: Option<SearchFilters>,
    #[serde(default)]
    pub search_type: SearchType,
}

#[derive(Debug, Serialize)]
pub struct ScoredResume {
    #[serde(flatten)]
    pub resume: Resume,
    pub match_score: u32,
    pub match_reason: String,
    pub score_source: String,
}

/// POST /api/resumes/analyze
/// Accepts either a multipart `file` (pdf/txt) or a JSON body `{"text": "..."}`.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<ResumeAnalysis>, AppError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();

    let resume_text = if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        let mut upload = None;
        while let Some(field) = multipart.next_field().await? {
            if field.name() == Some("file") {
                upload = Some(read_file_field(field).await?);
                break;
            }
        }
        let upload =
            upload.ok_or_else(|| AppError::Validation("No file or text provided".to_string()))?;
        extract_text(&upload.filename, upload.bytes).await?
    } else if content_type.starts_with("application/json") {
        let Json(body) = Json::<Value>::from_request(request, &state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        match body {
            Value::String(text) => text,
            Value::Object(map) => match map.get("text") {
                Some(Value::String(text)) => text.clone(),
                _ => return Err(AppError::Validation("No file or text provided".to_string())),
            },
            _ => return Err(AppError::Validation("No file or text provided".to_string())),
        }
    } else {
        return Err(AppError::Validation("No file or text provided".to_string()));
    };

    ensure_analyzable(&resume_text)?;
    info!("Analyzing resume text ({} chars)", resume_text.len());
    Ok(Json(state.analyzer.analyze_resume(&resume_text).await))
}

/// POST /api/resumes/upload
/// Multipart fields: `file` (required), `metadata` (JSON analysis, optional), `owner_id` (optional).
/// Without metadata the document itself is analyzed.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Resume>, AppError> {
    let mut upload: Option<UploadedFile> = None;
    let mut metadata: Option<String> = None;
    let mut owner_raw: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("file") => upload = Some(read_file_field(field).await?),
            Some("metadata") => metadata = Some(field.text().await?),
            Some("owner_id") => owner_raw = Some(field.text().await?),
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let owner_id = match owner_raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let id = Uuid::parse_str(raw)
                .map_err(|_| AppError::Validation(format!("Invalid owner_id '{raw}'")))?;
            if state.store.get_user(id).await?.is_none() {
                return Err(AppError::NotFound(format!("User {id} not found")));
            }
            Some(id)
        }
        None => None,
    };

    let analysis = match metadata.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => serde_json::from_str::<ResumeAnalysis>(raw)
            .map_err(|e| AppError::Validation(format!("Invalid metadata: {e}")))?,
        None => {
            let text = extract_text(&upload.filename, upload.bytes.clone()).await?;
            ensure_analyzable(&text)?;
            state.analyzer.analyze_resume(&text).await
        }
    };

    let mut resume = Resume::from_upload(upload.filename.clone(), owner_id, analysis);
    let key = resume_key(resume.id, &upload.filename);
    state.files.put(&key, upload.bytes).await?;
    resume.file_key = Some(key.clone());

    let resume = match state.store.insert_resume(resume).await {
        Ok(resume) => resume,
        Err(e) => {
            if let Err(cleanup) = state.files.delete(&key).await {
                warn!("Could not remove orphaned upload {key}: {cleanup}");
            }
            return Err(e);
        }
    };

    info!(resume_id = %resume.id, filename = %resume.filename, "Stored resume");
    Ok(Json(resume))
}

/// GET /api/resumes
/// GET /api/resumes/user
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<OwnerQuery>,
) -> Result<Json<Vec<Resume>>, AppError> {
    Ok(Json(state.store.list_resumes(params.owner_id).await?))
}

/// POST /api/resumes/search
pub async fn handle_search_resumes(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<ScoredResume>>, AppError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Search query must not be empty".to_string()));
    }

    let filters = req.filters.unwrap_or_default();
    let candidates: Vec<Resume> = state
        .store
        .list_resumes(None)
        .await?
        .into_iter()
        .filter(|r| passes_filters(r, &filters))
        .collect();

    info!(
        "Scoring {} resumes for '{}' ({:?})",
        candidates.len(),
        query,
        req.search_type
    );

    let mut results = Vec::with_capacity(candidates.len());
    for resume in candidates {
        let scored = match req.search_type {
            SearchType::ResumeMatching => keyword_match_score(query, &resume),
            SearchType::AiAnalysis => ai_relevance(&state, query, &resume)
                .await
                .unwrap_or_else(|| keyword_match_score(query, &resume)),
        };
        results.push(ScoredResume {
            resume,
            match_score: scored.score,
            match_reason: scored.reason,
            score_source: scored.source,
        });
    }

    results.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    Ok(Json(results))
}

/// LLM relevance over the stored document. `None` whenever the LLM is not
/// usable or the document cannot be read.
async fn ai_relevance(state: &AppState, query: &str, resume: &Resume) -> Option<ScoreResult> {
    state.analyzer.active_llm()?;
    let key = resume.file_key.as_deref()?;

    let bytes = match state.files.get(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            warn!(resume_id = %resume.id, "Stored document missing; using keyword score");
            return None;
        }
        Err(e) => {
            warn!(resume_id = %resume.id, "Could not load document: {e}");
            return None;
        }
    };

    let text = match extract_text(&resume.filename, bytes).await {
        Ok(text) if ensure_analyzable(&text).is_ok() => text,
        Ok(_) => return None,
        Err(e) => {
            warn!(resume_id = %resume.id, "Could not extract text: {e}");
            return None;
        }
    };

    state.analyzer.relevance_score(query, &text).await
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Every non-blank filter must hold. Category and education compare
/// case-insensitively; each requested skill must overlap a resume skill.
fn passes_filters(resume: &Resume, filters: &SearchFilters) -> bool {
    if let Some(category) = non_blank(&filters.category) {
        if !resume.category.eq_ignore_ascii_case(category) {
            return false;
        }
    }
    if let Some(level) = non_blank(&filters.education_level) {
        if !resume.education_level.eq_ignore_ascii_case(level) {
            return false;
        }
    }
    if let Some(min) = filters.min_experience {
        if resume.experience < min {
            return false;
        }
    }

    let resume_skills: Vec<String> = resume
        .skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    filters
        .skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .all(|wanted| {
            resume_skills
                .iter()
                .any(|have| have.contains(wanted.as_str()) || wanted.contains(have.as_str()))
        })
}

/// GET /api/resumes/download/:id
pub async fn handle_download_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let resume = state
        .store
        .get_resume(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    let key = resume
        .file_key
        .as_deref()
        .ok_or_else(|| AppError::NotFound(format!("No document stored for resume {id}")))?;
    let bytes = state
        .files
        .get(key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document for resume {id} is missing")))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&resume.filename).to_string()),
            (header::CONTENT_DISPOSITION, attachment(&resume.filename)),
        ],
        bytes,
    )
        .into_response())
}

/// DELETE /api/resumes/:id
/// Removes the stored document, the record and its match records.
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let resume = state
        .store
        .get_resume(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    if let Some(key) = &resume.file_key {
        if let Err(e) = state.files.delete(key).await {
            warn!(resume_id = %id, "Could not delete stored document {key}: {e}");
        }
    }

    if !state.store.delete_resume(id).await? {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }

    info!(resume_id = %id, "Deleted resume");
    Ok(Json(json!({
        "status": "success",
        "message": format!("Resume {id} deleted successfully")
    })))
}
