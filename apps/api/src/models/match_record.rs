use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted match between a resume and a job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub job_id: Uuid,
    /// 0 – 100
    pub score: u32,
    pub reason: String,
    /// Which scorer produced the number: "keyword", "openrouter_llm", "keyword_fallback".
    pub source: String,
    pub created_at: DateTime<Utc>,
}
