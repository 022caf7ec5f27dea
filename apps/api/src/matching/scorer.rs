//! Match Scoring — pluggable, trait-based scorer for a resume against a job posting.
//!
//! Default: `KeywordMatchScorer` (pure-Rust, deterministic, fully testable).
//! `LlmMatchScorer` asks the LLM and falls back to the keyword scorer.
//!
//! `AppState` holds an `Arc<dyn MatchScorer>`, picked at startup from the analyzer mode.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::analysis::analyzer::LLM_SOURCE;
use crate::analysis::prompts::MATCH_PROMPT;
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::matching::partition_skills;
use crate::matching::similarity::{cosine_similarity, embed};
use crate::models::job::JobPosting;
use crate::models::resume::Resume;

const SKILLS_WEIGHT: f64 = 0.5;
const EXPERIENCE_WEIGHT: f64 = 0.2;
const EDUCATION_WEIGHT: f64 = 0.1;
const SIMILARITY_WEIGHT: f64 = 0.2;
/// Component value when the job states nothing to compare against.
const NEUTRAL: f64 = 0.5;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("number regex is valid"));

// ────────────────────────────────────────────────────────────────────────────
// Output data model (shared across all scorer backends)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchScore {
    pub score: u32, // 0 – 100
    pub reason: String,
    pub source: String, // "keyword" | "openrouter_llm" | "keyword_fallback"
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap scoring backends without touching the handlers.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, resume: &Resume, job: &JobPosting) -> Result<MatchScore, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordMatchScorer
// ────────────────────────────────────────────────────────────────────────────

/// Weighted blend of skills coverage (0.5), experience (0.2), education (0.1)
/// and bag-of-words similarity (0.2).
pub struct KeywordMatchScorer;

#[async_trait]
impl MatchScorer for KeywordMatchScorer {
    async fn score(&self, resume: &Resume, job: &JobPosting) -> Result<MatchScore, AppError> {
        Ok(compute_keyword_match(resume, job))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmMatchScorer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmMatchScorer(pub LlmClient);

#[derive(Debug, Deserialize)]
struct LlmMatch {
    score: f64,
    #[serde(default)]
    reason: String,
}

#[async_trait]
impl MatchScorer for LlmMatchScorer {
    async fn score(&self, resume: &Resume, job: &JobPosting) -> Result<MatchScore, AppError> {
        let keyword = compute_keyword_match(resume, job);

        let prompt = build_match_prompt(resume, job)?;
        match self.0.call_json::<LlmMatch>(&prompt, JSON_ONLY_SYSTEM).await {
            Ok(result) => Ok(MatchScore {
                score: result.score.clamp(0.0, 100.0).round() as u32,
                reason: result.reason,
                source: LLM_SOURCE.to_string(),
                ..keyword
            }),
            Err(e) => {
                warn!(
                    "LLM match scoring failed for resume {} / job {}: {e}. Using keyword score.",
                    resume.id, job.id
                );
                Ok(MatchScore {
                    source: "keyword_fallback".to_string(),
                    ..keyword
                })
            }
        }
    }
}

fn build_match_prompt(resume: &Resume, job: &JobPosting) -> Result<String, AppError> {
    let resume_json = serde_json::to_string_pretty(&json!({
        "summary": resume.summary,
        "skills": resume.skills,
        "experience_years": resume.experience,
        "education_level": resume.education_level,
        "category": resume.category,
    }))
    .map_err(|e| AppError::Internal(e.into()))?;
    let job_json = serde_json::to_string_pretty(&json!({
        "title": job.title,
        "description": job.description,
        "requirements": job.requirements,
        "skills": job.skills,
        "experience": job.experience,
        "category": job.category,
    }))
    .map_err(|e| AppError::Internal(e.into()))?;

    Ok(MATCH_PROMPT
        .replace("{resume_json}", &resume_json)
        .replace("{job_json}", &job_json))
}

// ────────────────────────────────────────────────────────────────────────────
// Core keyword match algorithm
// ────────────────────────────────────────────────────────────────────────────

fn compute_keyword_match(resume: &Resume, job: &JobPosting) -> MatchScore {
    let (matched_skills, missing_skills) = partition_skills(&resume.skills, &job.skills);
    let skills_component = if job.skills.is_empty() {
        NEUTRAL
    } else {
        matched_skills.len() as f64 / job.skills.len() as f64
    };

    let required_years = min_years(&job.experience);
    let experience_component = match required_years {
        None | Some(0) => 1.0,
        Some(required) if resume.experience >= required => 1.0,
        Some(required) => resume.experience as f64 / required as f64,
    };

    let required_level = required_education_rank(&job.requirements);
    let education_component = match (required_level, education_rank(&resume.education_level)) {
        (None, _) => NEUTRAL,
        (Some(required), Some(have)) if have >= required => 1.0,
        _ => 0.0,
    };

    let resume_doc = format!("{} {}", resume.summary, resume.skills.join(" "));
    let job_doc = format!(
        "{} {} {}",
        job.title,
        job.description,
        job.requirements.join(" ")
    );
    let similarity = cosine_similarity(&embed(&resume_doc), &embed(&job_doc));

    let blended = SKILLS_WEIGHT * skills_component
        + EXPERIENCE_WEIGHT * experience_component
        + EDUCATION_WEIGHT * education_component
        + SIMILARITY_WEIGHT * similarity;
    let score = (blended * 100.0).round().clamp(0.0, 100.0) as u32;

    let mut reasons = Vec::new();
    if job.skills.is_empty() {
        reasons.push("Job lists no skills".to_string());
    } else {
        reasons.push(format!(
            "Matched {} of {} job skills",
            matched_skills.len(),
            job.skills.len()
        ));
    }
    match required_years {
        Some(required) if required > 0 => reasons.push(format!(
            "{} years of experience vs {} required",
            resume.experience, required
        )),
        _ => {}
    }
    if required_level.is_some() {
        if education_component >= 1.0 {
            reasons.push(format!("{} meets the education requirement", resume.education_level));
        } else {
            reasons.push("Education requirement not met".to_string());
        }
    }
    reasons.push(format!("Text similarity {:.2}", similarity));

    MatchScore {
        score,
        reason: reasons.join("; "),
        source: "keyword".to_string(),
        matched_skills,
        missing_skills,
    }
}

/// Lower bound of an experience string such as "3-5 years" or "5+ years".
fn min_years(experience: &str) -> Option<u32> {
    FIRST_NUMBER
        .captures(experience)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Rank of a resume education level, highest = 4.
fn education_rank(level: &str) -> Option<u8> {
    let level = level.to_lowercase();
    if level.contains("phd") || level.contains("doctor") {
        Some(4)
    } else if level.contains("master") {
        Some(3)
    } else if level.contains("bachelor") {
        Some(2)
    } else if level.contains("associate") {
        Some(1)
    } else if level.contains("high school") {
        Some(0)
    } else {
        None
    }
}

/// Lowest degree the job asks for. "Preferred" lines only count when nothing
/// else mentions a degree.
fn required_education_rank(requirements: &[String]) -> Option<u8> {
    let rank_of = |line: &String| {
        let lower = line.to_lowercase();
        education_rank(&lower).or_else(|| lower.contains("degree").then_some(2))
    };

    let required = requirements
        .iter()
        .filter(|r| !r.to_lowercase().contains("preferred"))
        .filter_map(rank_of)
        .min();
    required.or_else(|| requirements.iter().filter_map(rank_of).min())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::OpenRouterConfig;
    use crate::models::job::JobPosting;
    use crate::models::resume::ResumeAnalysis;

    fn resume(skills: &[&str], experience: u32, education: &str) -> Resume {
        Resume::from_upload(
            "cv.txt",
            None,
            ResumeAnalysis {
                summary: "Backend engineer building Rust services".to_string(),
                skills: skills.iter().map(|s| s.to_string()).collect(),
                experience,
                education_level: education.to_string(),
                category: "Software Engineering".to_string(),
            },
        )
    }

    fn job(skills: &[&str], experience: &str, requirements: &[&str]) -> JobPosting {
        let mut job = JobPosting::new("Backend Engineer", "Acme", "Build Rust services");
        job.skills = skills.iter().map(|s| s.to_string()).collect();
        job.experience = experience.to_string();
        job.requirements = requirements.iter().map(|s| s.to_string()).collect();
        job
    }

    #[tokio::test]
    async fn test_full_match_scores_high() {
        let r = resume(&["Rust", "PostgreSQL", "Docker"], 6, "Master's");
        let j = job(&["Rust", "SQL"], "3-5 years", &["Bachelor's degree"]);
        let result = KeywordMatchScorer.score(&r, &j).await.unwrap();
        assert_eq!(result.matched_skills, vec!["Rust", "SQL"]);
        assert!(result.missing_skills.is_empty());
        assert_eq!(result.source, "keyword");
        // skills, experience and education are maxed; similarity adds the rest
        assert!(result.score >= 80, "score was {}", result.score);
        assert!(result.reason.contains("Matched 2 of 2 job skills"));
    }

    #[tokio::test]
    async fn test_missing_skills_and_experience_lower_the_score() {
        let strong = resume(&["Rust", "Kubernetes"], 6, "Bachelor's");
        let weak = resume(&["Excel"], 1, "High School");
        let j = job(&["Rust", "Kubernetes"], "5+ years", &["Bachelor's degree"]);

        let strong_score = KeywordMatchScorer.score(&strong, &j).await.unwrap();
        let weak_score = KeywordMatchScorer.score(&weak, &j).await.unwrap();
        assert!(strong_score.score > weak_score.score);
        assert_eq!(weak_score.missing_skills, vec!["Rust", "Kubernetes"]);
        assert!(weak_score.reason.contains("Education requirement not met"));
    }

    #[test]
    fn test_neutral_components_when_job_is_empty() {
        let r = resume(&[], 0, "");
        let mut j = job(&[], "", &[]);
        j.description = String::new();
        j.title = String::new();
        let result = compute_keyword_match(&r, &j);
        // 0.5×0.5 + 1.0×0.2 + 0.5×0.1 + 0
        assert_eq!(result.score, 50);
    }

    #[tokio::test]
    async fn test_llm_scorer_falls_back_to_keyword_result() {
        let unreachable = LlmClient::new(&OpenRouterConfig {
            api_key: "test-key".to_string(),
            model: "test/model".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        })
        .unwrap()
        .with_retry_base(Duration::ZERO);

        let r = resume(&["Rust", "Docker"], 4, "Bachelor's");
        let j = job(&["Rust", "Kubernetes"], "3-5 years", &["Bachelor's degree"]);

        let fallback = LlmMatchScorer(unreachable).score(&r, &j).await.unwrap();
        let keyword = KeywordMatchScorer.score(&r, &j).await.unwrap();

        assert_eq!(fallback.source, "keyword_fallback");
        assert_eq!(fallback.score, keyword.score);
        assert_eq!(fallback.reason, keyword.reason);
        assert_eq!(fallback.matched_skills, vec!["Rust"]);
        assert_eq!(fallback.missing_skills, vec!["Kubernetes"]);
    }

    #[test]
    fn test_min_years() {
        assert_eq!(min_years("3-5 years"), Some(3));
        assert_eq!(min_years("5+ years"), Some(5));
        assert_eq!(min_years("senior"), None);
    }

    #[test]
    fn test_required_education_ignores_preferred_when_required_present() {
        let reqs = vec![
            "Bachelor's degree".to_string(),
            "Master's degree preferred".to_string(),
        ];
        assert_eq!(required_education_rank(&reqs), Some(2));
        assert_eq!(
            required_education_rank(&["PhD preferred".to_string()]),
            Some(4)
        );
        assert_eq!(required_education_rank(&["Rust".to_string()]), None);
    }
}
