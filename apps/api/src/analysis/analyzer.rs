//! Analyzer — picks between the LLM and the regex heuristics.
//!
//! Every LLM path degrades to its regex counterpart on failure, so callers
//! always get an analysis back. `AppState` holds one `Analyzer`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::prompts::{
    JD_ANALYSIS_PROMPT, RELEVANCE_PROMPT, RESUME_ANALYSIS_PROMPT, SUGGESTIONS_PROMPT,
};
use crate::analysis::{job_regex, resume_regex, truncate_chars};
use crate::llm_client::prompts::{CAREER_ADVISOR_SYSTEM, JSON_ONLY_SYSTEM};
use crate::llm_client::LlmClient;
use crate::matching::suggestions::rule_based_suggestions;
use crate::matching::ScoreResult;
use crate::models::job::JobDescriptionFields;
use crate::models::resume::ResumeAnalysis;

/// Characters of a job description sent to the LLM.
const JD_PROMPT_CHARS: usize = 4000;
/// Characters of a resume sent to the LLM.
const RESUME_PROMPT_CHARS: usize = 8000;

pub const LLM_SOURCE: &str = "openrouter_llm";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerMode {
    /// LLM when configured and reachable, regex otherwise.
    #[default]
    Auto,
    /// LLM only; status reports unavailable when it cannot be reached.
    Api,
    /// Regex heuristics only.
    Regex,
}

impl AnalyzerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerMode::Auto => "auto",
            AnalyzerMode::Api => "api",
            AnalyzerMode::Regex => "regex",
        }
    }
}

impl fmt::Display for AnalyzerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyzerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(AnalyzerMode::Auto),
            "api" => Ok(AnalyzerMode::Api),
            "regex" => Ok(AnalyzerMode::Regex),
            other => Err(format!("unknown analyzer mode '{other}'")),
        }
    }
}

/// Response body of `GET /api/model/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStatus {
    pub status: String,
    pub message: String,
    pub using_fallback: bool,
    pub mode: String,
}

#[derive(Debug, Deserialize)]
struct LlmScore {
    score: f64,
    #[serde(default)]
    reason: String,
}

#[derive(Clone)]
pub struct Analyzer {
    mode: AnalyzerMode,
    llm: Option<LlmClient>,
}

impl Analyzer {
    pub fn new(mode: AnalyzerMode, llm: Option<LlmClient>) -> Self {
        Self { mode, llm }
    }

    pub fn mode(&self) -> AnalyzerMode {
        self.mode
    }

    /// The LLM client, unless regex mode is forced or no key is configured.
    pub fn active_llm(&self) -> Option<&LlmClient> {
        match self.mode {
            AnalyzerMode::Regex => None,
            AnalyzerMode::Auto | AnalyzerMode::Api => self.llm.as_ref(),
        }
    }

    pub async fn analyze_resume(&self, resume_text: &str) -> ResumeAnalysis {
        if let Some(llm) = self.active_llm() {
            let prompt = RESUME_ANALYSIS_PROMPT
                .replace("{resume_text}", truncate_chars(resume_text, RESUME_PROMPT_CHARS));
            match llm.call_json::<ResumeAnalysis>(&prompt, JSON_ONLY_SYSTEM).await {
                Ok(analysis) if !analysis.skills.is_empty() || !analysis.summary.is_empty() => {
                    info!("Resume analyzed with {}", llm.model());
                    return analysis;
                }
                Ok(_) => warn!("LLM resume analysis came back empty. Falling back to regex."),
                Err(e) => warn!("LLM resume analysis failed: {e}. Falling back to regex."),
            }
        }
        resume_regex::analyze_resume(resume_text)
    }

    pub async fn analyze_job_description(&self, jd_text: &str) -> JobDescriptionFields {
        if let Some(llm) = self.active_llm() {
            let prompt =
                JD_ANALYSIS_PROMPT.replace("{jd_text}", truncate_chars(jd_text, JD_PROMPT_CHARS));
            match llm.call_json::<JobDescriptionFields>(&prompt, JSON_ONLY_SYSTEM).await {
                Ok(fields) if !fields.skills.is_empty() || !fields.summary.is_empty() => {
                    return fields;
                }
                Ok(_) => warn!("LLM job description analysis came back empty. Using regex fallback."),
                Err(e) => warn!("LLM job description analysis failed: {e}. Using regex fallback."),
            }
        }
        job_regex::analyze_job_description(jd_text)
    }

    /// LLM relevance of a resume to a search query. `None` when no LLM is
    /// usable or the call fails; callers fall back to keyword scoring.
    pub async fn relevance_score(&self, query: &str, resume_text: &str) -> Option<ScoreResult> {
        let llm = self.active_llm()?;
        let prompt = RELEVANCE_PROMPT
            .replace("{query}", query)
            .replace("{resume_text}", truncate_chars(resume_text, RESUME_PROMPT_CHARS));

        match llm.call_json::<LlmScore>(&prompt, JSON_ONLY_SYSTEM).await {
            Ok(result) => Some(ScoreResult {
                score: result.score.clamp(0.0, 100.0).round() as u32,
                reason: result.reason,
                source: LLM_SOURCE.to_string(),
            }),
            Err(e) => {
                warn!("LLM relevance scoring failed: {e}");
                None
            }
        }
    }

    /// Advice for a candidate against a job's skills.
    pub async fn suggestions(
        &self,
        resume_skills: &[String],
        jd_skills: &[String],
        resume_summary: &str,
    ) -> String {
        if let Some(llm) = self.active_llm() {
            let prompt = SUGGESTIONS_PROMPT
                .replace("{resume_skills}", &resume_skills.join(", "))
                .replace("{jd_skills}", &jd_skills.join(", "))
                .replace("{resume_summary}", resume_summary);
            match llm.call_text(&prompt, CAREER_ADVISOR_SYSTEM).await {
                Ok(text) => return text,
                Err(e) => warn!("LLM suggestions failed: {e}. Using rule-based suggestions."),
            }
        }
        rule_based_suggestions(resume_skills, jd_skills)
    }

    pub async fn status(&self) -> ModelStatus {
        let reachable = match self.active_llm() {
            Some(llm) => match llm.probe().await {
                Ok(()) => Some(llm.model().to_string()),
                Err(e) => {
                    warn!("OpenRouter probe failed: {e}");
                    None
                }
            },
            None => None,
        };
        status_for(self.mode, self.llm.is_some(), reachable.as_deref())
    }
}

/// Status report for a mode, given whether a key is configured and which
/// model answered the probe, if any.
fn status_for(mode: AnalyzerMode, configured: bool, reachable_model: Option<&str>) -> ModelStatus {
    match (mode, reachable_model) {
        (AnalyzerMode::Regex, _) => ModelStatus {
            status: "available".to_string(),
            message: "Using regex-based analysis (no LLM)".to_string(),
            using_fallback: false,
            mode: "regex".to_string(),
        },
        (_, Some(model)) => ModelStatus {
            status: "available".to_string(),
            message: format!("OpenRouter API available (model: {model})"),
            using_fallback: false,
            mode: "api".to_string(),
        },
        (AnalyzerMode::Auto, None) => ModelStatus {
            status: "available".to_string(),
            message: "Using regex-based analysis (no LLM)".to_string(),
            using_fallback: true,
            mode: "regex".to_string(),
        },
        (AnalyzerMode::Api, None) => ModelStatus {
            status: "unavailable".to_string(),
            message: if configured {
                "OpenRouter API is not reachable".to_string()
            } else {
                "OPENROUTER_API_KEY is not configured".to_string()
            },
            using_fallback: true,
            mode: "regex".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenRouterConfig;

    fn llm() -> LlmClient {
        LlmClient::new(&OpenRouterConfig {
            api_key: "test-key".to_string(),
            model: "test/model".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        })
        .unwrap()
        .with_retry_base(std::time::Duration::ZERO)
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("API".parse::<AnalyzerMode>().unwrap(), AnalyzerMode::Api);
        assert_eq!(" regex ".parse::<AnalyzerMode>().unwrap(), AnalyzerMode::Regex);
        assert!("mistral".parse::<AnalyzerMode>().is_err());
        assert_eq!(AnalyzerMode::default().to_string(), "auto");
    }

    #[test]
    fn test_regex_mode_hides_llm() {
        assert!(Analyzer::new(AnalyzerMode::Regex, Some(llm())).active_llm().is_none());
        assert!(Analyzer::new(AnalyzerMode::Auto, Some(llm())).active_llm().is_some());
        assert!(Analyzer::new(AnalyzerMode::Api, None).active_llm().is_none());
    }

    #[test]
    fn test_status_matrix() {
        let regex = status_for(AnalyzerMode::Regex, true, Some("m"));
        assert_eq!((regex.mode.as_str(), regex.using_fallback), ("regex", false));

        let api_up = status_for(AnalyzerMode::Api, true, Some("m"));
        assert_eq!(api_up.status, "available");
        assert_eq!(api_up.mode, "api");

        let auto_down = status_for(AnalyzerMode::Auto, true, None);
        assert_eq!(auto_down.status, "available");
        assert!(auto_down.using_fallback);

        let api_down = status_for(AnalyzerMode::Api, false, None);
        assert_eq!(api_down.status, "unavailable");
        assert!(api_down.message.contains("OPENROUTER_API_KEY"));
    }

    #[tokio::test]
    async fn test_unreachable_llm_falls_back_to_regex() {
        // Port 9 (discard) refuses connections, so every attempt errors out.
        let analyzer = Analyzer::new(AnalyzerMode::Auto, Some(llm()));
        let fields = analyzer
            .analyze_job_description("Backend developer with 3+ years of experience in Rust")
            .await;
        assert_eq!(fields.category, "Backend Developer");
        assert_eq!(fields.experience, "3-5 years");
    }

    #[tokio::test]
    async fn test_regex_mode_relevance_is_none_and_suggestions_are_rule_based() {
        let analyzer = Analyzer::new(AnalyzerMode::Regex, None);
        assert!(analyzer.relevance_score("rust", "rust engineer").await.is_none());

        let text = analyzer
            .suggestions(&["Rust".to_string()], &["Rust".to_string()], "")
            .await;
        assert!(text.starts_with("Excellent skill alignment!"));
    }
}
