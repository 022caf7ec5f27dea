use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeStatus {
    Pending,
    #[default]
    Processed,
}

impl ResumeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeStatus::Pending => "pending",
            ResumeStatus::Processed => "processed",
        }
    }
}

impl fmt::Display for ResumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResumeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ResumeStatus::Pending),
            "processed" => Ok(ResumeStatus::Processed),
            other => Err(format!("unknown resume status '{other}'")),
        }
    }
}

/// Structured fields extracted from a resume, by the LLM or the regex analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_years")]
    pub experience: u32,
    #[serde(rename = "educationLevel", alias = "education_level", default)]
    pub education_level: String,
    #[serde(default)]
    pub category: String,
}

/// A stored resume document and its extracted fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resume {
    pub id: Uuid,
    pub filename: String,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    /// Location of the document in the file store.
    #[serde(default)]
    pub file_key: Option<String>,
    pub download_url: String,
    pub upload_date: DateTime<Utc>,
    #[serde(default)]
    pub status: ResumeStatus,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_years")]
    pub experience: u32,
    #[serde(rename = "educationLevel", alias = "education_level", default)]
    pub education_level: String,
    #[serde(default)]
    pub category: String,
}

impl Resume {
    /// Builds a processed resume record for a freshly uploaded document.
    pub fn from_upload(
        filename: impl Into<String>,
        owner_id: Option<Uuid>,
        analysis: ResumeAnalysis,
    ) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            filename: filename.into(),
            owner_id,
            file_key: None,
            download_url: download_url_for(id),
            upload_date: Utc::now(),
            status: ResumeStatus::Processed,
            summary: analysis.summary,
            skills: analysis.skills,
            experience: analysis.experience,
            education_level: analysis.education_level,
            category: analysis.category,
        }
    }
}

pub fn download_url_for(id: Uuid) -> String {
    format!("/api/resumes/download/{id}")
}

/// Accepts whole years as a number (`5`, `3.5`) or a string (`"5"`, `"5+"`, `" 3 "`).
/// Anything unparseable becomes 0.
pub fn deserialize_years<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(years_from_value).unwrap_or(0))
}

pub fn years_from_value(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v.min(u32::MAX as u64) as u32)
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u32))
            .unwrap_or(0),
        Value::String(s) => parse_years(s),
        _ => 0,
    }
}

pub fn parse_years(raw: &str) -> u32 {
    let cleaned = raw.replace('+', "");
    let cleaned = cleaned.trim();
    cleaned
        .parse::<u32>()
        .ok()
        .or_else(|| cleaned.parse::<f64>().ok().map(|f| f.max(0.0) as u32))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_years_variants() {
        assert_eq!(parse_years("5"), 5);
        assert_eq!(parse_years("5+"), 5);
        assert_eq!(parse_years(" 3.5 "), 3);
        assert_eq!(parse_years("a lot"), 0);
        assert_eq!(parse_years(""), 0);
    }

    #[test]
    fn test_analysis_accepts_string_experience_and_camel_case() {
        let analysis: ResumeAnalysis = serde_json::from_value(json!({
            "summary": "Backend engineer",
            "skills": ["Rust", "SQL"],
            "experience": "7+",
            "educationLevel": "Master's",
            "category": "Software Engineering"
        }))
        .unwrap();
        assert_eq!(analysis.experience, 7);
        assert_eq!(analysis.education_level, "Master's");
    }

    #[test]
    fn test_analysis_accepts_snake_case_and_missing_fields() {
        let analysis: ResumeAnalysis = serde_json::from_value(json!({
            "education_level": "PhD",
            "experience": null
        }))
        .unwrap();
        assert_eq!(analysis.education_level, "PhD");
        assert_eq!(analysis.experience, 0);
        assert!(analysis.skills.is_empty());
    }

    #[test]
    fn test_resume_serializes_education_level_camel_case() {
        let resume = Resume::from_upload("cv.pdf", None, ResumeAnalysis::default());
        let value = serde_json::to_value(&resume).unwrap();
        assert!(value.get("educationLevel").is_some());
        assert_eq!(value["status"], "processed");
        assert_eq!(
            value["download_url"],
            format!("/api/resumes/download/{}", resume.id)
        );
    }
}
