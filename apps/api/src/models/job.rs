use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    #[default]
    Open,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(JobStatus::Draft),
            "open" => Ok(JobStatus::Open),
            "closed" => Ok(JobStatus::Closed),
            other => Err(format!("unknown job status '{other}'")),
        }
    }
}

/// Fields extracted from a job description text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptionFields {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub category: String,
}

/// Response shape of the job-description analysis endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct JobDescriptionAnalysis {
    pub id: Uuid,
    pub filename: String,
    #[serde(flatten)]
    pub fields: JobDescriptionFields,
}

/// A recruiter-authored job posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: Uuid,
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
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a job posting. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub skills: Option<Vec<String>>,
    pub experience: Option<String>,
    pub category: Option<String>,
    pub status: Option<JobStatus>,
}

impl JobPosting {
    /// A new open posting with no extracted fields yet.
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            company: company.into(),
            description: description.into(),
            requirements: Vec::new(),
            skills: Vec::new(),
            experience: String::new(),
            category: String::new(),
            status: JobStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a patch in place and bumps `updated_at`.
    pub fn apply(&mut self, patch: JobPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(company) = patch.company {
            self.company = company;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(requirements) = patch.requirements {
            self.requirements = requirements;
        }
        if let Some(skills) = patch.skills {
            self.skills = skills;
        }
        if let Some(experience) = patch.experience {
            self.experience = experience;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting() -> JobPosting {
        let now = Utc::now();
        JobPosting {
            id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            description: String::new(),
            requirements: vec![],
            skills: vec!["Rust".to_string()],
            experience: "3-5 years".to_string(),
            category: "Software Engineer".to_string(),
            status: JobStatus::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_apply_only_touches_given_fields() {
        let mut job = posting();
        let before = job.updated_at;
        job.apply(JobPatch {
            status: Some(JobStatus::Open),
            skills: Some(vec!["Rust".to_string(), "SQL".to_string()]),
            ..Default::default()
        });
        assert_eq!(job.status, JobStatus::Open);
        assert_eq!(job.skills.len(), 2);
        assert_eq!(job.title, "Backend Engineer");
        assert!(job.updated_at >= before);
    }

    #[test]
    fn test_analysis_flattens_fields() {
        let analysis = JobDescriptionAnalysis {
            id: Uuid::new_v4(),
            filename: "jd.txt".to_string(),
            fields: JobDescriptionFields {
                summary: "s".to_string(),
                skills: vec!["Python".to_string()],
                requirements: vec![],
                experience: "2-4 years".to_string(),
                category: "Data Scientist".to_string(),
            },
        };
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["filename"], "jd.txt");
        assert_eq!(value["skills"][0], "Python");
        assert_eq!(value["experience"], "2-4 years");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Closed".parse::<JobStatus>().unwrap(), JobStatus::Closed);
        assert!("archived".parse::<JobStatus>().is_err());
    }
}
