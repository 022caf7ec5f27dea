// Resume scoring: keyword heuristics for search, trait-based resume↔job scorers,
// bag-of-words similarity and rule-based improvement suggestions.

use serde::{Deserialize, Serialize};

pub mod keyword;
pub mod scorer;
pub mod similarity;
pub mod suggestions;

/// A 0–100 score with a human-readable reason and the backend that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u32,
    pub reason: String,
    pub source: String,
}

/// Splits job skills into those covered by a resume skill and those missing.
/// A job skill is covered when either lowercased skill contains the other.
pub fn partition_skills(resume_skills: &[String], job_skills: &[String]) -> (Vec<String>, Vec<String>) {
    let resume_lower: Vec<String> = resume_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    job_skills.iter().cloned().partition(|job_skill| {
        let job_lower = job_skill.to_lowercase();
        resume_lower
            .iter()
            .any(|r| r.contains(&job_lower) || job_lower.contains(r.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partition_skills_substring_either_way() {
        let (matched, missing) = partition_skills(
            &strings(&["PostgreSQL", "react native"]),
            &strings(&["SQL", "React", "Kubernetes"]),
        );
        assert_eq!(matched, strings(&["SQL", "React"]));
        assert_eq!(missing, strings(&["Kubernetes"]));
    }

    #[test]
    fn test_partition_skills_empty_resume() {
        let (matched, missing) = partition_skills(&[], &strings(&["Go"]));
        assert!(matched.is_empty());
        assert_eq!(missing, strings(&["Go"]));
    }
}
