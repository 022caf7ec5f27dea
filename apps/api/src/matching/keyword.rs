//! Keyword relevance of a stored resume to a free-text recruiter query.
//!
//! Weights: summary 0.4, skills 0.3, experience 0.2, education 0.1.

use std::sync::LazyLock;

use regex::Regex;

use crate::matching::ScoreResult;
use crate::models::resume::Resume;

pub const KEYWORD_SOURCE: &str = "keyword_matching";
const NO_REASON: &str = "No specific match reasons found for keyword search.";

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word regex is valid"));
static REQUIRED_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*\+?\s*year(?:s)?(?: experience)?").expect("years regex is valid")
});

pub fn keyword_match_score(query: &str, resume: &Resume) -> ScoreResult {
    let mut score = 0.0_f64;
    let mut reasons: Vec<String> = Vec::new();

    // Summary
    if !resume.summary.is_empty() {
        let summary_lower = resume.summary.to_lowercase();
        let hits = WORD
            .find_iter(query)
            .map(|m| m.as_str().to_lowercase())
            .filter(|w| w.chars().count() > 2)
            .filter(|w| summary_lower.contains(w.as_str()))
            .count();
        let summary_score = (hits * 10).min(100);
        score += summary_score as f64 * 0.4;
        if summary_score > 0 {
            reasons.push(format!("Summary relevance: {hits} keyword(s) matched."));
        }
    }

    // Skills
    if !resume.skills.is_empty() {
        let query_tokens: Vec<String> = query
            .split(' ')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let matched: Vec<&str> = resume
            .skills
            .iter()
            .filter(|skill| {
                let skill_lower = skill.to_lowercase();
                query_tokens.iter().any(|t| skill_lower.contains(t.as_str()))
            })
            .map(String::as_str)
            .collect();
        let skill_score = (matched.len() * 20).min(100);
        score += skill_score as f64 * 0.3;
        if !matched.is_empty() {
            reasons.push(format!(
                "Skills match: {} relevant skill(s) found: {}.",
                matched.len(),
                matched.join(", ")
            ));
        }
    }

    // Experience
    let required = REQUIRED_YEARS
        .captures(query)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0);
    let have = resume.experience;
    let experience_score = if have >= required {
        reasons.push(format!("Experience: Matches required {required}+ years."));
        100.0
    } else if have > 0 && required > 0 {
        reasons.push(format!(
            "Experience: {have} years, {required} years required."
        ));
        have as f64 / required as f64 * 100.0
    } else {
        0.0
    };
    score += experience_score * 0.2;

    // Education
    let query_lower = query.to_lowercase();
    let education_lower = resume.education_level.to_lowercase();
    let names_degree = ["master", "bachelor", "phd"]
        .iter()
        .any(|d| query_lower.contains(d));
    let education_score = if ["master", "bachelor", "phd"]
        .iter()
        .any(|d| query_lower.contains(d) && education_lower.contains(d))
    {
        100.0
    } else if !names_degree && !education_lower.is_empty() {
        50.0
    } else {
        0.0
    };
    if education_score > 0.0 {
        reasons.push(format!(
            "Education: {} matches query.",
            resume.education_level
        ));
    }
    score += education_score * 0.1;

    ScoreResult {
        score: (score as i64).clamp(0, 100) as u32,
        reason: if reasons.is_empty() {
            NO_REASON.to_string()
        } else {
            reasons.join("; ")
        },
        source: KEYWORD_SOURCE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ResumeAnalysis;

    fn resume(summary: &str, skills: &[&str], experience: u32, education: &str) -> Resume {
        Resume::from_upload(
            "cv.txt",
            None,
            ResumeAnalysis {
                summary: summary.to_string(),
                skills: skills.iter().map(|s| s.to_string()).collect(),
                experience,
                education_level: education.to_string(),
                category: "Software Engineering".to_string(),
            },
        )
    }

    #[test]
    fn test_weighted_score() {
        let r = resume(
            "Backend engineer building Rust services",
            &["Rust", "Docker", "SQL"],
            5,
            "Bachelor's",
        );
        let result = keyword_match_score("rust engineer 3+ years", &r);
        // summary 2 hits → 20×0.4, skills 1 → 20×0.3, experience 100×0.2, education 50×0.1
        assert_eq!(result.score, 39);
        assert_eq!(result.source, KEYWORD_SOURCE);
        assert!(result.reason.contains("Summary relevance: 2 keyword(s) matched."));
        assert!(result.reason.contains("Skills match: 1 relevant skill(s) found: Rust."));
        assert!(result.reason.contains("Matches required 3+ years"));
    }

    #[test]
    fn test_partial_experience() {
        let r = resume("", &[], 2, "");
        let result = keyword_match_score("need 4 years experience", &r);
        // 2/4 × 100 × 0.2
        assert_eq!(result.score, 10);
        assert!(result.reason.contains("2 years, 4 years required"));
    }

    #[test]
    fn test_degree_mismatch_scores_zero_education() {
        let r = resume("", &[], 0, "Bachelor's");
        let result = keyword_match_score("master's degree", &r);
        // only the experience component (0 ≥ 0) contributes
        assert_eq!(result.score, 20);
        assert!(!result.reason.contains("Education"));
    }

    #[test]
    fn test_degree_agreement() {
        let r = resume("", &[], 0, "PhD");
        let result = keyword_match_score("phd researcher", &r);
        assert_eq!(result.score, 30);
    }

    #[test]
    fn test_score_is_capped() {
        let r = resume(
            "rust tokio axum serde sqlx tracing tower hyper reqwest clap anyhow",
            &["rust", "tokio", "axum", "serde", "sqlx", "tower"],
            10,
            "Master's",
        );
        let result = keyword_match_score(
            "rust tokio axum serde sqlx tracing tower hyper reqwest clap anyhow master",
            &r,
        );
        assert_eq!(result.score, 100);
    }
}
