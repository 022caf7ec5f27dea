//! Rule-based advice used when no LLM is available.

use crate::matching::partition_skills;

const MAX_NAMED_SKILLS: usize = 3;

pub fn rule_based_suggestions(resume_skills: &[String], jd_skills: &[String]) -> String {
    if jd_skills.is_empty() {
        return "No job requirements were provided to compare against. Lead with your strongest \
            skills and quantify the results you delivered with them."
            .to_string();
    }

    let (matched, missing) = partition_skills(resume_skills, jd_skills);
    let name = |skills: &[String]| skills[..skills.len().min(MAX_NAMED_SKILLS)].join(", ");

    match (matched.is_empty(), missing.is_empty()) {
        (false, false) => format!(
            "Great match on {}! To strengthen your profile, consider highlighting experience with {} \
            if you've used them in your projects but haven't mentioned them prominently in your resume.",
            name(&matched),
            name(&missing)
        ),
        (false, true) => format!(
            "Excellent skill alignment! Your expertise in {} makes you a strong candidate for this position.",
            name(&matched)
        ),
        _ => format!(
            "While your background is valuable, consider developing skills in {} to better align \
            with this role's requirements.",
            name(&missing)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mixed_names_at_most_three() {
        let text = rule_based_suggestions(
            &strings(&["Rust", "SQL"]),
            &strings(&["Rust", "SQL", "Docker", "Kubernetes", "Terraform", "Helm"]),
        );
        assert!(text.starts_with("Great match on Rust, SQL!"));
        assert!(text.contains("Docker, Kubernetes, Terraform if"));
        assert!(!text.contains("Helm"));
    }

    #[test]
    fn test_all_matched() {
        let text = rule_based_suggestions(&strings(&["Python 3"]), &strings(&["python"]));
        assert_eq!(
            text,
            "Excellent skill alignment! Your expertise in python makes you a strong candidate for this position."
        );
    }

    #[test]
    fn test_none_matched() {
        let text = rule_based_suggestions(&[], &strings(&["Go"]));
        assert!(text.starts_with("While your background is valuable, consider developing skills in Go"));
    }

    #[test]
    fn test_no_job_skills_is_neutral() {
        let text = rule_based_suggestions(&strings(&["Rust"]), &[]);
        assert!(text.starts_with("No job requirements"));
    }
}
