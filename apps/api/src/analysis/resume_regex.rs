//! Regex resume analyzer — the no-LLM path, and the fallback for every LLM failure.
//!
//! Single pass over the lowercased text: dictionary skills, years of experience,
//! highest education level, job category, then a templated summary.

use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use tracing::info;

use crate::analysis::{join_with_and, keyword_regex};
use crate::models::resume::ResumeAnalysis;

const MAX_SKILLS: usize = 15;

const TECH_SKILLS: &[&str] = &[
    "python", "java", "javascript", "typescript", "c++", "c#", "ruby", "php", "swift", "kotlin",
    "go", "rust", "html", "css", "sql", "nosql", "react", "angular", "vue", "node", "express",
    "django", "flask", "spring", "tensorflow", "pytorch", "keras", "scikit-learn", "pandas",
    "numpy", "aws", "azure", "gcp", "docker", "kubernetes", "jenkins", "ci/cd", "git", "github",
    "gitlab", "bitbucket", "jira", "agile", "scrum", "kanban", "rest", "graphql", "api",
    "microservices", "serverless", "linux", "unix", "bash", "shell", "powershell", "mongodb",
    "mysql", "postgresql", "oracle", "redis", "elasticsearch", "hadoop", "spark", "kafka",
    "rabbitmq", "figma", "sketch", "photoshop", "illustrator", "ui/ux", "responsive design",
    "mobile development", "web development", "machine learning", "deep learning", "nlp",
    "computer vision", "data science", "data analysis", "data visualization", "tableau",
    "power bi", "excel", "vba", "matlab", "r", "scala", "blockchain", "cybersecurity",
    "networking", "cloud computing", "devops", "sysadmin", "testing", "qa", "automation",
];

const SOFT_SKILLS: &[&str] = &[
    "communication", "teamwork", "leadership", "problem solving", "critical thinking",
    "time management", "project management", "analytical", "detail oriented", "creativity",
    "adaptability", "flexibility", "organization", "planning", "decision making",
    "conflict resolution", "negotiation", "presentation", "customer service", "interpersonal",
    "multitasking", "collaboration", "mentoring", "coaching",
];

/// Words left lowercase when title-casing a skill.
const SMALL_WORDS: &[&str] = &["and", "or", "the", "of", "in", "on", "at"];

/// Job categories and their keywords. Order breaks ties.
const JOB_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Software Engineering",
        &[
            "software engineer", "developer", "programmer", "coding", "software development",
            "web developer", "full stack", "frontend", "backend", "mobile developer",
            "app developer", "devops", "software architect", "programming", "coder",
        ],
    ),
    (
        "Data Science",
        &[
            "data scientist", "machine learning", "deep learning", "ai",
            "artificial intelligence", "data mining", "statistical analysis", "data analytics",
            "big data", "data modeling", "predictive modeling", "nlp",
            "natural language processing", "computer vision",
        ],
    ),
    (
        "Design",
        &[
            "designer", "ui", "ux", "user interface", "user experience", "graphic design",
            "web design", "product design", "visual design", "interaction design", "creative",
        ],
    ),
    (
        "Marketing",
        &[
            "marketing", "digital marketing", "seo", "sem", "social media", "content marketing",
            "brand", "advertising", "market research", "growth hacking", "marketing strategy",
            "marketing campaign", "marketing manager",
        ],
    ),
    (
        "Sales",
        &[
            "sales", "account executive", "business development", "sales representative",
            "account manager", "sales manager", "client acquisition", "revenue generation",
            "sales strategy", "customer acquisition", "lead generation",
        ],
    ),
    (
        "Finance",
        &[
            "finance", "financial", "accounting", "accountant", "financial analyst",
            "investment", "banking", "portfolio", "financial planning", "budget", "auditing",
            "tax", "cpa", "chartered accountant",
        ],
    ),
    (
        "Healthcare",
        &[
            "healthcare", "medical", "doctor", "nurse", "physician", "clinical", "patient care",
            "health", "hospital", "pharmacy", "pharmaceutical", "healthcare management",
            "medical professional",
        ],
    ),
    (
        "Education",
        &[
            "education", "teacher", "professor", "instructor", "teaching", "tutor", "curriculum",
            "academic", "school", "university", "college", "faculty", "educational", "lecturer",
            "training",
        ],
    ),
    (
        "Human Resources",
        &[
            "hr", "human resources", "recruiting", "recruitment", "talent acquisition", "hiring",
            "personnel", "hr manager", "benefits", "compensation", "employee relations",
            "hr specialist", "human capital",
        ],
    ),
    (
        "Project Management",
        &[
            "project manager", "project management", "program manager", "scrum master", "agile",
            "pmp", "prince2", "project coordination", "project delivery", "project planning",
            "project lead",
        ],
    ),
    (
        "Operations",
        &[
            "operations", "operations manager", "supply chain", "logistics", "procurement",
            "inventory management", "warehouse", "production", "operational excellence",
            "process improvement", "business operations",
        ],
    ),
];

const DEFAULT_CATEGORY: &str = "Professional";
/// Below this keyword score the title line gets a say in the category.
const WEAK_CATEGORY_SCORE: usize = 3;

const MONTH: &str = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?";

static SKILL_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    TECH_SKILLS
        .iter()
        .chain(SOFT_SKILLS)
        .map(|&skill| (skill, keyword_regex(skill)))
        .collect()
});

static SKILLS_SECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?is)(?:technical\s+)?skills\s*(?::|&|•|\n)(.*?)(?:\n\n|\n[A-Z])",
        r"(?is)(?:technical|professional)\s+skills(.*?)(?:\n\n|\n[A-Z])",
        r"(?is)(?:expertise|proficiencies|competencies)(.*?)(?:\n\n|\n[A-Z])",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("skills section regex is valid"))
    .collect()
});

static SKILL_ITEM_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,•]|\s{2,}").expect("skill split regex is valid"));

static DIRECT_EXPERIENCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+)\+?\s+years?(?:\s+of)?\s+experience",
        r"experience\s+(?:of\s+)?(\d+)\+?\s+years?",
        r"(?:over|more\s+than)\s+(\d+)\s+years?(?:\s+of)?\s+experience",
        r"(\d+)\s*\+\s*years?(?:\s+of)?\s+(?:industry|professional|work)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("experience regex is valid"))
    .collect()
});

static DATE_RANGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(&format!(
            r"(?i){MONTH}\s+(\d{{4}})\s*(?:–|-|to)\s*(?:{MONTH}\s+(\d{{4}})|present|current)"
        ))
        .expect("date range regex is valid"),
        Regex::new(r"(?i)(\d{4})\s*(?:–|-|to)\s*(?:(\d{4})|present|current)")
            .expect("year range regex is valid"),
    ]
});

static GRADUATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"graduated\s+(?:in|on)?\s*(\d{4})",
        r"class\s+of\s+(\d{4})",
        r"(?:degree|diploma|certificate)\s+(?:received|awarded|conferred)\s+(?:in|on)?\s*(\d{4})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("graduation regex is valid"))
    .collect()
});

/// Education levels, highest first.
static EDUCATION_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("PhD", r"(?i)\b(?:ph\.?d\.?|doctor\s+of\s+philosophy|doctoral)\b"),
        ("Master's", r"(?i)\b(?:master'?s?|ms\.?|m\.s\.?|m\.a\.?|mba|m\.b\.a\.?)\b"),
        (
            "Bachelor's",
            r"(?i)\b(?:bachelor'?s?|ba|b\.a\.?|bs|b\.s\.?|b\.e\.?|btech|b\.tech\.?)\b",
        ),
        ("Associate's", r"(?i)\b(?:associate'?s?|a\.a\.?|a\.s\.?|a\.a\.s\.?)\b"),
        (
            "High School",
            r"(?i)\b(?:high\s+school|secondary\s+school|diploma|g\.?e\.?d\.?)\b",
        ),
    ]
    .into_iter()
    .map(|(level, p)| (level, Regex::new(p).expect("education regex is valid")))
    .collect()
});

static COLLEGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:university|college|institute)\b").expect("college regex is valid")
});

static CATEGORY_PATTERNS: LazyLock<Vec<(&'static str, Vec<Regex>)>> = LazyLock::new(|| {
    JOB_CATEGORIES
        .iter()
        .map(|(category, keywords)| (*category, keywords.iter().map(|k| keyword_regex(k)).collect()))
        .collect()
});

static TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(?:^|\n)(?:title|position):\s*(.*?)(?:\n|$)",
        r"(?i)(?:^|\n)(.*?)(?:\n|$)",
        r"(?i)\b(?:senior|junior|lead|principal|staff|chief|head|director\s+of)\s+(.*?engineer|.*?developer|.*?scientist|.*?analyst|.*?manager|.*?designer)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("title regex is valid"))
    .collect()
});

/// Analyzes a resume with regex heuristics only.
pub fn analyze_resume(resume_text: &str) -> ResumeAnalysis {
    analyze_resume_at(resume_text, Utc::now().year())
}

/// Same as [`analyze_resume`], with "present" resolved to `current_year`.
pub fn analyze_resume_at(resume_text: &str, current_year: i32) -> ResumeAnalysis {
    let normalized = resume_text.to_lowercase();

    let skills = extract_skills(&normalized, resume_text);
    let experience = extract_experience(&normalized, current_year);
    let education_level = extract_education_level(&normalized).to_string();
    let category = determine_job_category(&normalized, resume_text).to_string();
    let summary = generate_summary(resume_text, &skills, experience, &education_level, &category);

    info!(
        "Regex analysis results: {} skills, {} years experience, {} education, {} category",
        skills.len(),
        experience,
        education_level,
        category
    );

    ResumeAnalysis {
        summary,
        skills,
        experience,
        education_level,
        category,
    }
}

/// Dictionary skills (title-cased) followed by items from any skills section, capped at 15.
pub fn extract_skills(normalized: &str, original: &str) -> Vec<String> {
    let mut found: Vec<String> = SKILL_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(normalized))
        .map(|(skill, _)| title_case(skill))
        .collect();

    for pattern in SKILLS_SECTION_PATTERNS.iter() {
        let Some(section) = pattern.captures(original).and_then(|c| c.get(1)) else {
            continue;
        };
        for item in SKILL_ITEM_SPLIT.split(section.as_str()) {
            let item = item.trim();
            if item.chars().count() > 2 && !found.iter().any(|s| s.eq_ignore_ascii_case(item)) {
                found.push(item.to_string());
            }
        }
    }

    let mut unique: Vec<String> = Vec::with_capacity(found.len());
    for skill in found {
        if !unique.contains(&skill) {
            unique.push(skill);
        }
    }
    unique.truncate(MAX_SKILLS);
    unique
}

/// Years of experience: explicit mention, else merged employment ranges,
/// else years since graduation, else a guess from document size.
pub fn extract_experience(normalized: &str, current_year: i32) -> u32 {
    for pattern in DIRECT_EXPERIENCE_PATTERNS.iter() {
        if let Some(years) = pattern
            .captures(normalized)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            return years;
        }
    }

    let mut ranges: Vec<(i32, i32)> = Vec::new();
    for pattern in DATE_RANGE_PATTERNS.iter() {
        for caps in pattern.captures_iter(normalized) {
            let Some(start) = caps.get(1).and_then(|m| m.as_str().parse::<i32>().ok()) else {
                continue;
            };
            let end = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<i32>().ok())
                .unwrap_or(current_year);
            ranges.push((start, end));
        }
    }
    if !ranges.is_empty() {
        return merged_span_years(ranges).max(1);
    }

    for pattern in GRADUATION_PATTERNS.iter() {
        if let Some(year) = pattern
            .captures(normalized)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok())
        {
            if (1980..=current_year).contains(&year) {
                return (current_year - year) as u32;
            }
        }
    }

    let line_count = normalized.split('\n').count();
    let word_count = normalized.split_whitespace().count();
    if line_count > 70 || word_count > 700 {
        5
    } else if line_count > 50 || word_count > 500 {
        3
    } else {
        1
    }
}

/// Total years covered by possibly overlapping `(start, end)` ranges.
/// Ranges ending before they start are ignored.
fn merged_span_years(mut ranges: Vec<(i32, i32)>) -> u32 {
    ranges.sort_unstable();
    let mut total = 0;
    let mut current: Option<(i32, i32)> = None;

    for (start, end) in ranges {
        if end < start {
            continue;
        }
        match current {
            None => {
                current = Some((start, end));
                total += end - start;
            }
            Some((span_start, span_end)) if start <= span_end => {
                if end > span_end {
                    total += end - span_end;
                    current = Some((span_start, end));
                }
            }
            Some(_) => {
                current = Some((start, end));
                total += end - start;
            }
        }
    }
    total.max(0) as u32
}

/// Highest education level mentioned. A bare university mention counts as Bachelor's.
pub fn extract_education_level(normalized: &str) -> &'static str {
    EDUCATION_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(normalized))
        .map(|(level, _)| *level)
        .unwrap_or_else(|| {
            if COLLEGE_PATTERN.is_match(normalized) {
                "Bachelor's"
            } else {
                "High School"
            }
        })
}

/// Category with the most keyword hits; a weak winner defers to the title line.
pub fn determine_job_category(normalized: &str, original: &str) -> &'static str {
    let mut best_category = DEFAULT_CATEGORY;
    let mut best_score = 0;

    for (category, patterns) in CATEGORY_PATTERNS.iter() {
        let score: usize = patterns
            .iter()
            .map(|re| re.find_iter(normalized).count())
            .sum();
        if score > best_score {
            best_score = score;
            best_category = category;
        }
    }

    if best_score < WEAK_CATEGORY_SCORE {
        for pattern in TITLE_PATTERNS.iter() {
            let Some(title) = pattern.captures(original).and_then(|c| c.get(1)) else {
                continue;
            };
            let title = title.as_str().to_lowercase();
            if let Some((category, _)) = CATEGORY_PATTERNS
                .iter()
                .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(&title)))
            {
                return category;
            }
        }
    }

    best_category
}

/// Fills one of five summary templates. The template and skill count are
/// derived from the text so the same resume always yields the same summary.
pub fn generate_summary(
    resume_text: &str,
    skills: &[String],
    experience_years: u32,
    education_level: &str,
    category: &str,
) -> String {
    let seed = resume_text
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    let skill_count = if skills.len() >= 3 {
        (3 + (seed / 5 % 3) as usize).min(skills.len())
    } else {
        skills.len()
    };
    let skills_text = join_with_and(&skills[..skill_count])
        .unwrap_or_else(|| "various technical and professional competencies".to_string());
    let exp = experience_bucket(experience_years);
    let edu = education_level;

    match seed % 5 {
        0 => format!(
            "{category} professional with {exp} years of experience and {edu} education. Skilled in {skills_text}."
        ),
        1 => format!(
            "Experienced {category} specialist with {edu}-level education and {exp} years in the field. Proficient in {skills_text}."
        ),
        2 => format!(
            "{edu}-educated {category} expert with {exp} years of professional experience. Strong background in {skills_text}."
        ),
        3 => format!(
            "Dedicated {category} professional with {exp}+ years of hands-on experience. {edu} graduate with expertise in {skills_text}."
        ),
        _ => format!(
            "Results-driven {category} specialist with {edu} degree and {exp} years of industry experience. Skilled in {skills_text}."
        ),
    }
}

/// Human-friendly experience range used in summaries.
pub fn experience_bucket(years: u32) -> &'static str {
    match years {
        1 => "1",
        0..=2 => "2-3",
        3..=4 => "3-5",
        5..=7 => "5-7",
        8..=11 => "8-10",
        _ => "10+",
    }
}

fn title_case(skill: &str) -> String {
    skill
        .split_whitespace()
        .map(|word| {
            if SMALL_WORDS.contains(&word) {
                word.to_string()
            } else {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
