//! Regex job-description analyzer.

use std::sync::LazyLock;

use regex::Regex;

use crate::analysis::{keyword_pattern, keyword_regex};
use crate::models::job::JobDescriptionFields;

const MAX_SKILLS: usize = 20;
pub const DEFAULT_EXPERIENCE: &str = "2-4 years";
pub const DEFAULT_CATEGORY: &str = "Software Engineer";
const SUMMARY_SKILLS: usize = 4;

const SKILL_GROUPS: &[&[&str]] = &[
    // languages and frameworks
    &[
        "Python", "JavaScript", "Java", "React", "Node.js", "Angular", "Vue", "SQL", "NoSQL",
        "MongoDB", "PostgreSQL", "MySQL", "AWS", "Azure", "GCP", "Docker", "Kubernetes", "Git",
        "Linux", "HTML", "CSS", "TypeScript", "PHP", "C++", "C#", "Ruby", "Go", "Rust", "Swift",
        "Kotlin", "Flutter", "Django", "Flask", "Express", "Spring", "Laravel", "R", "Scala",
        "Matlab",
    ],
    // ML / AI
    &[
        "TensorFlow", "PyTorch", "Keras", "Scikit-learn", "Pandas", "NumPy", "Scipy", "OpenCV",
        "NLTK", "spaCy", "Gensim", "CoreNLP", "OpenNLP", "LingPipe", "Mallet", "Theano", "MLlib",
        "Machine Learning", "Deep Learning", "NLP", "Natural Language Processing",
        "Computer Vision", "Neural Networks",
    ],
    // data and analytics
    &[
        "Spark", "Hadoop", "Kafka", "Elasticsearch", "Redis", "Cassandra", "HBase", "BigQuery",
        "Snowflake", "Tableau", "Power BI", "Jupyter", "Anaconda", "Data Mining", "ETL",
        "Data Warehousing", "Statistics", "Analytics",
    ],
    // web
    &[
        "REST", "GraphQL", "API", "Microservices", "JSON", "XML", "HTTP", "HTTPS", "OAuth", "JWT",
        "WebSocket", "Ajax", "Bootstrap", "Material UI", "Webpack", "Babel", "NPM", "Yarn",
    ],
    // devops and cloud
    &[
        "Jenkins", "Travis", "CircleCI", "GitLab", "GitHub", "Terraform", "Ansible", "Chef",
        "Puppet", "Nagios", "Prometheus", "Grafana", "ELK", "Splunk", "CloudFormation", "Lambda",
        "EC2", "S3", "RDS", "DynamoDB",
    ],
    // databases and queues
    &[
        "Oracle", "SQL Server", "MariaDB", "SQLite", "Neo4j", "InfluxDB", "TimescaleDB",
        "Memcached", "RabbitMQ", "ActiveMQ", "Apache Kafka",
    ],
    // scraping and automation
    &[
        "Selenium", "Scrapy", "BeautifulSoup", "Puppeteer", "Playwright", "Requests", "Urllib",
        "Mechanize", "Web Scraping", "Data Extraction", "Automation", "Bot", "Crawler",
    ],
    // methodologies and soft skills
    &[
        "Agile", "Scrum", "Kanban", "JIRA", "Confluence", "Slack", "Teams", "Communication",
        "Leadership", "Problem Solving", "Critical Thinking", "Analytical",
    ],
];

/// Phrases the dictionaries miss, with the skill name they map to.
const COMPOUND_SKILLS: &[(&str, &str)] = &[
    ("sentiment analysis", "Sentiment Analysis"),
    ("text mining", "Text Mining"),
    ("entity extraction", "Entity Extraction"),
    ("document classification", "Document Classification"),
    ("topic modeling", "Topic Modeling"),
    ("natural language understanding", "NLU"),
    ("natural language generation", "NLG"),
    ("web scraping", "Web Scraping"),
    ("data extraction", "Data Extraction"),
    ("machine learning", "Machine Learning"),
    ("deep learning", "Deep Learning"),
    ("computer vision", "Computer Vision"),
    ("data science", "Data Science"),
    ("artificial intelligence", "AI"),
    ("neural networks", "Neural Networks"),
    ("supervised learning", "Supervised Learning"),
    ("unsupervised learning", "Unsupervised Learning"),
    ("reinforcement learning", "Reinforcement Learning"),
    ("feature engineering", "Feature Engineering"),
    ("model deployment", "Model Deployment"),
    ("statistical analysis", "Statistical Analysis"),
    ("data visualization", "Data Visualization"),
    ("rest api", "REST API"),
    ("restful api", "RESTful API"),
    ("message queue", "Message Queues"),
    ("proxy server", "Proxy"),
    ("browser fingerprinting", "Browser Fingerprinting"),
    ("bot detection", "Bot Detection"),
    ("captcha solving", "CAPTCHA"),
    ("web development", "Web Development"),
    ("full stack", "Full-Stack"),
    ("backend development", "Backend Development"),
    ("frontend development", "Frontend Development"),
];

/// Ordered: the first category with any keyword hit wins.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "data scientist",
        &["data scientist", "data science", "analytics", "statistical analysis"],
    ),
    (
        "nlp engineer",
        &["nlp", "natural language processing", "text mining", "sentiment analysis"],
    ),
    (
        "machine learning engineer",
        &["machine learning", "ml engineer", "model deployment", "deep learning"],
    ),
    (
        "software engineer",
        &["software engineer", "software development", "programming"],
    ),
    (
        "backend developer",
        &["backend", "back-end", "server-side", "api development"],
    ),
    (
        "frontend developer",
        &["frontend", "front-end", "ui", "user interface"],
    ),
    ("full-stack developer", &["full-stack", "fullstack", "full stack"]),
    (
        "devops engineer",
        &["devops", "dev ops", "deployment", "infrastructure"],
    ),
    (
        "web scraping specialist",
        &["web scraping", "data extraction", "scraping", "crawling"],
    ),
];

static SKILL_GROUP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SKILL_GROUPS
        .iter()
        .map(|terms| {
            let alternation = terms
                .iter()
                .map(|t| keyword_pattern(t))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!("(?i)(?:{alternation})")).expect("skill group regex is valid")
        })
        .collect()
});

static EXPERIENCE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(\d+)\s*(?:\+|(?:-|–|to)\s*(\d+))?\s*\+?\s*years?\s*(?:of\s+)?(?:experience|exp)",
        r"(?i)(\d+)[+\-]\s*years?\s*(?:experience|exp)",
        r"(?i)minimum\s+(?:of\s+)?(\d+)\s*years?",
        r"(?i)at\s+least\s+(\d+)\s*years?",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("experience regex is valid"))
    .collect()
});

static CATEGORY_PATTERNS: LazyLock<Vec<(&'static str, Vec<Regex>)>> = LazyLock::new(|| {
    CATEGORIES
        .iter()
        .map(|(category, keywords)| (*category, keywords.iter().map(|k| keyword_regex(k)).collect()))
        .collect()
});

static BACHELOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:bachelor|b\.s|bs|degree)\b").expect("degree regex is valid")
});
static MASTER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:master|m\.s|ms)\b").expect("degree regex is valid"));
static PHD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:phd|ph\.d|doctorate)\b").expect("degree regex is valid")
});

/// Analyzes a job description with regex heuristics only.
pub fn analyze_job_description(jd_text: &str) -> JobDescriptionFields {
    let lower = jd_text.to_lowercase();

    let skills = extract_skills(jd_text, &lower);
    let experience = extract_experience(jd_text);
    let category = determine_category(&lower);
    let summary = build_summary(&lower, &category, &experience, &skills);
    let requirements = extract_requirements(jd_text, &experience, &skills);

    JobDescriptionFields {
        summary,
        skills,
        requirements,
        experience,
        category,
    }
}

pub fn extract_skills(jd_text: &str, lower: &str) -> Vec<String> {
    let mut skills: Vec<String> = Vec::new();

    for pattern in SKILL_GROUP_PATTERNS.iter() {
        for m in pattern.find_iter(jd_text) {
            let found = m.as_str();
            if !skills.iter().any(|s| s.eq_ignore_ascii_case(found)) {
                skills.push(found.to_string());
            }
        }
    }

    for (phrase, name) in COMPOUND_SKILLS {
        if lower.contains(phrase) && !skills.iter().any(|s| s.eq_ignore_ascii_case(name)) {
            skills.push(name.to_string());
        }
    }

    skills.truncate(MAX_SKILLS);
    skills
}

/// Required experience as "N-M years".
pub fn extract_experience(jd_text: &str) -> String {
    for pattern in EXPERIENCE_PATTERNS.iter() {
        let Some(caps) = pattern.captures(jd_text) else {
            continue;
        };
        let Some(min) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
            continue;
        };
        let max = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(min + 2);
        return format!("{min}-{max} years");
    }
    DEFAULT_EXPERIENCE.to_string()
}

pub fn determine_category(lower: &str) -> String {
    CATEGORY_PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(lower)))
        .map(|(category, _)| title_case(category))
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
}

fn build_summary(lower: &str, category: &str, experience: &str, skills: &[String]) -> String {
    let mut focus: Vec<&str> = Vec::new();
    if lower.contains("nlp") || lower.contains("natural language") {
        focus.push("NLP and machine learning");
    }
    if lower.contains("scraping") || lower.contains("extraction") {
        focus.push("web scraping and data extraction");
    }
    if lower.contains("model") && (lower.contains("deployment") || lower.contains("training")) {
        focus.push("model development and deployment");
    }
    let focus = if focus.is_empty() {
        "software development".to_string()
    } else {
        focus.join(" and ")
    };

    let summary_skills = if skills.is_empty() {
        "various technologies".to_string()
    } else {
        skills[..skills.len().min(SUMMARY_SKILLS)].join(", ")
    };

    format!("{category} position focusing on {focus}, requiring {experience} experience with {summary_skills}.")
}

fn extract_requirements(jd_text: &str, experience: &str, skills: &[String]) -> Vec<String> {
    let mut requirements = Vec::new();

    if BACHELOR_PATTERN.is_match(jd_text) {
        requirements.push("Bachelor's degree".to_string());
    }
    if MASTER_PATTERN.is_match(jd_text) {
        requirements.push("Master's degree preferred".to_string());
    }
    if PHD_PATTERN.is_match(jd_text) {
        requirements.push("PhD preferred".to_string());
    }
    if experience != DEFAULT_EXPERIENCE {
        requirements.push(format!("{experience} experience"));
    }

    let lowered: Vec<String> = skills.iter().map(|s| s.to_lowercase()).collect();
    if lowered.iter().any(|s| s == "ml" || s.contains("machine learning")) {
        requirements.push("Machine Learning experience".to_string());
    }
    if lowered
        .iter()
        .any(|s| s.contains("nlp") || s.contains("natural language"))
    {
        requirements.push("NLP/Text processing experience".to_string());
    }
    if lowered
        .iter()
        .any(|s| s.contains("scraping") || s.contains("extraction"))
    {
        requirements.push("Web scraping experience".to_string());
    }

    requirements
}

/// Uppercases the first letter of every space- or hyphen-separated word.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c == ' ' || c == '-';
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKEND_JD: &str = "Senior Backend Developer
We need 5+ years of experience with Python, Django and PostgreSQL. Experience with Docker and AWS.
Bachelor's degree in Computer Science required. Familiarity with REST APIs.";

    #[test]
    fn test_backend_description() {
        let fields = analyze_job_description(BACKEND_JD);
        assert_eq!(fields.category, "Backend Developer");
        assert_eq!(fields.experience, "5-7 years");
        for skill in ["Python", "Django", "PostgreSQL", "Docker", "AWS", "REST", "REST API"] {
            assert!(fields.skills.iter().any(|s| s == skill), "missing {skill}");
        }
        assert!(fields.requirements.contains(&"Bachelor's degree".to_string()));
        assert!(fields.requirements.contains(&"5-7 years experience".to_string()));
        assert!(!fields.requirements.iter().any(|r| r.starts_with("Master")));
        assert_eq!(
            fields.summary,
            "Backend Developer position focusing on software development, requiring 5-7 years experience with Python, Django, PostgreSQL, Docker."
        );
    }

    #[test]
    fn test_defaults_for_empty_signal() {
        let fields = analyze_job_description("We are hiring.");
        assert!(fields.skills.is_empty());
        assert!(fields.requirements.is_empty());
        assert_eq!(fields.experience, DEFAULT_EXPERIENCE);
        assert_eq!(fields.category, DEFAULT_CATEGORY);
        assert!(fields.summary.ends_with("with various technologies."));
    }

    #[test]
    fn test_experience_ranges() {
        assert_eq!(extract_experience("3 to 5 years of experience"), "3-5 years");
        assert_eq!(extract_experience("2-4 years experience in Go"), "2-4 years");
        assert_eq!(extract_experience("a minimum of 4 years"), "4-6 years");
        assert_eq!(extract_experience("at least 1 year"), "1-3 years");
    }

    #[test]
    fn test_symbol_skills_and_first_spelling_kept() {
        let text = "Strong C++ and C# skills; python and Python scripting";
        let skills = extract_skills(text, &text.to_lowercase());
        assert!(skills.contains(&"C++".to_string()));
        assert!(skills.contains(&"C#".to_string()));
        assert_eq!(
            skills.iter().filter(|s| s.eq_ignore_ascii_case("python")).count(),
            1
        );
        assert!(skills.contains(&"python".to_string()));
    }

    #[test]
    fn test_java_does_not_match_javascript() {
        let text = "JavaScript only";
        let skills = extract_skills(text, &text.to_lowercase());
        assert_eq!(skills, vec!["JavaScript".to_string()]);
    }

    #[test]
    fn test_hyphenated_category_title_case() {
        let text = "Full stack role building web apps";
        let fields = analyze_job_description(text);
        assert_eq!(fields.category, "Full-Stack Developer");
        assert!(fields.skills.contains(&"Full-Stack".to_string()));
    }

    #[test]
    fn test_nlp_focus_and_requirements() {
        let text = "NLP engineer doing sentiment analysis and web scraping. Master's or PhD welcome.";
        let fields = analyze_job_description(text);
        assert_eq!(fields.category, "Nlp Engineer");
        assert!(fields.summary.contains("NLP and machine learning and web scraping and data extraction"));
        assert!(fields.requirements.contains(&"Master's degree preferred".to_string()));
        assert!(fields.requirements.contains(&"PhD preferred".to_string()));
        assert!(fields.requirements.contains(&"NLP/Text processing experience".to_string()));
        assert!(fields.requirements.contains(&"Web scraping experience".to_string()));
    }

    #[test]
    fn test_skills_capped() {
        let text = SKILL_GROUPS[0].join(", ");
        let skills = extract_skills(&text, &text.to_lowercase());
        assert_eq!(skills.len(), MAX_SKILLS);
    }
}
