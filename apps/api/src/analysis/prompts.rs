// LLM prompt templates for document analysis and matching.
// System prompts come from llm_client::prompts.

/// Resume extraction prompt. Replace `{resume_text}` before sending.
pub const RESUME_ANALYSIS_PROMPT: &str = r#"Analyze the following resume and extract structured information.

Return a JSON object with this EXACT schema (no extra fields):
{
  "summary": "2-3 sentence professional summary of the candidate",
  "skills": ["list", "of", "skills"],
  "experience": 5,
  "educationLevel": "PhD | Master's | Bachelor's | Associate's | High School",
  "category": "Software Engineering | Data Science | Design | Marketing | Sales | Finance | Healthcare | Education | Human Resources | Project Management | Operations | Professional"
}

Rules:
- "experience" is the total number of years of professional experience as a whole number.
- "educationLevel" is the highest level reached.
- List at most 15 skills, most relevant first. Include tools, languages, frameworks and soft skills.

Resume Content:
{resume_text}"#;

/// Job description extraction prompt. Replace `{jd_text}` before sending.
pub const JD_ANALYSIS_PROMPT: &str = r#"Analyze this job description and extract key information. Focus on extracting technical skills, tools, frameworks, and requirements mentioned in the role.

Return a JSON object with this EXACT schema:
{
  "summary": "Brief 1-2 sentence summary of the role",
  "skills": ["list", "of", "technical", "skills", "tools", "frameworks"],
  "requirements": ["list", "of", "key", "requirements"],
  "experience": "X-Y years or specific experience level",
  "category": "Job Category/Title"
}

Job Description Content:
{jd_text}

Extract all technical skills, programming languages, frameworks, libraries, databases, tools, and technologies mentioned. Include both specific technologies (like Python, TensorFlow, MySQL) and general skills (like Machine Learning, NLP, Web Scraping)."#;

/// Relevance of one resume to a free-text search.
/// Replace `{query}` and `{resume_text}` before sending.
pub const RELEVANCE_PROMPT: &str = r#"Rate how well the resume below matches the recruiter's search.

Search: {query}

Return a JSON object with this EXACT schema:
{
  "score": 0,
  "reason": "one or two sentences explaining the score"
}

"score" is an integer from 0 (no match) to 100 (perfect match).

Resume Content:
{resume_text}"#;

/// Structured resume vs job posting match.
/// Replace `{resume_json}` and `{job_json}` before sending.
pub const MATCH_PROMPT: &str = r#"Compare the candidate profile with the job posting and rate the fit.

Return a JSON object with this EXACT schema:
{
  "score": 0,
  "reason": "one or two sentences naming the strongest matches and the main gaps"
}

"score" is an integer from 0 (no fit) to 100 (perfect fit). Weigh required skills most, then experience, then education.

Candidate:
{resume_json}

Job posting:
{job_json}"#;

/// Career advice for a resume against a job description.
/// Replace `{resume_skills}`, `{jd_skills}` and `{resume_summary}` before sending.
pub const SUGGESTIONS_PROMPT: &str = r#"Analyze this candidate's resume against the job description requirements and provide specific, actionable suggestions.

RESUME SKILLS: {resume_skills}
JOB DESCRIPTION REQUIRED SKILLS: {jd_skills}
RESUME SUMMARY: {resume_summary}

Please provide a helpful analysis that:
1. Identifies which skills from the resume match well with the job requirements
2. Points out which job requirements are missing from the resume
3. Gives specific, actionable advice for the candidate

Be specific about technologies and skills. Keep it concise (2-3 sentences max) but actionable.

Example format: "Great match on [specific matching skills]! To strengthen your profile for this role, consider highlighting your experience with [missing skills] if you've used them in projects, or gaining experience in [specific missing technologies] which are key requirements for this position.""#;
