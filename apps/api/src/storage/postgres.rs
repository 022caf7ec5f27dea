use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobPosting, JobStatus};
use crate::models::match_record::MatchRecord;
use crate::models::resume::{Resume, ResumeStatus};
use crate::models::user::{User, UserRole};
use crate::storage::Store;

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    role: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ResumeRow {
    id: Uuid,
    filename: String,
    owner_id: Option<Uuid>,
    file_key: Option<String>,
    download_url: String,
    upload_date: DateTime<Utc>,
    status: String,
    summary: String,
    skills: Vec<String>,
    experience: i32,
    education_level: String,
    category: String,
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    company: String,
    description: String,
    requirements: Vec<String>,
    skills: Vec<String>,
    experience: String,
    category: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct MatchRow {
    id: Uuid,
    resume_id: Uuid,
    job_id: Uuid,
    score: i32,
    reason: String,
    source: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            role: row.role.parse().unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

impl From<ResumeRow> for Resume {
    fn from(row: ResumeRow) -> Self {
        Resume {
            id: row.id,
            filename: row.filename,
            owner_id: row.owner_id,
            file_key: row.file_key,
            download_url: row.download_url,
            upload_date: row.upload_date,
            status: row.status.parse().unwrap_or_default(),
            summary: row.summary,
            skills: row.skills,
            experience: row.experience.max(0) as u32,
            education_level: row.education_level,
            category: row.category,
        }
    }
}

impl From<JobRow> for JobPosting {
    fn from(row: JobRow) -> Self {
        JobPosting {
            id: row.id,
            title: row.title,
            company: row.company,
            description: row.description,
            requirements: row.requirements,
            skills: row.skills,
            experience: row.experience,
            category: row.category,
            status: row.status.parse().unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<MatchRow> for MatchRecord {
    fn from(row: MatchRow) -> Self {
        MatchRecord {
            id: row.id,
            resume_id: row.resume_id,
            job_id: row.job_id,
            score: row.score.clamp(0, 100) as u32,
            reason: row.reason,
            source: row.source,
            created_at: row.created_at,
        }
    }
}

/// Postgres-backed store. Match rows cascade with their resume or job.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create_user(&self, user: User) -> Result<User, AppError> {
        let result = sqlx::query(
            "INSERT INTO users (id, username, role, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                format!("Username '{}' is already taken", user.username),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row =
            sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn insert_resume(&self, resume: Resume) -> Result<Resume, AppError> {
        sqlx::query(
            r#"
            INSERT INTO resumes
                (id, filename, owner_id, file_key, download_url, upload_date, status,
                 summary, skills, experience, education_level, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(resume.id)
        .bind(&resume.filename)
        .bind(resume.owner_id)
        .bind(&resume.file_key)
        .bind(&resume.download_url)
        .bind(resume.upload_date)
        .bind(resume.status.as_str())
        .bind(&resume.summary)
        .bind(&resume.skills)
        .bind(i32::try_from(resume.experience).unwrap_or(i32::MAX))
        .bind(&resume.education_level)
        .bind(&resume.category)
        .execute(&self.pool)
        .await?;
        Ok(resume)
    }

    async fn get_resume(&self, id: Uuid) -> Result<Option<Resume>, AppError> {
        let row = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Resume::from))
    }

    async fn list_resumes(&self, owner_id: Option<Uuid>) -> Result<Vec<Resume>, AppError> {
        let rows = sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT * FROM resumes
            WHERE ($1::uuid IS NULL OR owner_id = $1)
            ORDER BY upload_date DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Resume::from).collect())
    }

    async fn delete_resume(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_job(&self, job: JobPosting) -> Result<JobPosting, AppError> {
        sqlx::query(
            r#"
            INSERT INTO job_postings
                (id, title, company, description, requirements, skills, experience,
                 category, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(&job.skills)
        .bind(&job.experience)
        .bind(&job.category)
        .bind(job.status.as_str())
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(job)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>, AppError> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM job_postings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(JobPosting::from))
    }

    async fn list_jobs(&self, status: Option<JobStatus>) -> Result<Vec<JobPosting>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT * FROM job_postings
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(JobPosting::from).collect())
    }

    async fn update_job(&self, job: JobPosting) -> Result<Option<JobPosting>, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE job_postings
            SET title = $2, company = $3, description = $4, requirements = $5, skills = $6,
                experience = $7, category = $8, status = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.description)
        .bind(&job.requirements)
        .bind(&job.skills)
        .bind(&job.experience)
        .bind(&job.category)
        .bind(job.status.as_str())
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;

        Ok((result.rows_affected() > 0).then_some(job))
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM job_postings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_match(&self, record: MatchRecord) -> Result<MatchRecord, AppError> {
        sqlx::query(
            r#"
            INSERT INTO matches (id, resume_id, job_id, score, reason, source, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(record.resume_id)
        .bind(record.job_id)
        .bind(record.score.min(100) as i32)
        .bind(&record.reason)
        .bind(&record.source)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_matches(
        &self,
        resume_id: Option<Uuid>,
        job_id: Option<Uuid>,
    ) -> Result<Vec<MatchRecord>, AppError> {
        let rows = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT * FROM matches
            WHERE ($1::uuid IS NULL OR resume_id = $1)
              AND ($2::uuid IS NULL OR job_id = $2)
            ORDER BY score DESC, created_at DESC
            "#,
        )
        .bind(resume_id)
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MatchRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_row_conversion_normalises_values() {
        let row = ResumeRow {
            id: Uuid::new_v4(),
            filename: "cv.pdf".to_string(),
            owner_id: None,
            file_key: Some("resumes/x_cv.pdf".to_string()),
            download_url: "/api/resumes/download/x".to_string(),
            upload_date: Utc::now(),
            status: "pending".to_string(),
            summary: String::new(),
            skills: vec!["Rust".to_string()],
            experience: -3,
            education_level: "PhD".to_string(),
            category: "Data Science".to_string(),
        };
        let resume = Resume::from(row);
        assert_eq!(resume.status, ResumeStatus::Pending);
        assert_eq!(resume.experience, 0);
        assert_eq!(resume.file_key.as_deref(), Some("resumes/x_cv.pdf"));
    }

    #[test]
    fn test_unknown_status_falls_back_to_default() {
        let now = Utc::now();
        let job = JobPosting::from(JobRow {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            company: String::new(),
            description: String::new(),
            requirements: vec![],
            skills: vec![],
            experience: String::new(),
            category: String::new(),
            status: "archived".to_string(),
            created_at: now,
            updated_at: now,
        });
        assert_eq!(job.status, JobStatus::Open);

        let user = User::from(UserRow {
            id: Uuid::new_v4(),
            username: "ada".to_string(),
            role: "Recruiter".to_string(),
            created_at: now,
        });
        assert_eq!(user.role, UserRole::Recruiter);
    }
}
