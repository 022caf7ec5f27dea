// Record persistence behind the `Store` trait.
// Postgres when DATABASE_URL is reachable, JSON files under STORAGE_DIR otherwise.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};
use uuid::Uuid;

use crate::db::{create_pool, ensure_schema};
use crate::errors::AppError;
use crate::models::job::{JobPosting, JobStatus};
use crate::models::match_record::MatchRecord;
use crate::models::resume::Resume;
use crate::models::user::User;

pub mod files;
pub mod json;
pub mod postgres;

pub use json::JsonStore;
pub use postgres::PgStore;

/// The record store. Implementations must keep usernames unique and drop a
/// resume's or job's match records when it is deleted.
///
/// Carried in `AppState` as `Arc<dyn Store>`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    // Users
    async fn create_user(&self, user: User) -> Result<User, AppError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    // Resumes
    async fn insert_resume(&self, resume: Resume) -> Result<Resume, AppError>;
    async fn get_resume(&self, id: Uuid) -> Result<Option<Resume>, AppError>;
    /// Newest first.
    async fn list_resumes(&self, owner_id: Option<Uuid>) -> Result<Vec<Resume>, AppError>;
    async fn delete_resume(&self, id: Uuid) -> Result<bool, AppError>;

    // Job postings
    async fn insert_job(&self, job: JobPosting) -> Result<JobPosting, AppError>;
    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>, AppError>;
    /// Newest first.
    async fn list_jobs(&self, status: Option<JobStatus>) -> Result<Vec<JobPosting>, AppError>;
    /// Replaces a stored posting. `None` when no posting has that id.
    async fn update_job(&self, job: JobPosting) -> Result<Option<JobPosting>, AppError>;
    async fn delete_job(&self, id: Uuid) -> Result<bool, AppError>;

    // Matches
    async fn insert_match(&self, record: MatchRecord) -> Result<MatchRecord, AppError>;
    /// Highest score first.
    async fn list_matches(
        &self,
        resume_id: Option<Uuid>,
        job_id: Option<Uuid>,
    ) -> Result<Vec<MatchRecord>, AppError>;
}

/// Opens Postgres when a URL is configured and reachable, the JSON store otherwise.
pub async fn open_store(
    database_url: Option<&str>,
    records_dir: &Path,
) -> Result<Arc<dyn Store>, AppError> {
    if let Some(url) = database_url {
        match connect_postgres(url).await {
            Ok(store) => return Ok(Arc::new(store)),
            Err(e) => error!("PostgreSQL unavailable ({e:#}). Falling back to JSON file storage."),
        }
    }

    let store = JsonStore::open(records_dir).await?;
    info!("Using JSON file storage at {}", records_dir.display());
    Ok(Arc::new(store))
}

async fn connect_postgres(url: &str) -> anyhow::Result<PgStore> {
    let pool = create_pool(url).await?;
    ensure_schema(&pool).await?;
    Ok(PgStore::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    #[tokio::test]
    async fn test_unreachable_postgres_falls_back_to_json() {
        let dir = tempfile::tempdir().unwrap();
        let records = dir.path().join("records");

        let store = open_store(Some("postgres://resumatch@127.0.0.1:1/resumatch"), &records)
            .await
            .unwrap();
        assert_eq!(store.backend(), "json");

        store
            .create_user(User::new("ada", UserRole::Candidate))
            .await
            .unwrap();
        assert!(records.join("users.json").exists());
    }

    #[tokio::test]
    async fn test_no_database_url_uses_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(None, dir.path()).await.unwrap();
        assert_eq!(store.backend(), "json");
    }
}
