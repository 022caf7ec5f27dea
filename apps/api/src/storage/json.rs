//! JSON-file record store. One pretty-printed file per collection.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{JobPosting, JobStatus};
use crate::models::match_record::MatchRecord;
use crate::models::resume::Resume;
use crate::models::user::User;
use crate::storage::Store;

const USERS_FILE: &str = "users.json";
const RESUMES_FILE: &str = "resumes.json";
const JOBS_FILE: &str = "jobs.json";
const MATCHES_FILE: &str = "matches.json";

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    resumes: Vec<Resume>,
    jobs: Vec<JobPosting>,
    matches: Vec<MatchRecord>,
}

pub struct JsonStore {
    dir: PathBuf,
    data: RwLock<Collections>,
}

impl JsonStore {
    /// Creates the directory if needed and loads every collection.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating storage directory {}", dir.display()))?;

        let data = Collections {
            users: load(&dir.join(USERS_FILE)).await?,
            resumes: load(&dir.join(RESUMES_FILE)).await?,
            jobs: load(&dir.join(JOBS_FILE)).await?,
            matches: load(&dir.join(MATCHES_FILE)).await?,
        };
        debug!(
            "Loaded {} users, {} resumes, {} jobs, {} matches from {}",
            data.users.len(),
            data.resumes.len(),
            data.jobs.len(),
            data.matches.len(),
            dir.display()
        );

        Ok(Self {
            dir,
            data: RwLock::new(data),
        })
    }

    async fn save<T: Serialize>(&self, file: &str, items: &[T]) -> Result<(), AppError> {
        let path = self.dir.join(file);
        let bytes = serde_json::to_vec_pretty(items).context("serializing collection")?;

        // write-then-rename so a crash never leaves a half-written file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}

/// Copy of `items` minus those matching `drop`.
fn without<T: Clone>(items: &[T], drop: impl Fn(&T) -> bool) -> Vec<T> {
    items.iter().filter(|item| !drop(item)).cloned().collect()
}

/// Missing file → empty. Unreadable JSON is logged and treated as empty.
async fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(anyhow::Error::new(e)
                .context(format!("reading {}", path.display()))
                .into())
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(items) => Ok(items),
        Err(e) => {
            error!("Corrupt storage file {}: {e}. Starting empty.", path.display());
            Ok(Vec::new())
        }
    }
}

#[async_trait]
impl Store for JsonStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    async fn create_user(&self, user: User) -> Result<User, AppError> {
        let mut data = self.data.write().await;
        if data
            .users
            .iter()
            .any(|u| u.username.eq_ignore_ascii_case(&user.username))
        {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        let mut users = data.users.clone();
        users.push(user.clone());
        self.save(USERS_FILE, &users).await?;
        data.users = users;
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let data = self.data.read().await;
        Ok(data
            .users
            .iter()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let data = self.data.read().await;
        let mut users = data.users.clone();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn insert_resume(&self, resume: Resume) -> Result<Resume, AppError> {
        let mut data = self.data.write().await;
        let mut resumes = data.resumes.clone();
        resumes.push(resume.clone());
        self.save(RESUMES_FILE, &resumes).await?;
        data.resumes = resumes;
        Ok(resume)
    }

    async fn get_resume(&self, id: Uuid) -> Result<Option<Resume>, AppError> {
        let data = self.data.read().await;
        Ok(data.resumes.iter().find(|r| r.id == id).cloned())
    }

    async fn list_resumes(&self, owner_id: Option<Uuid>) -> Result<Vec<Resume>, AppError> {
        let data = self.data.read().await;
        let mut resumes: Vec<Resume> = data
            .resumes
            .iter()
            .filter(|r| owner_id.is_none() || r.owner_id == owner_id)
            .cloned()
            .collect();
        resumes.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        Ok(resumes)
    }

    async fn delete_resume(&self, id: Uuid) -> Result<bool, AppError> {
        let mut data = self.data.write().await;
        if !data.resumes.iter().any(|r| r.id == id) {
            return Ok(false);
        }
        let resumes = without(&data.resumes, |r| r.id == id);
        let matches = without(&data.matches, |m| m.resume_id == id);

        // matches first: a failure in between leaves no dangling match records
        if matches.len() != data.matches.len() {
            self.save(MATCHES_FILE, &matches).await?;
        }
        self.save(RESUMES_FILE, &resumes).await?;
        data.matches = matches;
        data.resumes = resumes;
        Ok(true)
    }

    async fn insert_job(&self, job: JobPosting) -> Result<JobPosting, AppError> {
        let mut data = self.data.write().await;
        let mut jobs = data.jobs.clone();
        jobs.push(job.clone());
        self.save(JOBS_FILE, &jobs).await?;
        data.jobs = jobs;
        Ok(job)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>, AppError> {
        let data = self.data.read().await;
        Ok(data.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn list_jobs(&self, status: Option<JobStatus>) -> Result<Vec<JobPosting>, AppError> {
        let data = self.data.read().await;
        let mut jobs: Vec<JobPosting> = data
            .jobs
            .iter()
            .filter(|j| status.map_or(true, |s| j.status == s))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn update_job(&self, job: JobPosting) -> Result<Option<JobPosting>, AppError> {
        let mut data = self.data.write().await;
        let Some(index) = data.jobs.iter().position(|j| j.id == job.id) else {
            return Ok(None);
        };
        let mut jobs = data.jobs.clone();
        jobs[index] = job.clone();
        self.save(JOBS_FILE, &jobs).await?;
        data.jobs = jobs;
        Ok(Some(job))
    }

    async fn delete_job(&self, id: Uuid) -> Result<bool, AppError> {
        let mut data = self.data.write().await;
        if !data.jobs.iter().any(|j| j.id == id) {
            return Ok(false);
        }
        let jobs = without(&data.jobs, |j| j.id == id);
        let matches = without(&data.matches, |m| m.job_id == id);

        if matches.len() != data.matches.len() {
            self.save(MATCHES_FILE, &matches).await?;
        }
        self.save(JOBS_FILE, &jobs).await?;
        data.matches = matches;
        data.jobs = jobs;
        Ok(true)
    }

    async fn insert_match(&self, record: MatchRecord) -> Result<MatchRecord, AppError> {
        let mut data = self.data.write().await;
        let mut matches = data.matches.clone();
        matches.push(record.clone());
        self.save(MATCHES_FILE, &matches).await?;
        data.matches = matches;
        Ok(record)
    }

    async fn list_matches(
        &self,
        resume_id: Option<Uuid>,
        job_id: Option<Uuid>,
    ) -> Result<Vec<MatchRecord>, AppError> {
        let data = self.data.read().await;
        let mut matches: Vec<MatchRecord> = data
            .matches
            .iter()
            .filter(|m| resume_id.map_or(true, |id| m.resume_id == id))
            .filter(|m| job_id.map_or(true, |id| m.job_id == id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::models::resume::ResumeAnalysis;
    use crate::models::user::UserRole;

    fn resume(name: &str, owner: Option<Uuid>) -> Resume {
        Resume::from_upload(name, owner, ResumeAnalysis::default())
    }

    fn match_for(resume_id: Uuid, job_id: Uuid, score: u32) -> MatchRecord {
        MatchRecord {
            id: Uuid::new_v4(),
            resume_id,
            job_id,
            score,
            reason: String::new(),
            source: "keyword".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        let user = store
            .create_user(User::new("ada", UserRole::Recruiter))
            .await
            .unwrap();
        let saved = store.insert_resume(resume("cv.pdf", Some(user.id))).await.unwrap();
        drop(store);

        let reopened = JsonStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.list_users().await.unwrap().len(), 1);
        let loaded = reopened.get_resume(saved.id).await.unwrap().unwrap();
        assert_eq!(loaded.filename, "cv.pdf");
        assert_eq!(loaded.owner_id, Some(user.id));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        store
            .create_user(User::new("ada", UserRole::Candidate))
            .await
            .unwrap();
        let err = store
            .create_user(User::new("ADA", UserRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(RESUMES_FILE), b"{not json").unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        assert!(store.list_resumes(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_resumes_newest_first_and_owner_filter() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        let owner = Uuid::new_v4();

        let mut old = resume("old.pdf", Some(owner));
        old.upload_date = Utc::now() - Duration::days(2);
        store.insert_resume(old).await.unwrap();
        store.insert_resume(resume("new.pdf", Some(owner))).await.unwrap();
        store.insert_resume(resume("other.pdf", None)).await.unwrap();

        let mine = store.list_resumes(Some(owner)).await.unwrap();
        let names: Vec<&str> = mine.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["new.pdf", "old.pdf"]);
        assert_eq!(store.list_resumes(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_resume_cascades_to_matches() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        let r = store.insert_resume(resume("cv.txt", None)).await.unwrap();
        let job = store
            .insert_job(JobPosting::new("Engineer", "Acme", ""))
            .await
            .unwrap();
        store.insert_match(match_for(r.id, job.id, 70)).await.unwrap();

        assert!(store.delete_resume(r.id).await.unwrap());
        assert!(!store.delete_resume(r.id).await.unwrap());
        assert!(store.list_matches(None, Some(job.id)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_filter_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        let mut job = store
            .insert_job(JobPosting::new("Engineer", "Acme", ""))
            .await
            .unwrap();

        job.status = JobStatus::Closed;
        assert!(store.update_job(job.clone()).await.unwrap().is_some());
        assert!(store.list_jobs(Some(JobStatus::Open)).await.unwrap().is_empty());
        assert_eq!(store.list_jobs(Some(JobStatus::Closed)).await.unwrap().len(), 1);

        let ghost = JobPosting::new("Ghost", "", "");
        assert!(store.update_job(ghost).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("records");
        let store = JsonStore::open(&root).await.unwrap();
        let kept = store.insert_resume(resume("kept.txt", None)).await.unwrap();

        std::fs::remove_dir_all(&root).unwrap();

        assert!(store
            .create_user(User::new("ada", UserRole::Candidate))
            .await
            .is_err());
        assert!(store.get_user_by_username("ada").await.unwrap().is_none());
        assert!(store.insert_resume(resume("lost.txt", None)).await.is_err());
        assert!(store.delete_resume(kept.id).await.is_err());
        let names: Vec<String> = store
            .list_resumes(None)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.filename)
            .collect();
        assert_eq!(names, vec!["kept.txt"]);

        // once the directory is back, the same username goes through
        std::fs::create_dir_all(&root).unwrap();
        store
            .create_user(User::new("ada", UserRole::Candidate))
            .await
            .unwrap();
        assert!(store.get_user_by_username("ada").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_matches_sorted_by_score() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path()).await.unwrap();
        let job_id = Uuid::new_v4();
        for score in [40, 90, 65] {
            store
                .insert_match(match_for(Uuid::new_v4(), job_id, score))
                .await
                .unwrap();
        }
        let scores: Vec<u32> = store
            .list_matches(None, Some(job_id))
            .await
            .unwrap()
            .iter()
            .map(|m| m.score)
            .collect();
        assert_eq!(scores, vec![90, 65, 40]);
    }
}
