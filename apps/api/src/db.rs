use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Bounds how long startup waits on an unreachable database before the
/// JSON fallback takes over.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Schema statements, applied in order at startup. Each is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        username VARCHAR(255) NOT NULL,
        role VARCHAR(32) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    // usernames are unique regardless of case
    "CREATE UNIQUE INDEX IF NOT EXISTS users_username_lower ON users (LOWER(username))",
    r#"
    CREATE TABLE IF NOT EXISTS resumes (
        id UUID PRIMARY KEY,
        filename VARCHAR(255) NOT NULL,
        owner_id UUID REFERENCES users(id) ON DELETE SET NULL,
        file_key VARCHAR(500),
        download_url VARCHAR(500) NOT NULL,
        upload_date TIMESTAMPTZ NOT NULL,
        status VARCHAR(32) NOT NULL DEFAULT 'processed',
        summary TEXT NOT NULL DEFAULT '',
        skills TEXT[] NOT NULL DEFAULT '{}',
        experience INTEGER NOT NULL DEFAULT 0,
        education_level VARCHAR(100) NOT NULL DEFAULT '',
        category VARCHAR(100) NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_postings (
        id UUID PRIMARY KEY,
        title VARCHAR(255) NOT NULL,
        company VARCHAR(255) NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        requirements TEXT[] NOT NULL DEFAULT '{}',
        skills TEXT[] NOT NULL DEFAULT '{}',
        experience VARCHAR(50) NOT NULL DEFAULT '',
        category VARCHAR(100) NOT NULL DEFAULT '',
        status VARCHAR(32) NOT NULL DEFAULT 'open',
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS matches (
        id UUID PRIMARY KEY,
        resume_id UUID NOT NULL REFERENCES resumes(id) ON DELETE CASCADE,
        job_id UUID NOT NULL REFERENCES job_postings(id) ON DELETE CASCADE,
        score INTEGER NOT NULL,
        reason TEXT NOT NULL,
        source VARCHAR(50) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the ResuMatch tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("PostgreSQL schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_uniqueness_ignores_case() {
        let users = SCHEMA
            .iter()
            .find(|s| s.contains("CREATE TABLE IF NOT EXISTS users"))
            .unwrap();
        assert!(!users.contains("UNIQUE"), "column-level UNIQUE is case-sensitive");
        assert!(SCHEMA.iter().any(|s| s.contains("CREATE UNIQUE INDEX")
            && s.contains("ON users (LOWER(username))")));
    }

    #[test]
    fn test_index_follows_its_table() {
        let position = |needle: &str| SCHEMA.iter().position(|s| s.contains(needle)).unwrap();
        assert!(position("users_username_lower") > position("CREATE TABLE IF NOT EXISTS users"));
    }
}
