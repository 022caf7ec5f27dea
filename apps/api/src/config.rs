use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::analysis::analyzer::AnalyzerMode;

const DEFAULT_OPENROUTER_MODEL: &str = "mistralai/mistral-7b-instruct";
const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every setting is optional; missing backends degrade to local fallbacks.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage_dir: PathBuf,
    /// Postgres connection string. `None` selects the JSON file store.
    pub database_url: Option<String>,
    pub openrouter: Option<OpenRouterConfig>,
    pub analyzer_mode: AnalyzerMode,
    /// S3 settings. `None` keeps uploaded documents on local disk.
    pub s3: Option<S3Config>,
    /// Empty means permissive CORS.
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let openrouter = optional_env("OPENROUTER_API_KEY").map(|api_key| OpenRouterConfig {
            api_key,
            model: optional_env("OPENROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
            base_url: optional_env("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
        });

        let s3 = optional_env("S3_BUCKET").map(|bucket| S3Config {
            bucket,
            endpoint: optional_env("S3_ENDPOINT"),
            region: optional_env("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            access_key_id: optional_env("AWS_ACCESS_KEY_ID"),
            secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY"),
        });

        let analyzer_mode = match optional_env("ANALYZER_MODE") {
            Some(raw) => AnalyzerMode::from_str(&raw)
                .map_err(|e| anyhow::anyhow!(e))
                .context("ANALYZER_MODE must be one of auto, api, regex")?,
            None => AnalyzerMode::Auto,
        };

        let max_upload_bytes = match optional_env("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };
        if max_upload_bytes == 0 {
            bail!("MAX_UPLOAD_BYTES must be greater than zero");
        }

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            storage_dir: optional_env("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./storage")),
            database_url: optional_env("DATABASE_URL").or_else(|| optional_env("POSTGRES_URL")),
            openrouter,
            analyzer_mode,
            s3,
            cors_allowed_origins: optional_env("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
            max_upload_bytes,
        })
    }
}

impl Config {
    /// JSON record collections live here when no database is configured.
    pub fn records_dir(&self) -> PathBuf {
        self.storage_dir.join("records")
    }

    /// Root of the local document store. Kept apart from `records_dir` so
    /// `/download/*path` can never reach the record files.
    pub fn files_dir(&self) -> PathBuf {
        self.storage_dir.join("files")
    }
}

/// Reads an environment variable, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}
