//! Uploaded document storage: local disk or S3 / MinIO.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::analysis::text::content_type_for;
use crate::config::S3Config;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Invalid file key: {0}")]
    InvalidKey(String),
}

/// Byte storage keyed by relative, slash-separated paths.
#[async_trait]
pub trait FileStore: Send + Sync {
    fn backend(&self) -> &'static str;
    async fn put(&self, key: &str, bytes: Bytes) -> Result<(), StorageError>;
    /// `None` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError>;
    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Key for a resume document: `resumes/{id}_{filename}` with the filename
/// reduced to ASCII alphanumerics, `.`, `_` and `-`.
pub fn resume_key(id: Uuid, filename: &str) -> String {
    let safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let safe = safe.trim_start_matches('.');
    let safe = if safe.is_empty() { "document" } else { safe };
    format!("resumes/{id}_{safe}")
}

/// S3 when a bucket is configured, local disk under `root` otherwise.
pub async fn open_file_store(s3: Option<&S3Config>, root: &Path) -> Arc<dyn FileStore> {
    match s3 {
        Some(config) => Arc::new(S3FileStore::new(config).await),
        None => {
            info!("Storing documents under {}", root.display());
            Arc::new(LocalFileStore::new(root))
        }
    }
}

/// Rejects empty keys, absolute paths, backslashes and `..` segments.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = key.is_empty()
        || key.contains('\\')
        || Path::new(key)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
    if invalid {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Local disk
// ────────────────────────────────────────────────────────────────────────────

pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn put(&self, key: &str, bytes: Bytes) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &bytes).await?;
        info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(Bytes::from(bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// S3 / MinIO
// ────────────────────────────────────────────────────────────────────────────

pub struct S3FileStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3FileStore {
    pub async fn new(config: &S3Config) -> Self {
        let client = build_s3_client(config).await;
        info!("S3 client initialized (bucket: {})", config.bucket);
        Self {
            client,
            bucket: config.bucket.clone(),
        }
    }
}

/// Constructs an S3 client configured for MinIO (custom endpoint) or AWS.
async fn build_s3_client(config: &S3Config) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));

    if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
        loader = loader.credentials_provider(Credentials::new(
            key_id,
            secret,
            None,
            None,
            "resumatch-static",
        ));
    }
    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    let shared = loader.load().await;
    // MinIO only serves path-style requests.
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(config.endpoint.is_some())
        .build();
    aws_sdk_s3::Client::from_conf(s3_config)
}

#[async_trait]
impl FileStore for S3FileStore {
    fn backend(&self) -> &'static str {
        "s3"
    }

    async fn put(&self, key: &str, bytes: Bytes) -> Result<(), StorageError> {
        validate_key(key)?;
        let len = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type_for(key))
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("upload failed: {e}")))?;
        info!("Uploaded {len} bytes to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, StorageError> {
        validate_key(key)?;
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let err = e.into_service_error();
                if err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(StorageError::S3(format!("download failed: {err}")));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3(format!("reading object body failed: {e}")))?;
        Ok(Some(data.into_bytes()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::S3(format!("delete failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_key_sanitises_filename() {
        let id = Uuid::nil();
        assert_eq!(
            resume_key(id, "My CV (final).pdf"),
            format!("resumes/{id}_MyCVfinal.pdf")
        );
        assert_eq!(resume_key(id, "../../etc/passwd"), format!("resumes/{id}_etcpasswd"));
        assert_eq!(resume_key(id, "???"), format!("resumes/{id}_document"));
    }

    #[test]
    fn test_validate_key_rejects_traversal() {
        assert!(validate_key("resumes/a.pdf").is_ok());
        assert!(validate_key("../secret").is_err());
        assert!(validate_key("resumes/../../secret").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("resumes\\a.pdf").is_err());
        assert!(validate_key("").is_err());
    }

    #[tokio::test]
    async fn test_local_put_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());

        store
            .put("resumes/x_cv.txt", Bytes::from_static(b"hello"))
            .await
            .unwrap();
        let bytes = store.get("resumes/x_cv.txt").await.unwrap().unwrap();
        assert_eq!(&bytes[..], b"hello");

        store.delete("resumes/x_cv.txt").await.unwrap();
        assert!(store.get("resumes/x_cv.txt").await.unwrap().is_none());
        // deleting twice is fine
        store.delete("resumes/x_cv.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_local_rejects_escape() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let err = store.get("../outside.txt").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
