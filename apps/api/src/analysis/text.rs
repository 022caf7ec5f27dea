//! Text extraction from uploaded documents.

use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

/// Minimum trimmed length, in chars, worth analyzing.
pub const MIN_ANALYSIS_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if lower.ends_with(".txt") {
            Some(DocumentKind::Text)
        } else {
            None
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Text => "text/plain; charset=utf-8",
        }
    }
}

/// Content type to serve a stored document with.
pub fn content_type_for(filename: &str) -> &'static str {
    DocumentKind::from_filename(filename)
        .map(|k| k.content_type())
        .unwrap_or("application/octet-stream")
}

/// Extracts plain text from a PDF or text upload.
pub async fn extract_text(filename: &str, bytes: Bytes) -> Result<String, AppError> {
    let kind = DocumentKind::from_filename(filename).ok_or_else(|| {
        AppError::Validation(
            "Unsupported file format. Please upload a PDF or text file.".to_string(),
        )
    })?;

    let text = match kind {
        DocumentKind::Text => String::from_utf8_lossy(&bytes).into_owned(),
        DocumentKind::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?,
    };

    debug!("Extracted {} chars from {}", text.len(), filename);
    Ok(text)
}

/// Rejects text too short to carry any signal.
pub fn ensure_analyzable(text: &str) -> Result<(), AppError> {
    if text.trim().chars().count() < MIN_ANALYSIS_CHARS {
        return Err(AppError::Validation(
            "Not enough text content to analyze".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_kind_by_extension() {
        assert_eq!(DocumentKind::from_filename("CV.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_filename("notes.txt"), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_filename("resume.docx"), None);
    }

    #[test]
    fn test_content_type_fallback() {
        assert_eq!(content_type_for("a.pdf"), "application/pdf");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_extract_text_plain() {
        let text = extract_text("cv.txt", Bytes::from_static(b"Rust engineer"))
            .await
            .unwrap();
        assert_eq!(text, "Rust engineer");
    }

    #[tokio::test]
    async fn test_extract_text_rejects_unknown_format() {
        let err = extract_text("cv.docx", Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_ensure_analyzable_threshold() {
        assert!(ensure_analyzable("   short   ").is_err());
        assert!(ensure_analyzable(&"a".repeat(MIN_ANALYSIS_CHARS)).is_ok());
    }
}
