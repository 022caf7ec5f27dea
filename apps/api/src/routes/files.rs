use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::analysis::text::content_type_for;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /download/*path
/// Serves a raw document from the file store.
pub async fn handle_download_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let path = path.trim_start_matches('/');
    let bytes = state
        .files
        .get(path)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {path} not found")))?;

    let filename = path.rsplit('/').next().unwrap_or(path);
    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(filename).to_string()),
            (header::CONTENT_DISPOSITION, attachment(filename)),
        ],
        bytes,
    )
        .into_response())
}

/// `Content-Disposition` value with the filename reduced to safe header characters.
pub fn attachment(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_escapes_quotes_and_unicode() {
        assert_eq!(attachment("cv.pdf"), "attachment; filename=\"cv.pdf\"");
        assert_eq!(
            attachment("Zoë \"final\".pdf"),
            "attachment; filename=\"Zo_ _final_.pdf\""
        );
    }
}
