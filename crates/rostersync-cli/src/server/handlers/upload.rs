//! CSV upload handler.

use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::Serialize;

use rostersync::FieldMapping;

use crate::server::error::ApiError;
use crate::server::state::{AppState, Session};

/// Hex digits of the content hash used as the session id.
const SESSION_ID_LEN: usize = 16;

/// Response for the upload endpoint.
#[derive(Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub session_id: String,
    pub headers: Vec<String>,
    /// First rows of the file.
    pub preview: Vec<Vec<String>>,
    pub auto_mapping: FieldMapping,
    pub total_rows: usize,
}

/// Accept a multipart `file` field, parse it and open a session for it.
pub async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("No file part in the request".to_string()))?;
    if file_name.trim().is_empty() {
        return Err(ApiError::BadRequest("No file selected".to_string()));
    }

    let (table, source) = state.sync.load_bytes(&bytes, Some(&file_name))?;
    let session_id = session_id_for(&source.hash);
    let analysis = state.sync.analyze_table(&table, source);

    tracing::info!(
        session = %session_id,
        file = %file_name,
        rows = analysis.total_rows,
        encoding = %analysis.source.encoding,
        "CSV uploaded"
    );

    state
        .insert_session(session_id.clone(), Session::new(file_name, table))
        .await;

    Ok(Json(UploadResponse {
        success: true,
        session_id,
        headers: analysis.headers,
        preview: analysis.preview,
        auto_mapping: analysis.auto_mapping,
        total_rows: analysis.total_rows,
    }))
}

/// Same bytes, same session.
fn session_id_for(hash: &str) -> String {
    let hex = hash.strip_prefix("sha256:").unwrap_or(hash);
    hex.chars().take(SESSION_ID_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_strips_prefix() {
        let id = session_id_for("sha256:0123456789abcdef0123456789abcdef");
        assert_eq!(id, "0123456789abcdef");
    }

    #[test]
    fn test_session_id_short_hash() {
        assert_eq!(session_id_for("abc"), "abc");
    }
}
