//! Sync preview, execute and log handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use rostersync::{FieldMapping, InMemoryStore, SyncPreview, SyncResult};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Reference to an uploaded dataset.
#[derive(Debug, Deserialize)]
pub struct CsvData {
    pub session_id: String,
}

/// Request body for preview and execute.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub csv_data: CsvData,
    pub mapping: FieldMapping,
    /// Ignored by preview.
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
}

fn default_dry_run() -> bool {
    true
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    #[serde(flatten)]
    pub preview: SyncPreview,
}

#[derive(Serialize)]
pub struct ExecuteResults {
    /// Session the sync ran against.
    pub id: String,
    #[serde(flatten)]
    pub result: SyncResult,
}

#[derive(Serialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub results: ExecuteResults,
}

/// Compute the change set for an uploaded dataset.
pub async fn preview_sync(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let session_id = request.csv_data.session_id;
    let table = state
        .table(&session_id)
        .await
        .ok_or_else(|| unknown_session(&session_id))?;

    let preview = state
        .sync
        .preview_sync(&table, &request.mapping, &state.roster)?;

    Ok(Json(PreviewResponse {
        success: true,
        preview,
    }))
}

/// Run a sync for an uploaded dataset.
///
/// Writes to the store only when the service allows it and the request
/// asks for `dryRun: false`; everything else is a dry run.
pub async fn execute_sync(
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let session_id = request.csv_data.session_id;
    let table = state
        .table(&session_id)
        .await
        .ok_or_else(|| unknown_session(&session_id))?;

    let live = !request.dry_run && state.live_sync_enabled();
    if !request.dry_run && !live {
        tracing::warn!(session = %session_id, "Live sync requested but not enabled; running dry");
    }

    let store = if live { state.store.clone() } else { None };
    let sync = state.sync.clone();
    let roster = state.roster.clone();
    let mapping = request.mapping;

    let result = tokio::task::spawn_blocking(move || match store {
        Some(store) => sync.execute_sync(&table, &mapping, &roster, store.as_ref(), false),
        None => {
            let store = InMemoryStore::from_roster(&roster);
            sync.execute_sync(&table, &mapping, &roster, &store, true)
        }
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Sync task failed: {}", e)))?;

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            if let Some(partial) = e.partial_result() {
                state.record_result(&session_id, partial.clone()).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        session = %session_id,
        dry_run = result.dry_run,
        added = result.added,
        updated = result.updated,
        deleted = result.deleted,
        errors = result.errors.len(),
        "Sync finished"
    );

    state.record_result(&session_id, result.clone()).await;

    Ok(Json(ExecuteResponse {
        success: true,
        results: ExecuteResults {
            id: session_id,
            result,
        },
    }))
}

/// Download the log of the last sync for a session as CSV.
pub async fn download_log(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions
        .get(&session_id)
        .ok_or_else(|| unknown_session(&session_id))?;
    let result = session
        .last_result
        .as_ref()
        .ok_or_else(|| ApiError::NotFound(format!("No sync has run for {}", session.file_name)))?;

    let mut body = Vec::new();
    result.write_log_csv(&mut body)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"sync-log-{}.csv\"", session_id),
            ),
        ],
        body,
    ))
}

fn unknown_session(session_id: &str) -> ApiError {
    ApiError::NotFound(format!("Unknown session: {}", session_id))
}
