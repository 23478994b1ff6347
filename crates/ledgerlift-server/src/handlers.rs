//! HTTP request handlers for the ingestion API

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use ledgerlift_core::{
    models::{SessionSummary, SourceFormat},
    pipeline,
};

/// Response for POST /api/process
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub session_id: String,
    pub rows: usize,
    pub csv_path: String,
}

/// POST /api/process - Upload and normalize a statement
///
/// Expects multipart form with:
/// - file: statement file (required, max 10MB)
/// - ext: file extension, e.g. ".csv" (optional, falls back to the
///   uploaded filename)
pub async fn process_statement(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut ext_override: Option<String> = None;

    // Extract fields from multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read file data"))?;

                if bytes.len() > MAX_UPLOAD_SIZE {
                    return Err(AppError::bad_request(&format!(
                        "File too large. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    )));
                }

                file_data = Some(bytes.to_vec());
            }
            "ext" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read ext"))?;
                if !value.is_empty() {
                    ext_override = Some(value);
                }
            }
            _ => {}
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;

    // Prefer the explicit ext field, fall back to the filename
    let ext = ext_override
        .or_else(|| {
            file_name
                .as_deref()
                .and_then(|n| n.rsplit_once('.'))
                .map(|(_, e)| e.to_string())
        })
        .ok_or_else(|| AppError::bad_request("Missing ext field and filename extension"))?;

    let format = SourceFormat::from_extension(&ext)
        .ok_or_else(|| AppError::bad_request(&format!("Unsupported format: {}", ext)))?;

    let outcome = pipeline::process_bytes(&file_data, format, &state.data_dir)?;

    info!(
        session_id = %outcome.session_id,
        rows = outcome.rows,
        "Statement processed"
    );

    Ok(Json(ProcessResponse {
        session_id: outcome.session_id,
        rows: outcome.rows,
        csv_path: outcome.csv_path.display().to_string(),
    }))
}

/// Request body for POST /api/load
#[derive(Debug, Deserialize)]
pub struct LoadRequest {
    pub session_id: String,
}

/// Response for POST /api/load
#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub session_id: String,
    pub loaded: usize,
}

/// POST /api/load - Load a processed session into the store
pub async fn load_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoadRequest>,
) -> Result<Json<LoadResponse>, AppError> {
    let csv_path = pipeline::session_dir(&state.data_dir, &req.session_id)
        .join(pipeline::CLEANED_CSV_NAME);

    if !csv_path.exists() {
        return Err(AppError::not_found(&format!(
            "No processed data for session {}",
            req.session_id
        )));
    }

    let loaded = state.db.load_session(&csv_path, &req.session_id)?;

    Ok(Json(LoadResponse {
        session_id: req.session_id,
        loaded,
    }))
}

/// Response for GET /api/sessions
#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
}

/// GET /api/sessions - Per-session summaries, newest first
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionsResponse>, AppError> {
    let sessions = state.db.session_summaries()?;
    Ok(Json(SessionsResponse { sessions }))
}

/// Response for delete/clear endpoints
#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub deleted: usize,
}

/// DELETE /api/sessions/:id - Remove one session's rows and files
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<CleanupResponse>, AppError> {
    let deleted = pipeline::cleanup_session(&state.db, &state.data_dir, &session_id)?;
    Ok(Json(CleanupResponse { deleted }))
}

/// POST /api/clear - Wipe the store and all uploaded files
pub async fn clear_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CleanupResponse>, AppError> {
    let deleted = pipeline::cleanup_all(&state.db, &state.data_dir)?;
    Ok(Json(CleanupResponse { deleted }))
}
