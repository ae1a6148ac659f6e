//! Axum route handlers for the upload inventory.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::runbook::UploadedFileRef;
use crate::state::AppState;
use crate::uploads::extract::extract_text;
use crate::uploads::{validate_extension, validate_file_count};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub saved: Vec<UploadedFileRef>,
    pub files: Vec<UploadedFileRef>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub files: Vec<UploadedFileRef>,
}

#[derive(Debug, Serialize)]
pub struct UploadTextResponse {
    pub name: String,
    pub text: String,
}

/// POST /api/v1/sessions/:id/uploads
///
/// Accepts files of an allowed type while the session stays within its file cap. Every
/// file is checked before any is written, so a rejected request leaves the store
/// untouched. Saving invalidates a confirmed prompt.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let session = state.sessions.get(session_id).await?;

    let mut files: Vec<(String, Bytes)> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        // Plain form fields carry no file.
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        validate_extension(&name)?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
        files.push((name, data));
    }
    let stored = session.uploads.list().await?;
    let incoming: Vec<String> = files.iter().map(|(name, _)| name.clone()).collect();
    validate_file_count(&stored, &incoming)?;

    let mut saved = Vec::with_capacity(files.len());
    for (name, data) in &files {
        saved.push(session.uploads.save(name, data).await?);
    }
    state.sessions.record_uploads(session_id).await?;

    let inventory = session.uploads.list().await?;
    info!(
        "Session {session_id}: saved {} file(s), {} in store",
        saved.len(),
        inventory.len()
    );

    Ok(Json(UploadResponse {
        saved,
        files: inventory,
        message: "Files uploaded and saved successfully!".to_string(),
    }))
}

/// GET /api/v1/sessions/:id/uploads
pub async fn handle_list_uploads(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<InventoryResponse>, AppError> {
    let session = state.sessions.get(session_id).await?;
    let files = session.uploads.list().await?;
    Ok(Json(InventoryResponse { files }))
}

/// GET /api/v1/sessions/:id/uploads/:name/text
///
/// Flat-text view of one upload.
pub async fn handle_upload_text(
    State(state): State<AppState>,
    Path((session_id, name)): Path<(Uuid, String)>,
) -> Result<Json<UploadTextResponse>, AppError> {
    let session = state.sessions.get(session_id).await?;
    let file = UploadedFileRef::new(name);
    let bytes = session.uploads.read(&file).await?;
    let text = extract_text(file.name(), bytes).await?;
    Ok(Json(UploadTextResponse {
        name: file.0,
        text,
    }))
}
