use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::runbook::{PromptVariant, UploadedFileRef};
use crate::session::SessionInfo;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub uploads: Vec<UploadedFileRef>,
    pub prompt_confirmed: bool,
    pub confirmed_variant: Option<PromptVariant>,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionInfo>), AppError> {
    let info = state.sessions.create().await?;
    Ok((StatusCode::CREATED, Json(info)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionStatus>, AppError> {
    let session = state.sessions.get(session_id).await?;
    let uploads = session.uploads.list().await?;
    Ok(Json(SessionStatus {
        session_id: session.id,
        created_at: session.created_at,
        uploads,
        prompt_confirmed: session.confirmed.is_some(),
        confirmed_variant: session.confirmed.map(|p| p.variant),
    }))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
