//! Axum route handlers for prompt preview/confirmation and runbook generation.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::runbook::{PromptVariant, UploadedFileRef};
use crate::render::{render, OutputFormat};
use crate::runbook::builder::build_prompt;
use crate::runbook::timeframe::{TimeframeRequest, TimeframeSelection};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub timeframe: TimeframeRequest,
    /// Confirm this exact prompt for generation.
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct PromptResponse {
    pub variant: PromptVariant,
    pub timeframe: TimeframeSelection,
    pub summary: String,
    pub uploads: Vec<UploadedFileRef>,
    pub prompt: String,
    pub confirmed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RunbookQuery {
    #[serde(default)]
    pub format: OutputFormat,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/prompt
///
/// Builds a fresh prompt from the session's current uploads and the submitted timeframe.
/// With `confirm: true` the prompt is stored for generation, unless an upload landed
/// after the listing was taken; otherwise any earlier confirmation is withdrawn.
pub async fn handle_build_prompt(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<PromptRequest>,
) -> Result<Json<PromptResponse>, AppError> {
    let session = state.sessions.get(session_id).await?;
    let uploads = session.uploads.list().await?;

    let today = chrono::Local::now().date_naive();
    let timeframe = request.timeframe.resolve(today);
    let prompt = build_prompt(&uploads, &state.reference, &timeframe);

    let confirmed = request.confirm;
    if confirmed {
        state
            .sessions
            .confirm(session_id, prompt.clone(), session.generation)
            .await?;
    } else {
        state.sessions.clear_confirmation(session_id).await?;
    }

    info!(
        "Prompt built for session {session_id}: variant={}, timeframe={}, uploads={}, confirmed={confirmed}",
        prompt.variant.as_str(),
        timeframe.label(),
        uploads.len()
    );

    Ok(Json(PromptResponse {
        variant: prompt.variant,
        summary: timeframe.describe(),
        timeframe,
        uploads,
        prompt: prompt.text,
        confirmed,
    }))
}

/// POST /api/v1/sessions/:id/runbook?format=pdf|text
///
/// Sends the confirmed prompt to the inference provider once and returns the rendered
/// runbook as a download. Without a confirmed prompt this is a warning and no call is made.
pub async fn handle_generate_runbook(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<RunbookQuery>,
) -> Result<Response, AppError> {
    let session = state.sessions.get(session_id).await?;
    let prompt = session.confirmed.ok_or(AppError::PromptNotConfirmed)?;

    let completion = state
        .llm
        .complete(&prompt)
        .await
        .map_err(|e| AppError::Inference(format!("Runbook generation failed: {e}")))?;
    info!(
        "Runbook generated successfully for session {session_id} ({} chars)",
        completion.as_str().chars().count()
    );

    let artifact = render(&completion, query.format).await?;

    Ok((
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.file_name),
            ),
        ],
        artifact.bytes,
    )
        .into_response())
}
