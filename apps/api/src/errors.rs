use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    /// Generation was requested before a prompt was confirmed.
    /// Rendered as a warning: nothing failed, the step simply did not run.
    #[error("Prompt not confirmed")]
    PromptNotConfirmed,

    /// The uploads changed while a prompt was being built, so it was not confirmed.
    #[error("Uploads changed during prompt confirmation")]
    UploadsChanged,

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Warnings and errors share a body shape but not a top-level key.
        let (status, kind, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "error", "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "error",
                "VALIDATION_ERROR",
                msg.clone(),
            ),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "error",
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::PromptNotConfirmed => {
                tracing::warn!("Runbook generation requested without a confirmed prompt");
                (
                    StatusCode::CONFLICT,
                    "warning",
                    "PROMPT_NOT_CONFIRMED",
                    "Please confirm the AI prompt before generating the runbook.".to_string(),
                )
            }
            AppError::UploadsChanged => {
                tracing::warn!("Prompt confirmation skipped: uploads changed while it was built");
                (
                    StatusCode::CONFLICT,
                    "warning",
                    "UPLOADS_CHANGED",
                    "Your files changed while the prompt was prepared. Please review it again."
                        .to_string(),
                )
            }
            AppError::Inference(msg) => {
                tracing::error!("Inference error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "error",
                    "INFERENCE_ERROR",
                    "The runbook could not be generated. Please try again.".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "error",
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "error",
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = Map::new();
        body.insert(
            kind.to_string(),
            json!({
                "code": code,
                "message": message
            }),
        );
        let body = Json(Value::Object(body));

        (status, body).into_response()
    }
}
