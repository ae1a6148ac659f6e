pub mod health;
pub mod sessions;

use axum::{
    routing::{get, post},
    Router,
};

use crate::runbook::handlers as runbook;
use crate::state::AppState;
use crate::uploads::handlers as uploads;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_end_session),
        )
        // Upload inventory
        .route(
            "/api/v1/sessions/:id/uploads",
            get(uploads::handle_list_uploads).post(uploads::handle_upload),
        )
        .route(
            "/api/v1/sessions/:id/uploads/:name/text",
            get(uploads::handle_upload_text),
        )
        // Prompt preview and generation
        .route(
            "/api/v1/sessions/:id/prompt",
            post(runbook::handle_build_prompt),
        )
        .route(
            "/api/v1/sessions/:id/runbook",
            post(runbook::handle_generate_runbook),
        )
        .with_state(state)
}
