use std::sync::Arc;

use crate::llm_client::InferenceClient;
use crate::models::runbook::ReferenceText;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Reference document text, loaded once at startup and shared read-only.
    pub reference: Arc<ReferenceText>,
    pub sessions: SessionStore,
    /// Pluggable inference backend. Default: MistralClient.
    pub llm: Arc<dyn InferenceClient>,
}
