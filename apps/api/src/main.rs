mod config;
mod errors;
mod llm_client;
mod models;
mod reference;
mod render;
mod routes;
mod runbook;
mod session;
mod state;
mod uploads;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::MistralClient;
use crate::reference::load_reference_text;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Runbook API v{}", env!("CARGO_PKG_VERSION"));

    // The reference document feeds every prompt; without it nothing can be generated.
    let reference = load_reference_text(&config.reference_doc_path)
        .await
        .context("Cannot start without the reference document")?;

    // Initialize upload storage
    tokio::fs::create_dir_all(&config.upload_root)
        .await
        .with_context(|| format!("Cannot create upload root {}", config.upload_root.display()))?;
    let sessions = SessionStore::new(
        config.upload_root.clone(),
        config.retain_uploads,
        Duration::from_secs(config.session_idle_ttl_secs),
    );
    sessions.spawn_sweeper(Duration::from_secs(config.session_sweep_interval_secs.max(1)));
    info!(
        "Upload root: {} (retain after session: {}, idle ttl: {}s)",
        config.upload_root.display(),
        config.retain_uploads,
        config.session_idle_ttl_secs
    );

    // Initialize LLM client
    let llm = MistralClient::new(config.inference.clone())?;
    info!(
        "LLM client initialized (model: {}, max_tokens: {}, temperature: {})",
        llm.model(),
        config.inference.max_tokens,
        config.inference.temperature
    );

    // Build app state
    let state = AppState {
        reference: Arc::new(reference),
        sessions,
        llm: Arc::new(llm),
    };

    // Build router
    let app = build_router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the form frontend has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
