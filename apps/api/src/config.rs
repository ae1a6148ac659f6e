use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_INFERENCE_URL: &str = "https://api.mistral.ai/v1/chat/completions";
const DEFAULT_MODEL: &str = "open-mistral-nemo";
const DEFAULT_REFERENCE_DOC: &str = "Pet Sitting Runbook Template.pdf";
const DEFAULT_UPLOAD_ROOT: &str = "uploaded_files";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub inference: InferenceConfig,
    /// The fixed reference document injected into every prompt.
    pub reference_doc_path: PathBuf,
    /// Parent directory for per-session upload directories.
    pub upload_root: PathBuf,
    /// Keep a session's upload directory on disk after the session ends.
    pub retain_uploads: bool,
    /// Sessions untouched for this long are ended by the sweeper.
    pub session_idle_ttl_secs: u64,
    pub session_sweep_interval_secs: u64,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

/// Static settings for the hosted text-generation endpoint.
/// None of these are derived from user input.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_attempts: u32,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let api_key = require_env("MISTRAL_API_KEY")
            .or_else(|_| require_env("MISTRAL_TOKEN"))
            .context("Set MISTRAL_API_KEY (or the legacy MISTRAL_TOKEN)")?;

        Ok(Config {
            inference: InferenceConfig {
                api_url: env_or("INFERENCE_API_URL", DEFAULT_INFERENCE_URL),
                api_key,
                model: env_or("INFERENCE_MODEL", DEFAULT_MODEL),
                max_tokens: parse_env("INFERENCE_MAX_TOKENS", 1500)?,
                temperature: parse_env("INFERENCE_TEMPERATURE", 0.5)?,
                max_attempts: parse_env("INFERENCE_MAX_ATTEMPTS", 3)?,
                timeout_secs: parse_env("INFERENCE_TIMEOUT_SECS", 120)?,
            },
            reference_doc_path: PathBuf::from(env_or("REFERENCE_DOC_PATH", DEFAULT_REFERENCE_DOC)),
            upload_root: PathBuf::from(env_or("UPLOAD_ROOT", DEFAULT_UPLOAD_ROOT)),
            retain_uploads: parse_env("RETAIN_UPLOADS", false)?,
            session_idle_ttl_secs: parse_env("SESSION_IDLE_TTL_SECS", 3600)?,
            session_sweep_interval_secs: parse_env("SESSION_SWEEP_INTERVAL_SECS", 60)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 25 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw:?}"))
}
