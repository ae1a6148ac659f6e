//! The single point of entry for hosted text-generation calls.
//!
//! ARCHITECTURAL RULE: No other module may call the inference provider directly.
//! Handlers depend on the `InferenceClient` trait; `MistralClient` is the production
//! implementation against an OpenAI-compatible chat-completions endpoint.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::InferenceConfig;
use crate::models::runbook::{CompletionText, PromptText};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Prompt in, completion text out. One call per generation request.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn complete(&self, prompt: &PromptText) -> Result<CompletionText, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if it has any.
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
    }
}

/// Provider error bodies: `{"message": ...}` or `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProviderError {
    Nested { error: ProviderErrorBody },
    Flat { message: String },
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

impl ProviderError {
    fn message(self) -> String {
        match self {
            ProviderError::Nested { error } => error.message,
            ProviderError::Flat { message } => message,
        }
    }
}

/// Chat-completions client with retry on 429/5xx and transport errors.
#[derive(Clone)]
pub struct MistralClient {
    client: Client,
    config: InferenceConfig,
    retry_base_delay: Duration,
}

impl MistralClient {
    pub fn new(config: InferenceConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            retry_base_delay: Duration::from_millis(1000),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    #[cfg(test)]
    fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let attempts = self.config.max_attempts.max(1);
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                // Exponential backoff: base, 2x base, 4x base, ...
                let delay = self.retry_base_delay * (1u32 << (attempt - 1).min(16));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.config.api_url)
                .bearer_auth(&self.config.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(if status.as_u16() == 429 {
                    LlmError::RateLimited {
                        attempts: attempt + 1,
                    }
                } else {
                    LlmError::Api {
                        status: status.as_u16(),
                        message: body,
                    }
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ProviderError>(&body)
                    .map(ProviderError::message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let parsed: ChatResponse = serde_json::from_str(&body)?;

            if let Some(usage) = &parsed.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return parsed.into_text().ok_or(LlmError::EmptyContent);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited { attempts }))
    }
}

#[async_trait]
impl InferenceClient for MistralClient {
    async fn complete(&self, prompt: &PromptText) -> Result<CompletionText, LlmError> {
        debug!(
            "Requesting completion (model: {}, variant: {}, prompt chars: {})",
            self.config.model,
            prompt.variant.as_str(),
            prompt.as_str().chars().count()
        );
        self.call(prompt.as_str()).await.map(CompletionText)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::models::runbook::PromptVariant;

    /// Serves `responses` in order (repeating the last), recording each request body.
    #[derive(Clone)]
    struct FakeProvider {
        calls: Arc<AtomicUsize>,
        responses: Arc<Vec<(StatusCode, Value)>>,
        last_body: Arc<tokio::sync::Mutex<Option<Value>>>,
    }

    async fn fake_completions(
        State(fake): State<FakeProvider>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let n = fake.calls.fetch_add(1, Ordering::SeqCst);
        *fake.last_body.lock().await = Some(body);
        let (status, value) = fake.responses[n.min(fake.responses.len() - 1)].clone();
        (status, Json(value))
    }

    async fn spawn_provider(responses: Vec<(StatusCode, Value)>) -> (String, FakeProvider) {
        let fake = FakeProvider {
            calls: Arc::new(AtomicUsize::new(0)),
            responses: Arc::new(responses),
            last_body: Arc::new(tokio::sync::Mutex::new(None)),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(fake_completions))
            .with_state(fake.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1/chat/completions"), fake)
    }

    fn client_for(url: String, max_attempts: u32) -> MistralClient {
        MistralClient::new(InferenceConfig {
            api_url: url,
            api_key: "test-key".to_string(),
            model: "open-mistral-nemo".to_string(),
            max_tokens: 1500,
            temperature: 0.5,
            max_attempts,
            timeout_secs: 5,
        })
        .unwrap()
        .with_retry_base_delay(Duration::from_millis(1))
    }

    fn prompt(text: &str) -> PromptText {
        PromptText {
            variant: PromptVariant::General,
            text: text.to_string(),
        }
    }

    fn completion(text: &str) -> Value {
        json!({
            "choices": [{"message": {"role": "assistant", "content": text}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        })
    }

    #[tokio::test]
    async fn test_complete_sends_prompt_and_static_settings() {
        let (url, fake) = spawn_provider(vec![(StatusCode::OK, completion("# Fluffy"))]).await;
        let client = client_for(url, 3);

        let text = client.complete(&prompt("make a runbook")).await.unwrap();
        assert_eq!(text.as_str(), "# Fluffy");

        let body = fake.last_body.lock().await.clone().unwrap();
        assert_eq!(body["model"], "open-mistral-nemo");
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "make a runbook");
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_succeeds() {
        let (url, fake) = spawn_provider(vec![
            (StatusCode::SERVICE_UNAVAILABLE, json!({"message": "busy"})),
            (StatusCode::OK, completion("done")),
        ])
        .await;
        let client = client_for(url, 3);

        let text = client.complete(&prompt("p")).await.unwrap();
        assert_eq!(text.as_str(), "done");
        assert_eq!(fake.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (url, fake) = spawn_provider(vec![(
            StatusCode::UNAUTHORIZED,
            json!({"message": "Unauthorized"}),
        )])
        .await;
        let client = client_for(url, 3);

        let err = client.complete(&prompt("p")).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_exhausts_retries() {
        let (url, fake) = spawn_provider(vec![(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"message": "slow down"}}),
        )])
        .await;
        let client = client_for(url, 2);

        let err = client.complete(&prompt("p")).await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited { attempts: 2 }), "{err:?}");
        assert_eq!(fake.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_content_is_an_error() {
        let (url, _fake) = spawn_provider(vec![(StatusCode::OK, completion("   "))]).await;
        let client = client_for(url, 1);

        let err = client.complete(&prompt("p")).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[test]
    fn test_provider_error_shapes() {
        let nested: ProviderError =
            serde_json::from_str(r#"{"error": {"message": "bad key"}}"#).unwrap();
        assert_eq!(nested.message(), "bad key");
        let flat: ProviderError =
            serde_json::from_str(r#"{"object": "error", "message": "no model"}"#).unwrap();
        assert_eq!(flat.message(), "no model");
    }
}
