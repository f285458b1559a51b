/// LLM Client: the single point of entry for all language-model calls.
///
/// ARCHITECTURAL RULE: No other module may talk to the completion endpoint directly.
/// Everything goes through `CompletionClient`, which lets tests swap in stubs.
///
/// The backend is any OpenAI-compatible chat-completions server (LM Studio by default).
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

use prompts::RESUME_ASSISTANT_PREAMBLE;

/// One retry after the first attempt; a local model rarely benefits from more.
const MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned empty content")]
    EmptyContent,

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),
}

/// Text-completion contract used by the analysis core and the assistant endpoints.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends `prompt` (the resume-assistant preamble is prepended) and returns the raw reply.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    /// -1 means "no limit" for LM Studio.
    max_tokens: i32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
pub struct ReplyMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// OpenAI-style error envelope: `{"error": {"message": ...}}`. LM Studio sometimes
/// returns `{"error": "..."}` instead, which falls through to the raw body.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// `CompletionClient` backed by a local LM Studio (or compatible) server.
#[derive(Clone)]
pub struct LmStudioClient {
    client: Client,
    api_url: String,
    model: String,
    temperature: f32,
}

impl LmStudioClient {
    pub fn new(config: &Config) -> Result<Self, CompletionError> {
        Ok(Self {
            client: Client::builder().timeout(config.llm_timeout).build()?,
            api_url: config.llm_api_url.clone(),
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_once(&self, body: &ChatRequest<'_>) -> Result<ChatResponse, Attempt> {
        let response = self
            .client
            .post(&self.api_url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| Attempt::Retry(CompletionError::Http(e)))?;

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("Completion API returned {}: {}", status, body);
            return Err(Attempt::Retry(CompletionError::Api {
                status: status.as_u16(),
                message: body,
            }));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(Attempt::Fatal(CompletionError::Api {
                status: status.as_u16(),
                message,
            }));
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| Attempt::Fatal(CompletionError::Http(e)))
    }
}

/// Outcome of a single failed attempt.
enum Attempt {
    Retry(CompletionError),
    Fatal(CompletionError),
}

#[async_trait]
impl CompletionClient for LmStudioClient {
    /// Retries once on 429, 5xx and transport errors with a 1s backoff.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let content = build_user_content(prompt);
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &content,
            }],
            temperature: self.temperature,
            max_tokens: -1,
            stream: false,
        };

        let mut last_error = CompletionError::EmptyContent;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Completion attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            match self.send_once(&request_body).await {
                Ok(response) => {
                    let text = response.text().ok_or(CompletionError::EmptyContent)?;
                    debug!("Completion succeeded: {} chars", text.len());
                    return Ok(text.to_string());
                }
                Err(Attempt::Retry(e)) => last_error = e,
                Err(Attempt::Fatal(e)) => return Err(e),
            }
        }

        Err(last_error)
    }
}

/// The resume-assistant preamble followed by the caller's prompt.
fn build_user_content(prompt: &str) -> String {
    format!("{RESUME_ASSISTANT_PREAMBLE}{prompt}")
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
