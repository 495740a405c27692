/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: pipeline stages never talk to the provider directly.
/// They hand prompts to `ResilientInvoker`, which drives a `ChatBackend`.
///
/// The production backend speaks the OpenAI-compatible chat-completions API
/// exposed by Groq. Tests swap in scripted backends through the trait.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::LlmSettings;

pub mod invoker;
pub mod prompts;

pub use invoker::ResilientInvoker;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The invoker's recovery ladder ended without usable content.
    #[error("{0}")]
    Unrecoverable(String),
}

/// One chat-completion request as the invoker shapes it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the provider for its structured (JSON object) output mode.
    pub json_mode: bool,
}

/// What came back from one call. Both fields are optional because providers
/// omit them freely; callers go through `text()` rather than the raw field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub stop_reason: Option<String>,
}

impl Completion {
    #[cfg(test)]
    pub fn new(content: impl Into<String>, stop_reason: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            stop_reason: Some(stop_reason.into()),
        }
    }

    /// Trimmed message body, `None` when missing or blank.
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// True when the provider stopped because the token budget ran out.
    pub fn truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("length")
    }
}

/// The generation capability. Implement this to swap providers without
/// touching the invoker or the pipeline.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn generate(&self, request: &ChatRequest) -> Result<Completion, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl From<ChatCompletionResponse> for Completion {
    fn from(response: ChatCompletionResponse) -> Self {
        let first = response.choices.into_iter().next();
        match first {
            Some(choice) => Completion {
                content: choice.message.and_then(|m| m.content),
                stop_reason: choice.finish_reason,
            },
            None => Completion::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Groq backend
// ────────────────────────────────────────────────────────────────────────────

/// Chat-completions backend for Groq (or any OpenAI-compatible endpoint).
#[derive(Clone)]
pub struct GroqBackend {
    client: Client,
    api_url: String,
    api_key: String,
    model_id: String,
}

impl GroqBackend {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()?,
            api_url: settings.api_url.clone(),
            api_key: settings.api_key.clone(),
            model_id: settings.model_id.clone(),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl ChatBackend for GroqBackend {
    async fn generate(&self, request: &ChatRequest) -> Result<Completion, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model_id,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            warn!("Chat API returned {}", status);
            // Try to parse error message
            let message = serde_json::from_str::<ApiError>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        if let Some(usage) = &parsed.usage {
            debug!(
                "Chat call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(parsed.into())
    }
}
