//! Generation backend client: completion and chat endpoints.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};

/// A role-tagged message in a chat history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// The speaker role (`user`, `assistant`, `system`, ...).
    pub role: String,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a `user`-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Sampling parameters for a generation request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GenerationParams {
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl GenerationParams {
    /// Create explicit sampling parameters.
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self { max_tokens, temperature }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { max_tokens: 256, temperature: 0.7 }
    }
}

/// A text-generation backend reachable over HTTP.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Submit a flat prompt to the completion endpoint and return the first
    /// generated completion's text, untrimmed.
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    /// Submit structured messages to the chat endpoint and return the reply
    /// message's text.
    async fn chat(&self, messages: &[ChatMessage], params: &GenerationParams) -> Result<String>;
}

/// The default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`Generator`] speaking the OpenAI wire protocol.
///
/// [`complete`](Generator::complete) posts to `{base_url}/v1/completions`
/// and [`chat`](Generator::chat) to `{base_url}/v1/chat/completions`, so the
/// same client covers hosted OpenAI and local OpenAI-compatible servers
/// (vLLM and friends). No retries: a failed call surfaces immediately.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiGenerator {
    /// Create a generator for the given base URL and model.
    ///
    /// Local servers usually need no API key; pass one with
    /// [`with_api_key`](Self::with_api_key) when the backend requires it.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| RagError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
        })
    }

    /// Attach a bearer token to every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Replace the default request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        let mut request = self.client.post(format!("{}{path}", self.base_url)).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, path, "generation request failed");
            RagError::BackendUnavailable { backend: "generation".into(), message: e.to_string() }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(status, path, "generation API error");
            return Err(RagError::BackendError {
                backend: "generation".into(),
                status,
                message: detail,
            });
        }

        response.json().await.map_err(|e| {
            error!(error = %e, path, "failed to parse generation response");
            RagError::BackendError {
                backend: "generation".into(),
                status: 200,
                message: format!("unparseable response body: {e}"),
            }
        })
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        debug!(model = %self.model, prompt_len = prompt.len(), "completion request");
        let request = CompletionRequest {
            model: &self.model,
            prompt,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };
        let response: CompletionResponse = self.post_json("/v1/completions", &request).await?;
        response.choices.into_iter().next().map(|c| c.text).ok_or_else(|| {
            RagError::BackendError {
                backend: "generation".into(),
                status: 200,
                message: "response contained no choices".into(),
            }
        })
    }

    async fn chat(&self, messages: &[ChatMessage], params: &GenerationParams) -> Result<String> {
        debug!(model = %self.model, message_count = messages.len(), "chat request");
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };
        let response: ChatResponse = self.post_json("/v1/chat/completions", &request).await?;
        response.choices.into_iter().next().map(|c| c.message.content).ok_or_else(|| {
            RagError::BackendError {
                backend: "generation".into(),
                status: 200,
                message: "response contained no choices".into(),
            }
        })
    }
}
