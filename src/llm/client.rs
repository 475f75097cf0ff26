//! Chat-completion client used for persona generation
//!
//! Talks to either the Anthropic messages API or any OpenAI-compatible
//! chat endpoint; the wire format follows from the configured URL.

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};

/// Personas should vary between calls for the same city
pub const DEFAULT_TEMPERATURE: f32 = 0.9;

const MAX_TOKENS: u32 = 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Request/response shape spoken by the endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    /// OpenAI and compatible hosts (DeepSeek, local gateways)
    OpenAiCompatible,
}

impl Provider {
    pub fn from_url(url: &str) -> Self {
        if url.contains("anthropic.com") {
            Provider::Anthropic
        } else {
            Provider::OpenAiCompatible
        }
    }
}

#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
    api_url: String,
    model: String,
    provider: Provider,
    temperature: f32,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("provider", &self.provider)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>, model: impl Into<String>) -> Self {
        let api_url = api_url.into();
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key: api_key.into(),
            provider: Provider::from_url(&api_url),
            api_url,
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build from `LLM_API_KEY`, `LLM_API_URL` and `LLM_MODEL`
    ///
    /// Only the key is required; the URL defaults to OpenAI chat
    /// completions and the model to gpt-4.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| GameError::LlmError("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| OPENAI_CHAT_URL.into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Ok(Self::new(api_key, api_url, model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// One system + user exchange, returning the model's text
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let started = Instant::now();
        let text = match self.provider {
            Provider::Anthropic => {
                let body = self.anthropic_body(system, user);
                let request = self
                    .http
                    .post(&self.api_url)
                    .header("x-api-key", &self.api_key)
                    .header("anthropic-version", ANTHROPIC_VERSION)
                    .json(&body);
                let reply: AnthropicReply = send(request).await?;
                reply.content.into_iter().next().map(|block| block.text)
            }
            Provider::OpenAiCompatible => {
                let body = self.chat_body(system, user);
                let request = self.http.post(&self.api_url).bearer_auth(&self.api_key).json(&body);
                let reply: ChatReply = send(request).await?;
                reply.choices.into_iter().next().map(|choice| choice.message.content)
            }
        };

        tracing::debug!(
            model = %self.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "LLM completion finished"
        );
        text.ok_or_else(|| GameError::LlmError("Empty response".into()))
    }

    fn anthropic_body<'a>(&'a self, system: &'a str, user: &'a str) -> AnthropicBody<'a> {
        AnthropicBody {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: self.temperature,
            system,
            messages: vec![Turn { role: "user", content: user }],
        }
    }

    fn chat_body<'a>(&'a self, system: &'a str, user: &'a str) -> ChatBody<'a> {
        ChatBody {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: self.temperature,
            messages: vec![
                Turn { role: "system", content: system },
                Turn { role: "user", content: user },
            ],
        }
    }
}

/// Send, reject non-2xx with the body text, decode the reply
async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| GameError::LlmError(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(GameError::LlmError(format!("API error {}: {}", status, detail)));
    }

    response.json().await.map_err(|e| GameError::LlmError(e.to_string()))
}

#[derive(Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct AnthropicBody<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Turn<'a>>,
}

#[derive(Deserialize)]
struct AnthropicReply {
    content: Vec<TextBlock>,
}

#[derive(Deserialize)]
struct TextBlock {
    text: String,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Turn<'a>>,
}

#[derive(Deserialize)]
struct ChatReply {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}
