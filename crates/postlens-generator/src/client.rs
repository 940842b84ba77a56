//! HTTP client for an OpenAI-compatible chat-completions API.
//!
//! One prompt in, one assistant message out. Transient failures are retried
//! with back-off (see [`crate::retry`]); the caller handles the content.

use std::time::Duration;

use postlens_core::AppConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;
use crate::retry::retry_with_backoff;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that strictly outputs JSON.";
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

/// Connection and sampling parameters for [`ChatClient`].
#[derive(Clone)]
pub struct ChatSettings {
    pub api_key: String,
    /// API root, e.g. `https://api.groq.com/openai/v1`.
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_retries: u32,
    pub timeout_secs: u64,
    pub backoff_base_ms: u64,
}

impl ChatSettings {
    /// # Errors
    ///
    /// Returns [`GeneratorError::MissingApiKey`] if no API key is configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, GeneratorError> {
        let api_key = config
            .llm_api_key
            .clone()
            .ok_or(GeneratorError::MissingApiKey)?;
        Ok(Self {
            api_key,
            base_url: config.llm_base_url.clone(),
            model: config.llm_model.clone(),
            max_tokens: config.llm_max_tokens,
            temperature: config.llm_temperature,
            max_retries: config.llm_max_retries,
            timeout_secs: config.request_timeout_secs,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }
}

impl std::fmt::Debug for ChatSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSettings")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("timeout_secs", &self.timeout_secs)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Client for `POST {base_url}/chat/completions`.
pub struct ChatClient {
    client: Client,
    settings: ChatSettings,
    url: String,
}

impl ChatClient {
    /// # Errors
    ///
    /// Returns [`GeneratorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: ChatSettings) -> Result<Self, GeneratorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let url = format!("{}/chat/completions", settings.base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            settings,
            url,
        })
    }

    /// Creates a client against a custom API root (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(settings: ChatSettings, base_url: &str) -> Result<Self, GeneratorError> {
        Self::new(ChatSettings {
            base_url: base_url.to_string(),
            ..settings
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Send `prompt` as the user message and return the trimmed assistant
    /// reply.
    ///
    /// # Errors
    ///
    /// - [`GeneratorError::Http`] on network failure or a non-2xx status
    ///   that survives all retries.
    /// - [`GeneratorError::Deserialize`] if the body is not a chat response.
    /// - [`GeneratorError::Api`] if the response carries no message content.
    pub async fn complete(&self, prompt: &str) -> Result<String, GeneratorError> {
        retry_with_backoff(
            self.settings.max_retries,
            self.settings.backoff_base_ms,
            || self.request(prompt),
        )
        .await
    }

    async fn request(&self, prompt: &str) -> Result<String, GeneratorError> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| GeneratorError::Deserialize {
                context: "chat completion".to_string(),
                source: e,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| GeneratorError::Api("response contained no message content".to_string()))
    }
}
