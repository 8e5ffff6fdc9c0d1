//! OpenAI-compatible completion client.
//!
//! Talks to any `/chat/completions` endpoint that speaks the OpenAI wire
//! format. Defaults target DeepSeek's hosted API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiConfig::new(api_key)
//!     .with_model("deepseek-chat")
//!     .with_base_url("https://api.deepseek.com");
//!
//! let client = OpenAiCompletionClient::new(config)?;
//! ```
//!
//! One `reqwest::Client` (and its connection pool) is built at construction
//! and lives as long as this value. Requests are never retried here.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::conversation::Message;
use crate::ports::{
    build_prompt, ClientInfo, Completion, CompletionClient, CompletionError, PromptMessage,
    TokenUsage, SYSTEM_PREAMBLE,
};

/// Default endpoint base.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
/// Default model.
pub const DEFAULT_MODEL: &str = "deepseek-chat";
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default response length budget in tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 150;

/// Configuration for the OpenAI-compatible client.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "deepseek-chat", "gpt-4o-mini").
    pub model: String,
    /// Base URL for the API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Fixed sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate per reply.
    pub max_tokens: u32,
    /// System preamble sent ahead of every transcript.
    pub system_prompt: String,
}

impl OpenAiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: SYSTEM_PREAMBLE.to_string(),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the response length budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the system preamble.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Completion client for OpenAI-compatible endpoints.
pub struct OpenAiCompletionClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiCompletionClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// - `Unavailable` if the HTTP client cannot be built (e.g. no TLS backend)
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .build()
            .map_err(|e| CompletionError::unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Converts a transcript to the wire request.
    fn to_request(&self, transcript: &[Message]) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: build_prompt(&self.config.system_prompt, transcript),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }

    /// Maps a non-success response to an error.
    async fn handle_response_status(response: Response) -> Result<Response, CompletionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), error_body))
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(
        &self,
        transcript: &[Message],
        timeout: Duration,
    ) -> Result<Completion, CompletionError> {
        let request = self.to_request(transcript);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::timeout(timeout)
                } else if e.is_connect() {
                    CompletionError::network(format!("Connection failed: {}", e))
                } else {
                    CompletionError::network(e.to_string())
                }
            })?;

        let response = Self::handle_response_status(response).await?;

        let body: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::timeout(timeout)
            } else {
                CompletionError::parse(format!("Failed to parse response: {}", e))
            }
        })?;

        into_completion(body, &self.config.model)
    }

    fn client_info(&self) -> ClientInfo {
        ClientInfo::new("openai-compatible", &self.config.model)
    }
}

/// Maps an HTTP error status to the error taxonomy.
fn status_error(status: u16, body: String) -> CompletionError {
    match status {
        401 | 403 => CompletionError::AuthenticationFailed,
        429 => CompletionError::RateLimited,
        500..=599 => CompletionError::unavailable(format!("Server error {}: {}", status, body)),
        _ => CompletionError::InvalidRequest(format!("Unexpected status {}: {}", status, body)),
    }
}

/// Takes the first candidate, or reports that there was none.
fn into_completion(body: ChatResponse, fallback_model: &str) -> Result<Completion, CompletionError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::NoCompletion)?;

    // Prefer the service's own total when it reports one.
    let usage = body
        .usage
        .map(|u| {
            let usage = TokenUsage::new(u.prompt_tokens, u.completion_tokens);
            TokenUsage {
                total_tokens: u.total_tokens.unwrap_or(usage.total_tokens),
                ..usage
            }
        })
        .unwrap_or_default();
    let model = body.model.unwrap_or_else(|| fallback_model.to_string());

    Ok(Completion::new(choice.message.content, model).with_usage(usage))
}

// ----- Wire types -----

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<PromptMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::{NewMessage, Role};
    use crate::domain::foundation::{MessageId, SessionId, Timestamp};

    fn client() -> OpenAiCompletionClient {
        OpenAiCompletionClient::new(OpenAiConfig::new("sk-test")).unwrap()
    }

    fn stored(role: Role, content: &str, sequence: i64) -> Message {
        NewMessage::new(SessionId::new(), role, content)
            .unwrap()
            .into_message(MessageId::new(), Timestamp::now(), sequence)
    }

    #[test]
    fn config_defaults_match_hosted_deepseek() {
        let config = OpenAiConfig::new("sk-test");
        assert_eq!(config.base_url, "https://api.deepseek.com");
        assert_eq!(config.model, "deepseek-chat");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 150);
        assert_eq!(config.system_prompt, "You are a helpful assistant.");
    }

    #[test]
    fn config_builder_works() {
        let config = OpenAiConfig::new("sk-test")
            .with_model("gpt-4o-mini")
            .with_base_url("http://localhost:11434/v1/")
            .with_temperature(0.2)
            .with_max_tokens(64)
            .with_system_prompt("Be brief.");

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 64);
        assert_eq!(config.system_prompt, "Be brief.");
        assert_eq!(config.api_key(), "sk-test");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = OpenAiConfig::new("sk-very-secret");
        assert!(!format!("{:?}", config).contains("sk-very-secret"));
    }

    #[test]
    fn completions_url_handles_trailing_slash() {
        let client = OpenAiCompletionClient::new(
            OpenAiConfig::new("k").with_base_url("http://localhost:8000/v1/"),
        )
        .unwrap();
        assert_eq!(client.completions_url(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn request_carries_preamble_transcript_and_budget() {
        let transcript = vec![
            stored(Role::User, "Hello", 1),
            stored(Role::Assistant, "Hi there", 2),
            stored(Role::User, "More?", 3),
        ];
        let json = serde_json::to_value(client().to_request(&transcript)).unwrap();

        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["max_tokens"], 150);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "You are a helpful assistant.");
        assert_eq!(json["messages"][2]["role"], "assistant");
        assert_eq!(json["messages"][3]["content"], "More?");
        assert_eq!(json["messages"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn status_errors_map_to_taxonomy() {
        assert_eq!(status_error(401, String::new()), CompletionError::AuthenticationFailed);
        assert_eq!(status_error(429, String::new()), CompletionError::RateLimited);
        assert!(matches!(
            status_error(503, "overloaded".into()),
            CompletionError::Unavailable(_)
        ));
        assert!(matches!(
            status_error(400, "bad".into()),
            CompletionError::InvalidRequest(_)
        ));
    }

    #[test]
    fn first_choice_becomes_completion() {
        let body: ChatResponse = serde_json::from_str(
            r#"{
                "model": "deepseek-chat",
                "choices": [
                    {"message": {"role": "assistant", "content": "Hi there"}},
                    {"message": {"role": "assistant", "content": "ignored"}}
                ],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
            }"#,
        )
        .unwrap();

        let completion = into_completion(body, "fallback").unwrap();
        assert_eq!(completion.content, "Hi there");
        assert_eq!(completion.model, "deepseek-chat");
        assert_eq!(completion.usage.total_tokens, 15);
    }

    #[test]
    fn oversized_usage_counts_do_not_overflow() {
        let body: ChatResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"content": "ok"}}],
                "usage": {"prompt_tokens": 4294967295, "completion_tokens": 10}
            }"#,
        )
        .unwrap();

        let completion = into_completion(body, "deepseek-chat").unwrap();
        assert_eq!(completion.usage.prompt_tokens, u32::MAX);
        assert_eq!(completion.usage.total_tokens, u32::MAX);
    }

    #[test]
    fn reported_total_is_kept() {
        let body: ChatResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"content": "ok"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 20}
            }"#,
        )
        .unwrap();

        assert_eq!(into_completion(body, "deepseek-chat").unwrap().usage.total_tokens, 20);
    }

    #[test]
    fn zero_choices_is_no_completion() {
        let body: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(
            into_completion(body, "deepseek-chat").unwrap_err(),
            CompletionError::NoCompletion
        );
    }

    #[test]
    fn missing_model_falls_back_to_configured() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "ok"}}]}"#).unwrap();
        assert_eq!(into_completion(body, "deepseek-chat").unwrap().model, "deepseek-chat");
    }

    #[test]
    fn client_info_reports_model() {
        assert_eq!(client().client_info().model, "deepseek-chat");
    }
}
