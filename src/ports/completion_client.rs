//! Completion client port - interface to the external text generation service.
//!
//! The service is stateless: it receives the full ordered transcript on every
//! call and returns one generated reply. This is the only call in the system
//! with unbounded latency, so every call carries a caller-supplied timeout.
//!
//! # Design
//!
//! - Non-streaming, single candidate
//! - Adapters never retry; retry is a caller decision
//! - The system preamble is synthesized here and never stored

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::conversation::{Message, Role};
use crate::domain::foundation::ErrorCode;

/// System preamble prepended to every prompt.
pub const SYSTEM_PREAMBLE: &str = "You are a helpful assistant.";

/// Port for completion service interactions.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a reply to `transcript`, giving up after `timeout`.
    ///
    /// The transcript is ordered oldest first and normally ends with the
    /// user message being answered.
    async fn complete(
        &self,
        transcript: &[Message],
        timeout: Duration,
    ) -> Result<Completion, CompletionError>;

    /// Client information (name, model).
    fn client_info(&self) -> ClientInfo;
}

/// A generated reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Generated text of the first candidate.
    pub content: String,
    /// Model that generated the reply.
    pub model: String,
    /// Token usage reported by the service.
    pub usage: TokenUsage,
}

impl Completion {
    pub fn new(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            usage: TokenUsage::default(),
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion, saturating).
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Client information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client name (e.g., "openai-compatible", "mock").
    pub name: String,
    /// Model identifier (e.g., "deepseek-chat").
    pub model: String,
}

impl ClientInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Prompt construction
// ════════════════════════════════════════════════════════════════════════════════

/// Role vocabulary of the external service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

impl From<Role> for PromptRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => PromptRole::User,
            Role::Assistant => PromptRole::Assistant,
        }
    }
}

/// One entry of the prompt sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: PromptRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Builds the outgoing prompt: the system preamble followed by the transcript
/// in order, with stored roles mapped to the service's vocabulary.
pub fn build_prompt(system_prompt: &str, transcript: &[Message]) -> Vec<PromptMessage> {
    std::iter::once(PromptMessage::new(PromptRole::System, system_prompt))
        .chain(
            transcript
                .iter()
                .map(|m| PromptMessage::new(m.role().into(), m.content())),
        )
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════════

/// Completion service errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    /// Rate limited by the service.
    #[error("rate limited by completion service")]
    RateLimited,

    /// API key rejected.
    #[error("authentication with completion service failed")]
    AuthenticationFailed,

    /// Service answered with a server error.
    #[error("completion service unavailable: {0}")]
    Unavailable(String),

    /// Transport failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Service rejected the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No response within the allotted time.
    #[error("completion timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// Successful response with zero candidates.
    #[error("no response from completion service")]
    NoCompletion,
}

impl CompletionError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn timeout(after: Duration) -> Self {
        Self::Timeout {
            timeout_ms: after.as_millis() as u64,
        }
    }

    /// Error class exposed to callers: upstream failure, timeout, or empty result.
    pub fn code(&self) -> ErrorCode {
        match self {
            CompletionError::Timeout { .. } => ErrorCode::UpstreamTimeout,
            CompletionError::NoCompletion => ErrorCode::NoCompletion,
            _ => ErrorCode::UpstreamError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::NewMessage;
    use crate::domain::foundation::{MessageId, SessionId, Timestamp};

    fn stored(role: Role, content: &str, sequence: i64) -> Message {
        NewMessage::new(SessionId::new(), role, content)
            .unwrap()
            .into_message(MessageId::new(), Timestamp::now(), sequence)
    }

    #[test]
    fn token_total_saturates_instead_of_overflowing() {
        let usage = TokenUsage::new(u32::MAX, 7);
        assert_eq!(usage.total_tokens, u32::MAX);
        assert_eq!(TokenUsage::new(12, 3).total_tokens, 15);
    }

    #[test]
    fn completion_client_is_object_safe() {
        fn _accepts_dyn(_client: &dyn CompletionClient) {}
    }

    #[test]
    fn build_prompt_prepends_system_preamble() {
        let prompt = build_prompt(SYSTEM_PREAMBLE, &[stored(Role::User, "Hello", 1)]);

        assert_eq!(
            prompt,
            vec![
                PromptMessage::new(PromptRole::System, "You are a helpful assistant."),
                PromptMessage::new(PromptRole::User, "Hello"),
            ]
        );
    }

    #[test]
    fn build_prompt_keeps_order_and_maps_roles() {
        let transcript = vec![
            stored(Role::User, "Hello", 1),
            stored(Role::Assistant, "Hi there", 2),
            stored(Role::User, "More?", 3),
        ];
        let roles: Vec<_> = build_prompt("sys", &transcript)
            .into_iter()
            .map(|m| m.role)
            .collect();

        assert_eq!(
            roles,
            vec![
                PromptRole::System,
                PromptRole::User,
                PromptRole::Assistant,
                PromptRole::User
            ]
        );
    }

    #[test]
    fn legacy_stored_label_reaches_service_as_assistant() {
        let role: Role = "AI".parse().unwrap();
        assert_eq!(PromptRole::from(role), PromptRole::Assistant);
    }

    #[test]
    fn prompt_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PromptRole::System).unwrap(), "\"system\"");
    }

    #[test]
    fn error_codes_distinguish_timeout_and_empty_result() {
        assert_eq!(
            CompletionError::timeout(Duration::from_secs(2)).code(),
            ErrorCode::UpstreamTimeout
        );
        assert_eq!(CompletionError::NoCompletion.code(), ErrorCode::NoCompletion);
        assert_eq!(CompletionError::RateLimited.code(), ErrorCode::UpstreamError);
        assert_eq!(CompletionError::network("reset").code(), ErrorCode::UpstreamError);
    }

    #[test]
    fn timeout_reports_milliseconds() {
        let err = CompletionError::timeout(Duration::from_millis(1500));
        assert_eq!(err, CompletionError::Timeout { timeout_ms: 1500 });
        assert_eq!(err.to_string(), "completion timed out after 1500ms");
    }

    #[test]
    fn token_usage_calculates_total() {
        let usage = TokenUsage::new(100, 50);
        assert_eq!(usage.total_tokens, 150);
    }
}
