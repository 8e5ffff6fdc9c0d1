//! HTTP DTOs for chat endpoints.
//!
//! These types decouple the wire format from domain types.

use serde::{Deserialize, Serialize};

use crate::application::{SavedProgress, SessionTranscript};
use crate::domain::conversation::{Message, Role};
use crate::domain::foundation::ErrorCode;
use crate::domain::session::Session;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /chats`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    pub initial_message: String,
}

/// Body of `POST /chats/:id/messages`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// Body of `PATCH /chats/:id`.
#[derive(Debug, Clone, Deserialize)]
pub struct RenameChatRequest {
    pub title: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// View of a session for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    pub id: String,
    pub title: String,
    /// When the session was created (RFC 3339).
    pub created_at: String,
    /// Time of the most recent append (RFC 3339).
    pub last_activity: String,
}

impl From<&Session> for ChatView {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id().to_string(),
            title: session.title().to_string(),
            created_at: session.created_at().as_datetime().to_rfc3339(),
            last_activity: session.last_activity().as_datetime().to_rfc3339(),
        }
    }
}

/// View of a message for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// When the message was stored (RFC 3339).
    pub created_at: String,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id().to_string(),
            role: message.role(),
            content: message.content().to_string(),
            created_at: message.created_at().as_datetime().to_rfc3339(),
        }
    }
}

/// A session with its full transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTranscriptResponse {
    pub chat: ChatView,
    pub messages: Vec<MessageView>,
}

impl From<&SessionTranscript> for ChatTranscriptResponse {
    fn from(transcript: &SessionTranscript) -> Self {
        Self {
            chat: ChatView::from(&transcript.session),
            messages: transcript.messages.iter().map(MessageView::from).collect(),
        }
    }
}

/// Body of `GET /chats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatListResponse {
    pub chats: Vec<ChatView>,
}

/// Body of `PATCH /chats/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub chat: ChatView,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attaches what survived a failed write, if anything did.
    pub fn with_saved(self, saved: SavedProgress) -> Self {
        match saved {
            SavedProgress::Nothing => self,
            SavedProgress::EmptySession { session_id } => self.with_details(serde_json::json!({
                "session_id": session_id.to_string(),
                "user_message_saved": false,
            })),
            SavedProgress::UserMessage {
                session_id,
                message_id,
            } => self.with_details(serde_json::json!({
                "session_id": session_id.to_string(),
                "user_message_id": message_id.to_string(),
                "user_message_saved": true,
            })),
        }
    }
}
