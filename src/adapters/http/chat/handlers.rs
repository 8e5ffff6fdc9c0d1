//! HTTP handlers for chat endpoints.
//!
//! Thin wrappers: parse the request, call `ConversationManager`, map the result.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::{ConversationError, ConversationManager};
use crate::domain::foundation::{ErrorCode, SessionId};

use super::super::middleware::RequireAuth;
use super::dto::{
    ChatListResponse, ChatResponse, ChatTranscriptResponse, ChatView, CreateChatRequest,
    ErrorResponse, RenameChatRequest, SendMessageRequest,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for chat handlers.
#[derive(Clone)]
pub struct ChatAppState {
    pub manager: Arc<ConversationManager>,
}

impl ChatAppState {
    pub fn new(manager: Arc<ConversationManager>) -> Self {
        Self { manager }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/v1/chats - Start a session with its first message
pub async fn create_chat(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    body: Result<Json<CreateChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ChatApiError> {
    let Json(request) = body?;
    let created = state
        .manager
        .create_session(user.id, &request.initial_message)
        .await?;

    Ok((StatusCode::CREATED, Json(ChatTranscriptResponse::from(&created))))
}

/// GET /api/v1/chats - List the caller's sessions
pub async fn list_chats(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, ChatApiError> {
    let sessions = state.manager.list_sessions(user.id).await?;

    Ok(Json(ChatListResponse {
        chats: sessions.iter().map(ChatView::from).collect(),
    }))
}

/// GET /api/v1/chats/:id - Session with its transcript
pub async fn get_chat(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ChatApiError> {
    let session_id = parse_session_id(&id)?;
    let transcript = state.manager.get_session(session_id, user.id).await?;

    Ok(Json(ChatTranscriptResponse::from(&transcript)))
}

/// PATCH /api/v1/chats/:id - Rename a session
pub async fn rename_chat(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    body: Result<Json<RenameChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ChatApiError> {
    let session_id = parse_session_id(&id)?;
    let Json(request) = body?;
    let session = state
        .manager
        .rename_session(session_id, user.id, &request.title)
        .await?;

    Ok(Json(ChatResponse {
        chat: ChatView::from(&session),
    }))
}

/// POST /api/v1/chats/:id/messages - Append a message and generate a reply
pub async fn send_message(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ChatApiError> {
    let session_id = parse_session_id(&id)?;
    let Json(request) = body?;
    let transcript = state
        .manager
        .send_message(session_id, user.id, &request.message)
        .await?;

    Ok(Json(ChatTranscriptResponse::from(&transcript)))
}

/// POST /api/v1/chats/:id/retry - Generate the reply to an unanswered message
pub async fn retry_generation(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ChatApiError> {
    let session_id = parse_session_id(&id)?;
    let transcript = state.manager.retry_generation(session_id, user.id).await?;

    Ok(Json(ChatTranscriptResponse::from(&transcript)))
}

fn parse_session_id(raw: &str) -> Result<SessionId, ChatApiError> {
    raw.parse().map_err(|_| ChatApiError::InvalidId(raw.to_string()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts conversation errors to HTTP responses.
#[derive(Debug)]
pub enum ChatApiError {
    InvalidId(String),
    InvalidBody(String),
    Conversation(ConversationError),
}

impl From<JsonRejection> for ChatApiError {
    fn from(rejection: JsonRejection) -> Self {
        ChatApiError::InvalidBody(rejection.body_text())
    }
}

impl From<ConversationError> for ChatApiError {
    fn from(err: ConversationError) -> Self {
        ChatApiError::Conversation(err)
    }
}

impl ChatApiError {
    fn status(&self) -> StatusCode {
        match self {
            ChatApiError::InvalidId(_) | ChatApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ChatApiError::Conversation(err) => match err.code() {
                ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
                ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorCode::Forbidden => StatusCode::FORBIDDEN,
                ErrorCode::SessionNotFound => StatusCode::NOT_FOUND,
                ErrorCode::NoPendingMessage => StatusCode::CONFLICT,
                ErrorCode::SessionBusy => StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::UpstreamError | ErrorCode::NoCompletion => StatusCode::BAD_GATEWAY,
                ErrorCode::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorCode::DatabaseError | ErrorCode::InternalError => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ChatApiError::InvalidId(raw) => ErrorResponse::new(
                ErrorCode::ValidationFailed,
                format!("Invalid chat id: {}", raw),
            ),
            ChatApiError::InvalidBody(reason) => ErrorResponse::new(
                ErrorCode::ValidationFailed,
                format!("Invalid request body: {}", reason),
            ),
            ChatApiError::Conversation(err) => {
                let message = match &err {
                    // Storage internals stay in the logs.
                    ConversationError::Storage { source, .. } => {
                        tracing::error!("Chat storage failure: {}", source);
                        "A storage error occurred".to_string()
                    }
                    other => other.to_string(),
                };
                ErrorResponse::new(err.code(), message).with_saved(err.saved())
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::SavedProgress;
    use crate::domain::foundation::{DomainError, MessageId};
    use crate::ports::CompletionError;

    fn status_of(err: ConversationError) -> StatusCode {
        ChatApiError::from(err).into_response().status()
    }

    #[test]
    fn conversation_errors_map_to_statuses() {
        let id = SessionId::new();
        assert_eq!(status_of(ConversationError::NotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(ConversationError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(ConversationError::ValidationFailed {
                field: "content".into(),
                message: "empty".into()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ConversationError::NoPendingMessage(id)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ConversationError::Busy(id)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(ConversationError::storage(
                DomainError::new(ErrorCode::DatabaseError, "down"),
                SavedProgress::Nothing
            )),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn generation_errors_map_to_gateway_statuses() {
        let saved = SavedProgress::UserMessage {
            session_id: SessionId::new(),
            message_id: MessageId::new(),
        };
        assert_eq!(
            status_of(ConversationError::generation(CompletionError::RateLimited, saved)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ConversationError::generation(CompletionError::NoCompletion, saved)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ConversationError::generation(
                CompletionError::timeout(std::time::Duration::from_secs(1)),
                saved
            )),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn invalid_body_is_bad_request() {
        let response = ChatApiError::InvalidBody("missing field `message`".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn malformed_id_is_bad_request() {
        let err = parse_session_id("not-a-uuid").unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
