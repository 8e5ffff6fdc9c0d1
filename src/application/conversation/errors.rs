//! Conversation error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, MessageId, SessionId, ValidationError};
use crate::ports::CompletionError;

/// What had already been durably stored when an operation failed.
///
/// Callers use this to tell "nothing was saved, resubmit" apart from
/// "your message was saved, retry generation".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedProgress {
    /// Nothing was written.
    Nothing,
    /// The session exists but holds no messages.
    EmptySession { session_id: SessionId },
    /// The user's message is stored; no assistant reply follows it.
    UserMessage {
        session_id: SessionId,
        message_id: MessageId,
    },
}

impl SavedProgress {
    /// Session that survived the failure, if any.
    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            SavedProgress::Nothing => None,
            SavedProgress::EmptySession { session_id }
            | SavedProgress::UserMessage { session_id, .. } => Some(*session_id),
        }
    }

    /// Stored user message awaiting a reply, if any.
    pub fn user_message_id(&self) -> Option<MessageId> {
        match self {
            SavedProgress::UserMessage { message_id, .. } => Some(*message_id),
            _ => None,
        }
    }
}

/// Errors surfaced by the conversation manager.
#[derive(Debug, Clone, Error)]
pub enum ConversationError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Permission denied")]
    Forbidden,

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Storage error: {source}")]
    Storage {
        #[source]
        source: DomainError,
        saved: SavedProgress,
    },

    #[error("Generation failed: {source}")]
    Generation {
        #[source]
        source: CompletionError,
        saved: SavedProgress,
    },

    #[error("Session {0} has no unanswered message")]
    NoPendingMessage(SessionId),

    #[error("Session {0} is busy generating another reply")]
    Busy(SessionId),
}

impl ConversationError {
    pub fn storage(source: DomainError, saved: SavedProgress) -> Self {
        ConversationError::Storage { source, saved }
    }

    pub fn generation(source: CompletionError, saved: SavedProgress) -> Self {
        ConversationError::Generation { source, saved }
    }

    /// Error code for transport mapping.
    pub fn code(&self) -> ErrorCode {
        match self {
            ConversationError::NotFound(_) => ErrorCode::SessionNotFound,
            ConversationError::Forbidden => ErrorCode::Forbidden,
            ConversationError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            ConversationError::Storage { .. } => ErrorCode::DatabaseError,
            ConversationError::Generation { source, .. } => source.code(),
            ConversationError::NoPendingMessage(_) => ErrorCode::NoPendingMessage,
            ConversationError::Busy(_) => ErrorCode::SessionBusy,
        }
    }

    /// What was persisted before the failure.
    pub fn saved(&self) -> SavedProgress {
        match self {
            ConversationError::Storage { saved, .. }
            | ConversationError::Generation { saved, .. } => *saved,
            _ => SavedProgress::Nothing,
        }
    }

    /// Maps a port error raised while looking a session up.
    ///
    /// Not-found keeps its meaning; anything else is a storage failure with
    /// nothing written.
    pub(crate) fn from_lookup(err: DomainError, session_id: SessionId) -> Self {
        match err.code {
            ErrorCode::SessionNotFound => ConversationError::NotFound(session_id),
            _ => ConversationError::storage(err, SavedProgress::Nothing),
        }
    }
}

impl From<ValidationError> for ConversationError {
    fn from(err: ValidationError) -> Self {
        ConversationError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}
