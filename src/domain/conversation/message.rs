//! Message entity for session transcripts.
//!
//! Messages are immutable once stored. The store assigns the id, the
//! timestamp, and a strictly increasing sequence number at append time; a
//! caller only supplies a [`NewMessage`].

use super::Role;
use crate::domain::foundation::{MessageId, SessionId, Timestamp, ValidationError};
use serde::{Deserialize, Serialize};

/// A message that has been validated but not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    session_id: SessionId,
    role: Role,
    content: String,
}

impl NewMessage {
    /// Creates a message to append to `session_id`.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if content is empty or whitespace only
    pub fn new(
        session_id: SessionId,
        role: Role,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        Message::validate_content(&content)?;
        Ok(Self {
            session_id,
            role,
            content,
        })
    }

    /// Shorthand for a user message.
    pub fn user(session_id: SessionId, content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(session_id, Role::User, content)
    }

    /// Shorthand for an assistant message.
    pub fn assistant(
        session_id: SessionId,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(session_id, Role::Assistant, content)
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Completes the message with the values the store assigns.
    pub fn into_message(self, id: MessageId, created_at: Timestamp, sequence: i64) -> Message {
        Message {
            id,
            session_id: self.session_id,
            role: self.role,
            content: self.content,
            created_at,
            sequence,
        }
    }
}

/// A stored message.
///
/// # Invariants
///
/// - `content` is non-blank
/// - within one session, `(created_at, sequence)` is unique and defines the order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    session_id: SessionId,
    role: Role,
    content: String,
    created_at: Timestamp,
    sequence: i64,
}

impl Message {
    /// Reconstitutes a message from persistence (no validation).
    pub fn reconstitute(
        id: MessageId,
        session_id: SessionId,
        role: Role,
        content: String,
        created_at: Timestamp,
        sequence: i64,
    ) -> Self {
        Self {
            id,
            session_id,
            role,
            content,
            created_at,
            sequence,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Insertion sequence, the tie-break for equal timestamps.
    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    /// Key that defines transcript order.
    pub fn order_key(&self) -> (Timestamp, i64) {
        (self.created_at, self.sequence)
    }

    /// Returns true if this message was written by the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub(crate) fn validate_content(content: &str) -> Result<(), ValidationError> {
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }
        Ok(())
    }
}
