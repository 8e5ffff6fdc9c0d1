//! Session aggregate entity.
//!
//! A session is one conversation thread. It belongs to exactly one user and
//! owns an ordered message log, which lives in the `MessageLog` port and is
//! referenced here only by session id.
//!
//! # Lifecycle
//!
//! Sessions are created with the placeholder title and no messages. After
//! that only `title` and `last_activity` ever change. Deleting a session
//! cascades to all of its messages.

use crate::domain::foundation::{OwnedByUser, SessionId, Timestamp, UserId, ValidationError};
use serde::{Deserialize, Serialize};

/// Title given to every new session until the owner renames it.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum length for session title.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Session aggregate - one chat thread with its metadata.
///
/// # Invariants
///
/// - `id` is globally unique
/// - `owner_id` never changes after creation
/// - `title` is 1-100 characters, non-blank
/// - `last_activity` never moves backwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session.
    id: SessionId,

    /// User who created and owns this session.
    owner_id: UserId,

    /// Display label.
    title: String,

    /// When the session was created.
    created_at: Timestamp,

    /// When a message was last appended.
    last_activity: Timestamp,
}

impl Session {
    /// Create a new, empty session owned by `owner_id`.
    pub fn new(owner_id: UserId) -> Self {
        let now = Timestamp::now();
        Self {
            id: SessionId::new(),
            owner_id,
            title: DEFAULT_TITLE.to_string(),
            created_at: now,
            last_activity: now,
        }
    }

    /// Reconstitute a session from persistence (no validation).
    pub fn reconstitute(
        id: SessionId,
        owner_id: UserId,
        title: String,
        created_at: Timestamp,
        last_activity: Timestamp,
    ) -> Self {
        Self {
            id,
            owner_id,
            title,
            created_at,
            last_activity,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the session title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns when the session was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns when the session last saw a message.
    pub fn last_activity(&self) -> &Timestamp {
        &self.last_activity
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Rename the session, returning the previous title.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the title is blank
    /// - `TooLong` if the title exceeds `MAX_TITLE_LENGTH`
    pub fn rename(&mut self, new_title: &str) -> Result<String, ValidationError> {
        let new_title = Self::validate_title(new_title)?;
        Ok(std::mem::replace(&mut self.title, new_title))
    }

    /// Records that a message was appended at `at`.
    ///
    /// Older timestamps are ignored so activity is monotonic.
    pub fn record_activity(&mut self, at: Timestamp) {
        if at.is_after(&self.last_activity) {
            self.last_activity = at;
        }
    }

    /// Trims and checks a candidate title.
    pub fn validate_title(title: &str) -> Result<String, ValidationError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        let len = trimmed.chars().count();
        if len > MAX_TITLE_LENGTH {
            return Err(ValidationError::too_long("title", MAX_TITLE_LENGTH, len));
        }
        Ok(trimmed.to_string())
    }
}

impl OwnedByUser for Session {
    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
}
