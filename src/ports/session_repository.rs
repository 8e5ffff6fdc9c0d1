//! Session repository port.
//!
//! Defines the contract for persisting and retrieving chat session metadata.
//! Messages are stored separately through [`MessageLog`](super::MessageLog).
//!
//! # Design
//!
//! - **Owner-scoped listing**: the only collection query is by owner
//! - **No caching**: every call reaches the store, so read-after-write holds
//!   as far as the store guarantees it

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, Timestamp, UserId};
use crate::domain::session::Session;
use async_trait::async_trait;

/// Repository port for Session persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new session.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn save(&self, session: &Session) -> Result<(), DomainError>;

    /// Find a session by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Fetch a session that must exist.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if absent
    /// - `DatabaseError` on persistence failure
    async fn get(&self, id: &SessionId) -> Result<Session, DomainError> {
        self.find_by_id(id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::SessionNotFound, "Session not found")
                .with_detail("session_id", id.to_string())
        })
    }

    /// Find all sessions owned by a user.
    ///
    /// Returns sessions ordered by last_activity descending, most recent first.
    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Session>, DomainError>;

    /// Move a session's last_activity forward to `at`.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn touch(&self, id: &SessionId, at: Timestamp) -> Result<(), DomainError>;

    /// Replace a session's title. The title is expected to be validated.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if session doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update_title(&self, id: &SessionId, title: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn session_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SessionRepository) {}
    }
}
