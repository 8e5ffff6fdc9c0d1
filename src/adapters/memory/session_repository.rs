//! In-memory session repository.
//!
//! Backs tests and local development. Data is lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{
    DomainError, ErrorCode, OwnedByUser, SessionId, Timestamp, UserId,
};
use crate::domain::session::Session;
use crate::ports::SessionRepository;

/// In-memory implementation of the SessionRepository port.
#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(id: &SessionId) -> DomainError {
        DomainError::new(ErrorCode::SessionNotFound, "Session not found")
            .with_detail("session_id", id.to_string())
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(session.id()) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Session {} already exists", session.id()),
            ));
        }
        sessions.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Session>, DomainError> {
        let mut owned: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.is_owner(owner_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            b.last_activity()
                .cmp(a.last_activity())
                .then_with(|| b.created_at().cmp(a.created_at()))
        });
        Ok(owned)
    }

    async fn touch(&self, id: &SessionId, at: Timestamp) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or_else(|| Self::not_found(id))?;
        session.record_activity(at);
        Ok(())
    }

    async fn update_title(&self, id: &SessionId, title: &str) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or_else(|| Self::not_found(id))?;
        session.rename(title)?;
        Ok(())
    }
}
