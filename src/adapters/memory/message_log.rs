//! In-memory message log.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::conversation::{Message, NewMessage};
use crate::domain::foundation::{DomainError, MessageId, SessionId, Timestamp};
use crate::ports::MessageLog;

#[derive(Default)]
struct LogState {
    next_sequence: i64,
    by_session: HashMap<SessionId, Vec<Message>>,
}

/// In-memory implementation of the MessageLog port.
///
/// Sequence numbers are global and start at 1, like a database serial.
/// A message never gets a `created_at` earlier than the last message of the
/// same session, so insertion order and `(created_at, sequence)` order agree
/// even if the wall clock steps back.
#[derive(Default)]
pub struct InMemoryMessageLog {
    state: RwLock<LogState>,
}

impl InMemoryMessageLog {
    /// Creates a new empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn append(&self, message: NewMessage) -> Result<Message, DomainError> {
        let mut state = self.state.write().await;
        state.next_sequence += 1;
        let sequence = state.next_sequence;

        let log = state.by_session.entry(*message.session_id()).or_default();
        let mut created_at = Timestamp::now();
        if let Some(last) = log.last() {
            if created_at.is_before(last.created_at()) {
                created_at = *last.created_at();
            }
        }

        let stored = message.into_message(MessageId::new(), created_at, sequence);
        log.push(stored.clone());
        Ok(stored)
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError> {
        let state = self.state.read().await;
        let mut messages = state
            .by_session
            .get(session_id)
            .cloned()
            .unwrap_or_default();
        messages.sort_by_key(Message::order_key);
        Ok(messages)
    }
}
