//! Message log port.
//!
//! An append-only, ordered sequence of messages per session. The log holds
//! no business rules: it does not check role alternation or ownership.

use crate::domain::conversation::{Message, NewMessage};
use crate::domain::foundation::{DomainError, SessionId};
use async_trait::async_trait;

/// Append-only message storage.
///
/// Implementations must guarantee:
/// - each append is atomic and assigns a fresh id, a timestamp, and a
///   sequence number greater than every earlier one
/// - an acknowledged append is visible to the next `list_by_session`
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Store a message and return it with its assigned fields.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn append(&self, message: NewMessage) -> Result<Message, DomainError>;

    /// Full transcript ordered by `(created_at, sequence)`.
    ///
    /// A session with no messages yields an empty vec.
    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError>;
}
