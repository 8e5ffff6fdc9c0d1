//! PostgreSQL implementation of MessageLog.
//!
//! Messages live in `chat_messages`. The `sequence` column is a BIGSERIAL,
//! so the database hands out the tie-break order. `created_at` is clamped so
//! it never precedes the newest message already in the same session.

use async_trait::async_trait;
use sqlx::PgPool;

use super::column;
use crate::domain::conversation::{Message, NewMessage, Role};
use crate::domain::foundation::{DomainError, ErrorCode, MessageId, SessionId, Timestamp};
use crate::ports::MessageLog;

/// PostgreSQL implementation of MessageLog.
#[derive(Clone)]
pub struct PostgresMessageLog {
    pool: PgPool,
}

impl PostgresMessageLog {
    /// Creates a new PostgresMessageLog.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageLog for PostgresMessageLog {
    async fn append(&self, message: NewMessage) -> Result<Message, DomainError> {
        let id = MessageId::new();
        let now = Timestamp::now();

        let row = sqlx::query(
            r#"
            INSERT INTO chat_messages (id, session_id, role, content, created_at)
            SELECT $1, $2, $3, $4, GREATEST($5, COALESCE(MAX(created_at), $5))
            FROM chat_messages
            WHERE session_id = $2
            RETURNING sequence, created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(message.session_id().as_uuid())
        .bind(message.role().as_str())
        .bind(message.content())
        .bind(now.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to append message: {}", e),
            )
            .with_detail("session_id", message.session_id().to_string())
        })?;

        let sequence: i64 = column(&row, "sequence")?;
        let created_at: chrono::DateTime<chrono::Utc> = column(&row, "created_at")?;

        Ok(message.into_message(id, Timestamp::from_datetime(created_at), sequence))
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, role, content, created_at, sequence
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY created_at ASC, sequence ASC
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch messages: {}", e),
            )
        })?;

        rows.into_iter().map(row_to_message).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn parse_role(raw: &str) -> Result<Role, DomainError> {
    raw.parse().map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid stored role: {}", e),
        )
    })
}

fn row_to_message(row: sqlx::postgres::PgRow) -> Result<Message, DomainError> {
    let id: uuid::Uuid = column(&row, "id")?;
    let session_id: uuid::Uuid = column(&row, "session_id")?;
    let role: String = column(&row, "role")?;
    let content: String = column(&row, "content")?;
    let created_at: chrono::DateTime<chrono::Utc> = column(&row, "created_at")?;
    let sequence: i64 = column(&row, "sequence")?;

    Ok(Message::reconstitute(
        MessageId::from_uuid(id),
        SessionId::from_uuid(session_id),
        parse_role(&role)?,
        content,
        Timestamp::from_datetime(created_at),
        sequence,
    ))
}
