//! PostgreSQL implementation of SessionRepository.
//!
//! Persists session metadata to the `chat_sessions` table.

use async_trait::async_trait;
use sqlx::PgPool;

use super::column;
use crate::domain::foundation::{
    DomainError, ErrorCode, OwnedByUser, SessionId, Timestamp, UserId,
};
use crate::domain::session::Session;
use crate::ports::SessionRepository;

/// PostgreSQL implementation of SessionRepository.
#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    /// Creates a new PostgresSessionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO chat_sessions (id, owner_id, title, created_at, last_activity)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.owner_id().as_i64())
        .bind(session.title())
        .bind(session.created_at().as_datetime())
        .bind(session.last_activity().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert session: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, title, created_at, last_activity
            FROM chat_sessions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch session: {}", e),
            )
        })?;

        row.map(row_to_session).transpose()
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<Session>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, title, created_at, last_activity
            FROM chat_sessions
            WHERE owner_id = $1
            ORDER BY last_activity DESC, created_at DESC
            "#,
        )
        .bind(owner_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch sessions by owner: {}", e),
            )
        })?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn touch(&self, id: &SessionId, at: Timestamp) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE chat_sessions
            SET last_activity = GREATEST(last_activity, $2)
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to touch session: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    async fn update_title(&self, id: &SessionId, title: &str) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE chat_sessions SET title = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(title)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to update session title: {}", e),
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn not_found(id: &SessionId) -> DomainError {
    DomainError::new(ErrorCode::SessionNotFound, format!("Session not found: {}", id))
        .with_detail("session_id", id.to_string())
}

fn row_to_session(row: sqlx::postgres::PgRow) -> Result<Session, DomainError> {
    let id: uuid::Uuid = column(&row, "id")?;
    let owner_id: i64 = column(&row, "owner_id")?;
    let title: String = column(&row, "title")?;
    let created_at: chrono::DateTime<chrono::Utc> = column(&row, "created_at")?;
    let last_activity: chrono::DateTime<chrono::Utc> = column(&row, "last_activity")?;

    Ok(Session::reconstitute(
        SessionId::from_uuid(id),
        UserId::new(owner_id),
        title,
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(last_activity),
    ))
}
