//! PostgreSQL adapters - Database implementations for persistence ports.
//!
//! - `PostgresSessionRepository` - Session metadata in `chat_sessions`
//! - `PostgresMessageLog` - Transcripts in `chat_messages`
//!
//! Schema lives in `migrations/` and is applied with `sqlx::migrate!`.

mod message_log;
mod session_repository;

pub use message_log::PostgresMessageLog;
pub use session_repository::PostgresSessionRepository;

use crate::domain::foundation::{DomainError, ErrorCode};
use sqlx::Row;

/// Reads a column, mapping decode failures to `DatabaseError`.
fn column<'r, T>(row: &'r sqlx::postgres::PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to get {}: {}", name, e),
        )
    })
}
