//! In-memory adapters for the persistence ports.
//!
//! Used by tests and by local runs without a database.

mod message_log;
mod session_repository;

pub use message_log::InMemoryMessageLog;
pub use session_repository::InMemorySessionRepository;
