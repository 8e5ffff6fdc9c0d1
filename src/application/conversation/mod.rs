//! Conversation orchestration.
//!
//! `ConversationManager` is the single entry point for chat sessions:
//! creating them, reading them back, and appending exchanges.

mod errors;
mod manager;
mod session_locks;

pub use errors::{ConversationError, SavedProgress};
pub use manager::{
    ConversationManager, ConversationSettings, SessionTranscript, DEFAULT_COMPLETION_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use session_locks::{SessionLease, SessionLocks};
