//! Application layer - use cases over the domain and ports.

pub mod conversation;

pub use conversation::{
    ConversationError, ConversationManager, ConversationSettings, SavedProgress,
    SessionTranscript,
};
