//! Conversation domain module.
//!
//! Messages, roles, and transcript checks for chat sessions.

mod message;
mod role;
pub mod transcript;

pub use message::{Message, NewMessage};
pub use role::Role;
