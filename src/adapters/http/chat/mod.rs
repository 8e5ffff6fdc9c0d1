//! HTTP adapter for chat sessions.
//!
//! - `POST /api/v1/chats` - Start a session
//! - `GET /api/v1/chats` - List sessions
//! - `GET /api/v1/chats/:id` - Read a session
//! - `PATCH /api/v1/chats/:id` - Rename a session
//! - `POST /api/v1/chats/:id/messages` - Send a message
//! - `POST /api/v1/chats/:id/retry` - Retry a failed generation

pub mod dto;
mod handlers;
mod routes;

pub use handlers::{ChatApiError, ChatAppState};
pub use routes::{chat_router, chat_routes};
