//! Axum routes for chat endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    create_chat, get_chat, list_chats, rename_chat, retry_generation, send_message, ChatAppState,
};

/// Creates routes for chat endpoints, relative to their mount point.
///
/// - `POST /` - Start a session with its first message
/// - `GET /` - List the caller's sessions
/// - `GET /:id` - Session with its transcript
/// - `PATCH /:id` - Rename a session
/// - `POST /:id/messages` - Append a message and generate a reply
/// - `POST /:id/retry` - Generate the reply to an unanswered message
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/", post(create_chat).get(list_chats))
        .route("/:id", get(get_chat).patch(rename_chat))
        .route("/:id/messages", post(send_message))
        .route("/:id/retry", post(retry_generation))
}

/// Chat routes mounted under `/api/v1/chats`.
pub fn chat_router() -> Router<ChatAppState> {
    Router::new().nest("/api/v1/chats", chat_routes())
}
