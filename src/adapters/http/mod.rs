//! HTTP adapters - REST API.

pub mod chat;
pub mod middleware;

use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::{middleware as axum_middleware, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use chat::{chat_router, ChatAppState};
pub use middleware::{auth_middleware, AuthState};

/// How far past the manager's own deadline the transport timeout sits.
///
/// `ConversationManager` answers within `request_timeout` on its own; only a
/// stalled store reaches the transport timeout.
pub const TRANSPORT_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Transport settings for [`serve_router`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Same budget the manager enforces for each chat write.
    pub request_timeout: Duration,
    pub cors_origins: Vec<String>,
}

/// Builds the application router.
///
/// Chat routes sit behind `auth_middleware`; `/health` does not.
pub fn app_router(state: ChatAppState, auth: AuthState) -> Router {
    let chats = chat_router()
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(auth, auth_middleware));

    Router::new().route("/health", get(health)).merge(chats)
}

/// The router as served: timeout, CORS, and request tracing around
/// [`app_router`].
pub fn serve_router(state: ChatAppState, auth: AuthState, settings: &HttpSettings) -> Router {
    app_router(state, auth)
        .layer(TimeoutLayer::new(
            settings.request_timeout + TRANSPORT_TIMEOUT_GRACE,
        ))
        .layer(cors_layer(&settings.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
