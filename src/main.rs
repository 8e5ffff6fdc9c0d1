//! Parley server binary.
//!
//! Configuration comes from `PARLEY__*` environment variables (see
//! `parley::config`).

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use parley::adapters::ai::OpenAiCompletionClient;
use parley::adapters::auth::JwtSessionValidator;
use parley::adapters::http::{serve_router, AuthState, ChatAppState};
use parley::adapters::postgres::{PostgresMessageLog, PostgresSessionRepository};
use parley::application::ConversationManager;
use parley::config::{AppConfig, ServerConfig};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    tracing::info!("Connected to database");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let completions = OpenAiCompletionClient::new(config.ai.client_config())?;
    let manager = ConversationManager::new(
        Arc::new(PostgresSessionRepository::new(pool.clone())),
        Arc::new(PostgresMessageLog::new(pool)),
        Arc::new(completions),
        config.conversation_settings(),
    );
    let auth: AuthState = Arc::new(JwtSessionValidator::new(config.jwt_config()));

    let app = serve_router(
        ChatAppState::new(Arc::new(manager)),
        auth,
        &config.server.http_settings(),
    );

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        address = %addr,
        model = %config.ai.model,
        environment = ?config.server.environment,
        "parley listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    if server.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
