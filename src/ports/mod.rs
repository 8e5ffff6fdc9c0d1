//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `SessionRepository` - Session metadata (owner, title, activity)
//! - `MessageLog` - Append-only ordered transcript per session
//!
//! ## External Service Ports
//!
//! - `CompletionClient` - Text generation from a transcript
//! - `SessionValidator` - Bearer token to user identity

mod completion_client;
mod message_log;
mod session_repository;
mod session_validator;

pub use completion_client::{
    build_prompt, ClientInfo, Completion, CompletionClient, CompletionError, PromptMessage,
    PromptRole, TokenUsage, SYSTEM_PREAMBLE,
};
pub use message_log::MessageLog;
pub use session_repository::SessionRepository;
pub use session_validator::SessionValidator;
