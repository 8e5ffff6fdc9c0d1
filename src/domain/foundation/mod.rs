//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps, auth types, and error types
//! that form the vocabulary of the chat domain.

mod auth;
mod errors;
mod ids;
mod ownership;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{MessageId, SessionId, UserId};
pub use ownership::OwnedByUser;
pub use timestamp::Timestamp;
