//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, auth, errors)
//! - `session` - Chat session metadata and ownership
//! - `conversation` - Messages, roles, and transcript ordering

pub mod conversation;
pub mod foundation;
pub mod session;
