//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - Completion clients (OpenAI-compatible HTTP, mock)
//! - `auth` - Session validators (HS256 JWT, mock)
//! - `http` - axum REST surface
//! - `memory` - In-memory stores for tests and local runs
//! - `postgres` - sqlx-backed stores

pub mod ai;
pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
