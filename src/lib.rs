//! Parley - chat sessions backed by an OpenAI-compatible completion service.
//!
//! The conversation manager owns each session's message log, enforces
//! ownership, and runs the append-then-generate workflow so that a failed
//! completion never loses what the user wrote.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
