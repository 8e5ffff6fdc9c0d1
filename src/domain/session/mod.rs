//! Session domain module.
//!
//! Chat session metadata: ownership, title, and activity bookkeeping.

mod aggregate;

pub use aggregate::{Session, DEFAULT_TITLE, MAX_TITLE_LENGTH};
