//! Completion client adapters.
//!
//! ## Available Adapters
//!
//! - `MockCompletionClient` - Configurable mock for testing
//! - `OpenAiCompletionClient` - Any OpenAI-compatible chat completions endpoint

mod mock_completion_client;
mod openai_completion_client;

pub use mock_completion_client::{MockCompletionClient, MockReply};
pub use openai_completion_client::{
    OpenAiCompletionClient, OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
