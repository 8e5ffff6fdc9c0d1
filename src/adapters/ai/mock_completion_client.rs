//! Mock completion client for testing.
//!
//! # Features
//!
//! - Pre-configured replies, consumed in order
//! - Simulated latency for timeout and concurrency tests
//! - Error injection
//! - Records every transcript it was asked to complete
//!
//! # Example
//!
//! ```ignore
//! let client = MockCompletionClient::new()
//!     .with_response("Hi there")
//!     .with_delay(Duration::from_millis(100));
//!
//! let completion = client.complete(&transcript, Duration::from_secs(5)).await?;
//! assert_eq!(completion.content, "Hi there");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::conversation::Message;
use crate::ports::{ClientInfo, Completion, CompletionClient, CompletionError, TokenUsage};

const MOCK_MODEL: &str = "mock-model-1";

/// A configured mock reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return a successful completion with this text.
    Success(String),
    /// Return an error.
    Error(CompletionError),
}

/// Mock completion client for testing.
#[derive(Debug, Clone)]
pub struct MockCompletionClient {
    /// Pre-configured replies (consumed in order).
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    /// Simulated latency per request.
    delay: Duration,
    /// Transcripts received, in call order.
    calls: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompletionClient {
    /// Creates a new mock with an empty reply queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful reply to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockReply::Success(content.into()));
        self
    }

    /// Adds an error reply to the queue.
    pub fn with_error(self, error: CompletionError) -> Self {
        self.push(MockReply::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues a reply on an already shared mock.
    pub fn push(&self, reply: MockReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    /// Returns the number of calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded transcripts.
    pub fn get_calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    /// Gets the next reply, or an echo of the last message when the queue is empty.
    fn next_reply(&self, transcript: &[Message]) -> MockReply {
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            let echo = transcript
                .last()
                .map(|m| format!("Reply to: {}", m.content()))
                .unwrap_or_else(|| "Mock response".to_string());
            MockReply::Success(echo)
        })
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(
        &self,
        transcript: &[Message],
        _timeout: Duration,
    ) -> Result<Completion, CompletionError> {
        self.calls.lock().unwrap().push(transcript.to_vec());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_reply(transcript) {
            MockReply::Success(content) => {
                Ok(Completion::new(content, MOCK_MODEL).with_usage(TokenUsage::new(10, 5)))
            }
            MockReply::Error(err) => Err(err),
        }
    }

    fn client_info(&self) -> ClientInfo {
        ClientInfo::new("mock", MOCK_MODEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::NewMessage;
    use crate::domain::foundation::{MessageId, SessionId, Timestamp};

    fn transcript(text: &str) -> Vec<Message> {
        vec![NewMessage::user(SessionId::new(), text)
            .unwrap()
            .into_message(MessageId::new(), Timestamp::now(), 1)]
    }

    #[tokio::test]
    async fn returns_queued_replies_in_order() {
        let client = MockCompletionClient::new()
            .with_response("first")
            .with_error(CompletionError::NoCompletion)
            .with_response("third");
        let t = transcript("Hello");

        assert_eq!(client.complete(&t, Duration::from_secs(1)).await.unwrap().content, "first");
        assert_eq!(
            client.complete(&t, Duration::from_secs(1)).await.unwrap_err(),
            CompletionError::NoCompletion
        );
        assert_eq!(client.complete(&t, Duration::from_secs(1)).await.unwrap().content, "third");
    }

    #[tokio::test]
    async fn echoes_last_message_when_queue_is_empty() {
        let client = MockCompletionClient::new();
        let completion = client
            .complete(&transcript("Hello"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(completion.content, "Reply to: Hello");
    }

    #[tokio::test]
    async fn records_transcripts() {
        let client = MockCompletionClient::new().with_response("ok");
        client
            .complete(&transcript("Hello"), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(client.call_count(), 1);
        assert_eq!(client.get_calls()[0][0].content(), "Hello");
    }

    #[tokio::test]
    async fn clones_share_queue_and_history() {
        let client = MockCompletionClient::new();
        let handle = client.clone();
        handle.push(MockReply::Success("shared".into()));

        let completion = client
            .complete(&transcript("x"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(completion.content, "shared");
        assert_eq!(handle.call_count(), 1);
    }
}
