//! ConversationManager - orchestrates sessions, transcripts, and generation.
//!
//! Every write follows the same two-phase shape: the user's text is appended
//! first, then a reply is generated and appended. A generation failure never
//! rolls back the user's message; the error says what was saved so the caller
//! can retry generation instead of resubmitting.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::conversation::{transcript, Message, NewMessage};
use crate::domain::foundation::{OwnedByUser, SessionId, UserId};
use crate::domain::session::Session;
use crate::ports::{CompletionClient, CompletionError, MessageLog, SessionRepository};

use super::errors::{ConversationError, SavedProgress};
use super::session_locks::{SessionLease, SessionLocks};

/// Default wait for one completion call.
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

/// Default budget for a whole write operation, lock wait included.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Tunables for the manager.
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    /// Upper bound on a single completion call.
    pub completion_timeout: Duration,
    /// Upper bound on one write operation from entry to reply.
    pub request_timeout: Duration,
}

impl ConversationSettings {
    /// Longest wait for a session's lock that still leaves a full
    /// completion inside the request budget.
    pub fn lock_wait(&self) -> Duration {
        self.request_timeout.saturating_sub(self.completion_timeout)
    }
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            completion_timeout: DEFAULT_COMPLETION_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// A session together with its ordered transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTranscript {
    pub session: Session,
    pub messages: Vec<Message>,
}

/// Orchestrator for chat sessions.
pub struct ConversationManager {
    sessions: Arc<dyn SessionRepository>,
    messages: Arc<dyn MessageLog>,
    completions: Arc<dyn CompletionClient>,
    locks: SessionLocks,
    settings: ConversationSettings,
}

impl ConversationManager {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        messages: Arc<dyn MessageLog>,
        completions: Arc<dyn CompletionClient>,
        settings: ConversationSettings,
    ) -> Self {
        Self {
            sessions,
            messages,
            completions,
            locks: SessionLocks::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &ConversationSettings {
        &self.settings
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Creates a session seeded with `initial_text` and the generated reply.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the text is blank (nothing is written)
    /// - `Storage` with `Nothing`, `EmptySession`, or `UserMessage` saved
    /// - `Generation` with the user message saved
    pub async fn create_session(
        &self,
        owner_id: UserId,
        initial_text: &str,
    ) -> Result<SessionTranscript, ConversationError> {
        let deadline = self.deadline();
        let mut session = Session::new(owner_id);
        let session_id = *session.id();
        let user_message = NewMessage::user(session_id, initial_text)?;

        // Held from before the session is visible so no send can interleave
        // with the seed exchange.
        let _lease = self.lease(session_id).await?;

        self.sessions
            .save(&session)
            .await
            .map_err(|e| ConversationError::storage(e, SavedProgress::Nothing))?;
        tracing::info!(session_id = %session_id, owner_id = %owner_id, "Session created");

        let user_message = self
            .messages
            .append(user_message)
            .await
            .map_err(|e| ConversationError::storage(e, SavedProgress::EmptySession { session_id }))?;

        self.record_user_message(&mut session, &user_message).await?;
        self.generate_reply(session, vec![user_message], deadline).await
    }

    /// Sessions owned by `owner_id`, most recently active first.
    pub async fn list_sessions(&self, owner_id: UserId) -> Result<Vec<Session>, ConversationError> {
        self.sessions
            .find_by_owner(&owner_id)
            .await
            .map_err(|e| ConversationError::storage(e, SavedProgress::Nothing))
    }

    /// Session and transcript, if `requester_id` owns it.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `Forbidden` if the requester is not the owner; no messages are read
    pub async fn get_session(
        &self,
        session_id: SessionId,
        requester_id: UserId,
    ) -> Result<SessionTranscript, ConversationError> {
        let session = self.load_authorized(session_id, requester_id).await?;
        let messages = self.load_transcript(&session_id).await?;
        Ok(SessionTranscript { session, messages })
    }

    /// Appends `text` as the owner and generates a reply to the full transcript.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed`, `NotFound`, `Forbidden` before anything is written
    /// - `Busy` if another write holds the session too long; nothing is written
    /// - `Storage` with `Nothing` or `UserMessage` saved
    /// - `Generation` with the user message saved
    pub async fn send_message(
        &self,
        session_id: SessionId,
        requester_id: UserId,
        text: &str,
    ) -> Result<SessionTranscript, ConversationError> {
        let deadline = self.deadline();
        let user_message = NewMessage::user(session_id, text)?;

        let _lease = self.lease(session_id).await?;

        let mut session = self.load_authorized(session_id, requester_id).await?;
        let mut messages = self.load_transcript(&session_id).await?;

        let user_message = self
            .messages
            .append(user_message)
            .await
            .map_err(|e| ConversationError::storage(e, SavedProgress::Nothing))?;
        tracing::debug!(
            session_id = %session_id,
            message_id = %user_message.id(),
            "User message appended"
        );

        self.record_user_message(&mut session, &user_message).await?;
        messages.push(user_message);
        self.generate_reply(session, messages, deadline).await
    }

    /// Generates the missing reply for a trailing orphan user message.
    ///
    /// # Errors
    ///
    /// - `NotFound`, `Forbidden` as for reads
    /// - `NoPendingMessage` if the transcript does not end with a user message
    /// - `Generation` / `Storage` with the orphan still saved
    pub async fn retry_generation(
        &self,
        session_id: SessionId,
        requester_id: UserId,
    ) -> Result<SessionTranscript, ConversationError> {
        let deadline = self.deadline();
        let _lease = self.lease(session_id).await?;

        let session = self.load_authorized(session_id, requester_id).await?;
        let messages = self.load_transcript(&session_id).await?;

        if transcript::pending_user_message(&messages).is_none() {
            return Err(ConversationError::NoPendingMessage(session_id));
        }
        tracing::info!(session_id = %session_id, "Retrying generation for unanswered message");

        self.generate_reply(session, messages, deadline).await
    }

    /// Renames a session owned by `requester_id`.
    pub async fn rename_session(
        &self,
        session_id: SessionId,
        requester_id: UserId,
        title: &str,
    ) -> Result<Session, ConversationError> {
        let title = Session::validate_title(title)?;
        let mut session = self.load_authorized(session_id, requester_id).await?;

        self.sessions
            .update_title(&session_id, &title)
            .await
            .map_err(|e| ConversationError::from_lookup(e, session_id))?;
        session.rename(&title)?;

        Ok(session)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Steps
    // ─────────────────────────────────────────────────────────────────────────

    fn deadline(&self) -> Instant {
        Instant::now() + self.settings.request_timeout
    }

    /// Waits for the session's lock, giving up while a full completion would
    /// still fit in the request budget.
    async fn lease(&self, session_id: SessionId) -> Result<SessionLease, ConversationError> {
        let wait = self.settings.lock_wait();
        match tokio::time::timeout(wait, self.locks.acquire(session_id)).await {
            Ok(lease) => Ok(lease),
            Err(_) => {
                tracing::warn!(
                    session_id = %session_id,
                    waited_ms = wait.as_millis() as u64,
                    "Gave up waiting for session lock"
                );
                Err(ConversationError::Busy(session_id))
            }
        }
    }

    /// Fetches a session and checks ownership. Never touches the message log.
    async fn load_authorized(
        &self,
        session_id: SessionId,
        requester_id: UserId,
    ) -> Result<Session, ConversationError> {
        let session = self
            .sessions
            .get(&session_id)
            .await
            .map_err(|e| ConversationError::from_lookup(e, session_id))?;

        if session.check_ownership(&requester_id).is_err() {
            tracing::warn!(
                session_id = %session_id,
                owner_id = %session.owner_id(),
                requester_id = %requester_id,
                "Rejected access to session not owned by requester"
            );
            return Err(ConversationError::Forbidden);
        }

        Ok(session)
    }

    async fn load_transcript(&self, session_id: &SessionId) -> Result<Vec<Message>, ConversationError> {
        self.messages
            .list_by_session(session_id)
            .await
            .map_err(|e| ConversationError::storage(e, SavedProgress::Nothing))
    }

    /// Bumps session activity after a user message is stored.
    async fn record_user_message(
        &self,
        session: &mut Session,
        message: &Message,
    ) -> Result<(), ConversationError> {
        let saved = SavedProgress::UserMessage {
            session_id: *session.id(),
            message_id: *message.id(),
        };
        self.sessions
            .touch(session.id(), *message.created_at())
            .await
            .map_err(|e| ConversationError::storage(e, saved))?;
        session.record_activity(*message.created_at());
        Ok(())
    }

    /// Completes `messages` (ending in a user message) and appends the reply.
    async fn generate_reply(
        &self,
        mut session: Session,
        mut messages: Vec<Message>,
        deadline: Instant,
    ) -> Result<SessionTranscript, ConversationError> {
        let session_id = *session.id();
        let saved = match transcript::pending_user_message(&messages) {
            Some(pending) => SavedProgress::UserMessage {
                session_id,
                message_id: *pending.id(),
            },
            None => return Err(ConversationError::NoPendingMessage(session_id)),
        };

        let started = Instant::now();
        let timeout = self
            .settings
            .completion_timeout
            .min(deadline.saturating_duration_since(started));
        let outcome = tokio::time::timeout(timeout, self.completions.complete(&messages, timeout))
            .await
            .unwrap_or_else(|_| Err(CompletionError::timeout(timeout)));

        let completion = match outcome {
            Ok(completion) if !completion.content.trim().is_empty() => completion,
            Ok(_) => return Err(self.generation_failed(CompletionError::NoCompletion, saved)),
            Err(err) => return Err(self.generation_failed(err, saved)),
        };
        tracing::debug!(
            session_id = %session_id,
            model = %completion.model,
            total_tokens = completion.usage.total_tokens,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Completion received"
        );

        let reply = NewMessage::assistant(session_id, completion.content)
            .map_err(ConversationError::from)?;
        let reply = self
            .messages
            .append(reply)
            .await
            .map_err(|e| ConversationError::storage(e, saved))?;

        // The exchange is complete at this point; a stale activity stamp only
        // affects list order.
        match self.sessions.touch(&session_id, *reply.created_at()).await {
            Ok(()) => session.record_activity(*reply.created_at()),
            Err(e) => tracing::warn!(
                session_id = %session_id,
                error = %e,
                "Failed to update session activity after reply"
            ),
        }

        messages.push(reply);
        Ok(SessionTranscript { session, messages })
    }

    fn generation_failed(&self, err: CompletionError, saved: SavedProgress) -> ConversationError {
        tracing::error!(
            session_id = ?saved.session_id(),
            user_message_id = ?saved.user_message_id(),
            client = %self.completions.client_info().name,
            error = %err,
            "Generation failed; user message kept"
        );
        ConversationError::generation(err, saved)
    }
}
