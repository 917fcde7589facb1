//! Chat Controller
//!
//! The streaming session state machine. Owns the active session's
//! transcript, the session registry, and the single in-flight streaming
//! connection, and reconciles three competing user actions — send, retry,
//! edit — against the token stream.
//!
//! All mutations happen on the controller's own task in reaction to
//! discrete events (user action, token, terminal event). Each transport
//! open is tagged with a monotonically increasing generation; events from
//! a superseded connection are dropped silently.

use crate::ports::context_reader::ContextReader;
use crate::ports::session_backend::{BackendError, SessionBackend};
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use crate::ports::transport::{ChatTransport, StreamHandle};
use chrono::Utc;
use parley_domain::{
    ContextSnapshot, DomainError, Message, Phase, SessionId, SessionRegistry, StreamEvent,
    Transcript,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Error surfaced when a stream dies without a structured payload
/// (connection drop, malformed event, missing terminal).
const STREAM_FAILURE_MESSAGE: &str = "Something went wrong while streaming the reply";

/// The in-flight streaming connection, tagged with its generation.
struct ActiveStream {
    generation: u64,
    handle: StreamHandle,
}

/// Streaming chat controller for one active session.
///
/// Phases: `Idle → Loading → Streaming → Idle` on success,
/// `Loading|Streaming → Erroring → Idle` on failure. At most one
/// connection is open at any instant; opening a new one unconditionally
/// closes the prior handle first.
///
/// Multiple controllers are independently constructible — there is no
/// shared global state.
pub struct ChatController {
    transport: Arc<dyn ChatTransport>,
    backend: Arc<dyn SessionBackend>,
    context_reader: Arc<dyn ContextReader>,
    logger: Arc<dyn TranscriptLogger>,

    session_id: SessionId,
    transcript: Transcript,
    registry: SessionRegistry,
    context: ContextSnapshot,

    phase: Phase,
    error: Option<String>,
    failed_indices: BTreeSet<usize>,
    editing_index: Option<usize>,

    active: Option<ActiveStream>,
    generation: u64,
}

impl ChatController {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        backend: Arc<dyn SessionBackend>,
        context_reader: Arc<dyn ContextReader>,
        session_id: SessionId,
    ) -> Self {
        Self {
            transport,
            backend,
            context_reader,
            logger: Arc::new(NoTranscriptLogger),
            session_id,
            transcript: Transcript::new(),
            registry: SessionRegistry::new(),
            context: ContextSnapshot::default(),
            phase: Phase::Idle,
            error: None,
            failed_indices: BTreeSet::new(),
            editing_index: None,
            active: None,
            generation: 0,
        }
    }

    /// Set a transcript logger for structured event logging.
    pub fn with_transcript_logger(mut self, logger: Arc<dyn TranscriptLogger>) -> Self {
        self.logger = logger;
        self
    }

    // -- Accessors --

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn context(&self) -> &ContextSnapshot {
        &self.context
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn is_streaming(&self) -> bool {
        self.phase == Phase::Streaming
    }

    /// True while a transport connection is open.
    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Session-level error from the most recent failed exchange.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn failed_indices(&self) -> &BTreeSet<usize> {
        &self.failed_indices
    }

    pub fn editing_index(&self) -> Option<usize> {
        self.editing_index
    }

    // -- Sending --

    /// Send a user message on the active session.
    ///
    /// Rejected (no state change) when `content` trims to empty. On
    /// accept: the user message and an empty assistant placeholder are
    /// appended immediately, the registry entry moves to the front, and a
    /// streaming request is opened. Returns once the request is issued,
    /// not when it completes.
    pub async fn send_message(&mut self, content: &str) -> bool {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            warn!("send rejected: {}", DomainError::EmptyContent);
            return false;
        }
        self.dispatch(trimmed.to_string()).await;
        true
    }

    /// Retry a previously failed user message.
    ///
    /// Valid only for user messages; anything else is a logged no-op.
    /// Truncates the transcript back to `index` (discarding the failed
    /// message and everything after it) and re-sends the original content
    /// byte-for-byte.
    pub async fn retry(&mut self, index: usize) -> bool {
        let content = match self.transcript.get(index) {
            Some(m) if m.is_user() => m.content.clone(),
            Some(_) => {
                error!("retry rejected: {}", DomainError::NotUserMessage(index));
                return false;
            }
            None => {
                error!("retry rejected: {}", DomainError::InvalidIndex(index));
                return false;
            }
        };

        // Indices at or after the truncation point no longer exist.
        self.failed_indices.retain(|&i| i < index);
        self.transcript.truncate(index);
        self.log_event(
            "message_retried",
            serde_json::json!({ "index": index, "content": content }),
        );
        self.dispatch(content).await;
        true
    }

    // -- Editing --

    /// Begin editing the user message at `index`.
    ///
    /// Rejected while an exchange is in flight or when the target is not
    /// a user message. Returns the exact original content for the edit
    /// buffer (no transformation).
    pub fn start_edit(&mut self, index: usize) -> Option<String> {
        if self.phase.is_busy() {
            warn!("edit rejected: {}", DomainError::ExchangeInFlight);
            return None;
        }
        match self.transcript.get(index) {
            Some(m) if m.is_user() => {
                self.editing_index = Some(index);
                Some(m.content.clone())
            }
            Some(_) => {
                warn!("edit rejected: {}", DomainError::NotUserMessage(index));
                None
            }
            None => {
                warn!("edit rejected: {}", DomainError::InvalidIndex(index));
                None
            }
        }
    }

    /// Replace the message at `index` and everything after it with a
    /// fresh exchange for `new_content` (trimmed).
    ///
    /// Rejects blank input. Prior assistant replies at or after `index`
    /// are discarded, as are failure marks for truncated messages.
    pub async fn save_edit(&mut self, index: usize, new_content: &str) -> bool {
        let trimmed = new_content.trim();
        if trimmed.is_empty() {
            warn!("edit rejected: {}", DomainError::EmptyContent);
            return false;
        }
        if index >= self.transcript.len() {
            warn!("edit rejected: {}", DomainError::InvalidIndex(index));
            return false;
        }
        self.editing_index = None;
        self.failed_indices.retain(|&i| i < index);
        self.transcript.truncate(index);
        self.log_event(
            "message_edited",
            serde_json::json!({ "index": index, "content": trimmed }),
        );
        self.dispatch(trimmed.to_string()).await;
        true
    }

    /// Abandon the current edit without touching message content.
    pub fn cancel_edit(&mut self) {
        self.editing_index = None;
    }

    // -- Session lifecycle --

    /// Switch to another session, replacing the transcript with its
    /// history (empty if the backend has none). Tears down any in-flight
    /// connection and resets all exchange state.
    pub async fn load_session(&mut self, target: &SessionId) -> Result<(), BackendError> {
        self.close_active();
        self.phase = Phase::Idle;
        self.error = None;
        self.failed_indices.clear();
        self.editing_index = None;
        self.session_id = target.clone();

        let history = match self.backend.get_messages(target).await {
            Ok(messages) => messages,
            Err(BackendError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };
        self.transcript.replace(history);
        self.refresh_context().await;
        Ok(())
    }

    /// Create a fresh session and make it active with empty state.
    pub async fn new_session(&mut self) -> SessionId {
        let id = self.create_backend_session().await;
        self.activate_empty(id.clone());
        id
    }

    /// Delete a session. If it was the active one, a brand-new session is
    /// created and becomes active with empty state.
    pub async fn delete_session(&mut self, target: &SessionId) {
        self.registry.remove(target);
        if let Err(e) = self.backend.delete_session(target).await {
            warn!("backend session delete failed: {}", e);
        }
        if *target == self.session_id {
            let id = self.create_backend_session().await;
            self.activate_empty(id);
        }
    }

    /// Replace the registry with the backend's session listing. The
    /// active session always keeps an entry.
    pub async fn refresh_sessions(&mut self) -> Result<(), BackendError> {
        let listing = self.backend.list_sessions().await?;
        self.registry.replace_all(listing);
        if self.registry.get(&self.session_id).is_none() {
            let id = self.session_id.clone();
            self.registry.touch(&id, Utc::now());
        }
        Ok(())
    }

    /// Drop the active session's messages on the backend and locally,
    /// keeping the session itself and its registry entry.
    pub async fn clear_active_session(&mut self) {
        self.close_active();
        if let Err(e) = self.backend.clear_session(&self.session_id).await {
            warn!("backend session clear failed: {}", e);
        }
        self.transcript.replace(Vec::new());
        self.phase = Phase::Idle;
        self.error = None;
        self.failed_indices.clear();
        self.editing_index = None;
    }

    /// Clear the session-level error without retrying anything.
    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // -- Stream consumption --

    /// Await the next event on the active stream and apply it.
    ///
    /// Returns the applied event, or `None` when no stream is active
    /// (including right after a terminal event has been applied). A
    /// channel that hangs up without a terminal event is treated as a
    /// transport failure.
    pub async fn next_stream_event(&mut self) -> Option<StreamEvent> {
        let generation = self.active.as_ref()?.generation;
        let event = match self.active.as_mut()?.handle.next_event().await {
            Some(event) => event,
            None => StreamEvent::Error { message: None },
        };
        let completed = event == StreamEvent::Done;
        self.apply_stream_event(generation, event.clone());
        if completed {
            self.refresh_context().await;
        }
        Some(event)
    }

    /// Apply one stream event delivered for `generation`.
    ///
    /// Events for any non-current generation (a superseded or closed
    /// connection) are dropped silently.
    pub fn apply_stream_event(&mut self, generation: u64, event: StreamEvent) {
        let current = self.active.as_ref().map(|a| a.generation);
        if current != Some(generation) {
            debug!(generation, "ignoring event from stale stream");
            return;
        }
        match event {
            StreamEvent::Token { content } => {
                if self.phase == Phase::Loading {
                    self.phase = Phase::Streaming;
                }
                // Strict arrival order: append to the trailing assistant
                // message, never reorder or deduplicate.
                if let Some(last) = self.transcript.last_mut() {
                    last.append(&content);
                }
            }
            StreamEvent::Done => self.finish_exchange(),
            StreamEvent::Error { message } => {
                let reason = message.unwrap_or_else(|| STREAM_FAILURE_MESSAGE.to_string());
                self.fail_exchange(reason);
            }
        }
    }

    // -- Internals --

    /// Open a streaming exchange for already-validated content.
    ///
    /// Shared by send, retry, and edit: appends the optimistic message
    /// pair, touches the registry, and opens the connection (closing any
    /// prior one first).
    async fn dispatch(&mut self, content: String) {
        self.close_active();
        self.editing_index = None;
        // A fresh exchange replaces any surfaced error
        self.error = None;

        let now = Utc::now();
        self.transcript.push(Message::user(content.clone(), now));
        self.transcript.push(Message::assistant_placeholder(now));
        let session = self.session_id.clone();
        self.registry.touch_with_message(&session, &content, now);
        self.log_event("message_sent", serde_json::json!({ "content": content }));

        self.phase = Phase::Loading;
        self.generation += 1;
        match self.transport.open(&session, &content).await {
            Ok(handle) => {
                self.active = Some(ActiveStream {
                    generation: self.generation,
                    handle,
                });
            }
            Err(e) => {
                debug!("transport open failed: {}", e);
                self.fail_exchange(e.to_string());
            }
        }
    }

    fn finish_exchange(&mut self) {
        self.close_active();
        let session = self.session_id.clone();
        self.registry.touch(&session, Utc::now());
        let reply_len = self.transcript.last().map(|m| m.content.len()).unwrap_or(0);
        self.log_event(
            "turn_completed",
            serde_json::json!({ "reply_bytes": reply_len }),
        );
        self.phase = Phase::Idle;
    }

    fn fail_exchange(&mut self, reason: String) {
        self.phase = Phase::Erroring;
        self.close_active();
        self.transcript.pop_empty_assistant_tail();
        if let Some(index) = self.transcript.last_user_index() {
            if let Some(message) = self.transcript.get_mut(index) {
                message.mark_failed(reason.clone());
            }
            self.failed_indices.insert(index);
        }
        self.log_event("turn_failed", serde_json::json!({ "reason": reason }));
        self.error = Some(reason);
        self.phase = Phase::Idle;
    }

    fn close_active(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.handle.close();
        }
    }

    async fn create_backend_session(&self) -> SessionId {
        match self.backend.create_session().await {
            Ok(id) => id,
            Err(e) => {
                warn!("backend session create failed, minting local id: {}", e);
                SessionId::generate()
            }
        }
    }

    fn activate_empty(&mut self, id: SessionId) {
        self.close_active();
        self.session_id = id.clone();
        self.transcript.replace(Vec::new());
        self.context = ContextSnapshot::default();
        self.phase = Phase::Idle;
        self.error = None;
        self.failed_indices.clear();
        self.editing_index = None;
        self.registry.touch(&id, Utc::now());
    }

    /// Refresh the context mirror. Failure is supplementary: logged,
    /// never surfaced, never blocks the exchange.
    async fn refresh_context(&mut self) {
        match self.context_reader.get_context(&self.session_id).await {
            Ok(snapshot) => self.context = snapshot,
            Err(e) => warn!("context refresh failed: {}", e),
        }
    }

    fn log_event(&self, event_type: &'static str, payload: serde_json::Value) {
        self.logger.log(TranscriptEvent::new(
            event_type,
            self.session_id.to_string(),
            payload,
        ));
    }
}
