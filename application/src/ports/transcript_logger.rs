//! Port for structured transcript logging.
//!
//! Defines the [`TranscriptLogger`] trait for recording chat turn events
//! (sends, completions, failures, retries, edits) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures the conversation
//! flow in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured transcript event for logging.
pub struct TranscriptEvent {
    /// Event type identifier (e.g., "message_sent", "turn_completed").
    pub event_type: &'static str,
    /// Session the event belongs to.
    pub session_id: String,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl TranscriptEvent {
    pub fn new(event_type: &'static str, session_id: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type,
            session_id: session_id.into(),
            payload,
        }
    }
}

/// Port for logging transcript events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL
/// line). The `log` method is intentionally synchronous and non-fallible
/// to avoid disrupting the main flow — logging failures are silently
/// ignored.
pub trait TranscriptLogger: Send + Sync {
    /// Record a transcript event.
    fn log(&self, event: TranscriptEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoTranscriptLogger;

impl TranscriptLogger for NoTranscriptLogger {
    fn log(&self, _event: TranscriptEvent) {}
}
