//! Session lifecycle port
//!
//! Defines the interface to the backend's session store: creation,
//! history retrieval, clearing, deletion, and listing.

use async_trait::async_trait;
use parley_domain::{Message, SessionId, SessionSummary};
use thiserror::Error;

/// Errors that can occur during backend operations
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Backend session store
///
/// This port defines how the application layer manages session lifecycle.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Create a new session and return its opaque id.
    async fn create_session(&self) -> Result<SessionId, BackendError>;

    /// Ordered message history for a session.
    async fn get_messages(&self, id: &SessionId) -> Result<Vec<Message>, BackendError>;

    /// Drop a session's messages, keeping the session itself.
    async fn clear_session(&self, id: &SessionId) -> Result<(), BackendError>;

    /// Delete a session entirely.
    async fn delete_session(&self, id: &SessionId) -> Result<(), BackendError>;

    /// Summaries of all sessions, most recently active first.
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError>;
}
