//! Context query port
//!
//! Read access to the backend's per-session conversation memory. Failures
//! here are supplementary by design — callers log and move on.

use async_trait::async_trait;
use parley_domain::{ContextSnapshot, SessionId};

use super::session_backend::BackendError;

/// Reader for the backend's conversation memory.
#[async_trait]
pub trait ContextReader: Send + Sync {
    /// Current context snapshot for a session.
    async fn get_context(&self, id: &SessionId) -> Result<ContextSnapshot, BackendError>;
}
