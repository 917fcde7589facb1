//! Streaming transport port
//!
//! Defines the interface for opening one-shot streaming requests against
//! the agent backend.

use async_trait::async_trait;
use parley_domain::{SessionId, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur when opening or reading a stream
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Transport closed")]
    Closed,
}

/// Handle for receiving streaming events from one exchange.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. The sender side emits, in
/// strict order, zero or more `Token` events followed by exactly one
/// terminal event (`Done` or `Error`), then hangs up. Closing is
/// idempotent and safe after termination; events produced after close are
/// discarded by the channel.
pub struct StreamHandle {
    receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Await the next event, or `None` once the sender has hung up.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Stop accepting further events. Idempotent.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

/// Transport adapter opening one streaming request per (session, message).
///
/// The caller never issues a second `open` for the same session while a
/// prior handle is unterminated and not yet closed.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Establish a one-shot streaming request for `content` on `session`.
    async fn open(
        &self,
        session: &SessionId,
        content: &str,
    ) -> Result<StreamHandle, TransportError>;
}
