//! HTTP adapter for the agent backend.
//!
//! Sessions and context are plain JSON endpoints; the streaming exchange
//! is a POST whose response body is newline-delimited JSON, one
//! [`StreamEvent`] per line. A background reader task forwards decoded
//! events into the [`StreamHandle`] channel and stops at the first
//! terminal event.

use async_trait::async_trait;
use futures::StreamExt;
use parley_application::ports::context_reader::ContextReader;
use parley_application::ports::session_backend::{BackendError, SessionBackend};
use parley_application::ports::transport::{ChatTransport, StreamHandle, TransportError};
use parley_domain::{ContextSnapshot, Message, SessionId, SessionSummary, StreamEvent};
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::debug;

/// Buffered events per stream before backpressure kicks in.
const STREAM_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    id: String,
}

/// Agent backend reached over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create an adapter for the server at `base_url` (no trailing slash
    /// required).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Use a pre-configured client (timeouts, proxies).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn map_status(id: &SessionId, status: StatusCode) -> Option<BackendError> {
        match status {
            StatusCode::NOT_FOUND => Some(BackendError::NotFound(id.clone())),
            s if s.is_success() => None,
            s => Some(BackendError::RequestFailed(format!("status {}", s))),
        }
    }
}

/// Decode one NDJSON line into a stream event.
///
/// Blank lines (keepalives) yield `None`. Anything that fails to parse
/// becomes an `Error` event with no message — the controller substitutes
/// its generic failure text.
fn decode_line(line: &[u8]) -> Option<StreamEvent> {
    let Ok(text) = std::str::from_utf8(line) else {
        return Some(StreamEvent::Error { message: None });
    };
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<StreamEvent>(text) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!("malformed stream line: {}", e);
            Some(StreamEvent::Error { message: None })
        }
    }
}

#[async_trait]
impl SessionBackend for HttpBackend {
    async fn create_session(&self) -> Result<SessionId, BackendError> {
        let response = self
            .client
            .post(self.url("/api/sessions"))
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;
        let body: CreateSessionResponse = response
            .error_for_status()
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        Ok(SessionId::new(body.id))
    }

    async fn get_messages(&self, id: &SessionId) -> Result<Vec<Message>, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/api/sessions/{}/messages", id)))
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;
        if let Some(err) = Self::map_status(id, response.status()) {
            return Err(err);
        }
        response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    async fn clear_session(&self, id: &SessionId) -> Result<(), BackendError> {
        let response = self
            .client
            .post(self.url(&format!("/api/sessions/{}/clear", id)))
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;
        match Self::map_status(id, response.status()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn delete_session(&self, id: &SessionId) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/sessions/{}", id)))
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;
        match Self::map_status(id, response.status()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError> {
        let response = self
            .client
            .get(self.url("/api/sessions"))
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;
        response
            .error_for_status()
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ChatTransport for HttpBackend {
    async fn open(
        &self,
        session: &SessionId,
        content: &str,
    ) -> Result<StreamHandle, TransportError> {
        let response = self
            .client
            .post(self.url(&format!("/api/sessions/{}/stream", session)))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .map_err(|e| TransportError::ConnectionError(e.to_string()))?
            .error_for_status()
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            let mut body = response.bytes_stream();
            let mut buffer: Vec<u8> = Vec::new();
            while let Some(chunk) = body.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        debug!("stream body error: {}", e);
                        let _ = tx.send(StreamEvent::Error { message: None }).await;
                        return;
                    }
                };
                buffer.extend_from_slice(&bytes);
                while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    let Some(event) = decode_line(&line) else {
                        continue;
                    };
                    let terminal = event.is_terminal();
                    if tx.send(event).await.is_err() {
                        // Receiver closed — the exchange was superseded
                        return;
                    }
                    if terminal {
                        return;
                    }
                }
            }
            // Trailing line without newline, then hangup
            if let Some(event) = decode_line(&buffer) {
                let terminal = event.is_terminal();
                if tx.send(event).await.is_err() || terminal {
                    return;
                }
            }
            // Connection ended without a terminal event
            let _ = tx.send(StreamEvent::Error { message: None }).await;
        });

        Ok(StreamHandle::new(rx))
    }
}

#[async_trait]
impl ContextReader for HttpBackend {
    async fn get_context(&self, id: &SessionId) -> Result<ContextSnapshot, BackendError> {
        let response = self
            .client
            .get(self.url(&format!("/api/sessions/{}/context", id)))
            .send()
            .await
            .map_err(|e| BackendError::RequestFailed(e.to_string()))?;
        if let Some(err) = Self::map_status(id, response.status()) {
            return Err(err);
        }
        response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_token_line() {
        let event = decode_line(br#"{"type":"token","content":"Hi"}"#).unwrap();
        assert_eq!(event, StreamEvent::token("Hi"));
    }

    #[test]
    fn decode_terminal_lines() {
        assert_eq!(decode_line(br#"{"type":"done"}"#), Some(StreamEvent::Done));
        assert_eq!(
            decode_line(br#"{"type":"error","message":"boom"}"#),
            Some(StreamEvent::Error {
                message: Some("boom".to_string())
            })
        );
        assert_eq!(
            decode_line(br#"{"type":"error"}"#),
            Some(StreamEvent::Error { message: None })
        );
    }

    #[test]
    fn blank_lines_are_keepalives() {
        assert_eq!(decode_line(b""), None);
        assert_eq!(decode_line(b"   \n"), None);
    }

    #[test]
    fn malformed_lines_become_generic_errors() {
        assert_eq!(
            decode_line(b"not json at all"),
            Some(StreamEvent::Error { message: None })
        );
        assert_eq!(
            decode_line(br#"{"type":"mystery"}"#),
            Some(StreamEvent::Error { message: None })
        );
        // Invalid UTF-8 is malformed too
        assert_eq!(
            decode_line(&[0xff, 0xfe]),
            Some(StreamEvent::Error { message: None })
        );
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let backend = HttpBackend::new("http://localhost:8787/");
        assert_eq!(
            backend.url("/api/sessions"),
            "http://localhost:8787/api/sessions"
        );
    }
}
