//! Streaming events for assistant responses.
//!
//! [`StreamEvent`] represents individual events of one streaming exchange:
//! zero or more `Token` fragments followed by exactly one terminal event
//! (`Done` or `Error`). The serde representation matches the wire shape
//! emitted by the agent backend, so transport adapters can deserialize
//! lines directly into this type.

use serde::{Deserialize, Serialize};

/// An event in a streaming assistant response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    /// One incremental fragment of the assistant's response.
    Token { content: String },
    /// The exchange completed successfully (terminal).
    Done,
    /// The exchange failed (terminal). `message` may be absent for
    /// transport-level failures with no structured payload.
    Error { message: Option<String> },
}

impl StreamEvent {
    pub fn token(content: impl Into<String>) -> Self {
        StreamEvent::Token {
            content: content.into(),
        }
    }

    /// Returns the fragment text if this is a `Token` event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Token { content } => Some(content),
            _ => None,
        }
    }

    /// Returns true if this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_text_returns_fragment() {
        let event = StreamEvent::token("hello");
        assert_eq!(event.text(), Some("hello"));
        assert!(!event.is_terminal());
    }

    #[test]
    fn done_is_terminal() {
        let event = StreamEvent::Done;
        assert_eq!(event.text(), None);
        assert!(event.is_terminal());
    }

    #[test]
    fn error_is_terminal_with_optional_message() {
        let event = StreamEvent::Error {
            message: Some("oops".to_string()),
        };
        assert!(event.is_terminal());

        let bare = StreamEvent::Error { message: None };
        assert!(bare.is_terminal());
    }

    #[test]
    fn wire_shape_roundtrip() {
        let token: StreamEvent = serde_json::from_str(r#"{"type":"token","content":"Hi"}"#).unwrap();
        assert_eq!(token, StreamEvent::token("Hi"));

        let done: StreamEvent = serde_json::from_str(r#"{"type":"done"}"#).unwrap();
        assert_eq!(done, StreamEvent::Done);

        let error: StreamEvent =
            serde_json::from_str(r#"{"type":"error","message":"boom"}"#).unwrap();
        assert_eq!(
            error,
            StreamEvent::Error {
                message: Some("boom".to_string())
            }
        );
    }
}
