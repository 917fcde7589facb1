//! Conversation message entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Delivery status of a user message.
///
/// Only user messages carry a status. `Failed` marks a message whose
/// exchange terminated with an error; it stays visible until retried,
/// edited, or the session is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Failed,
}

/// A message in a conversation (Entity)
///
/// Assistant messages start with empty content and grow monotonically as
/// token fragments are appended. `timestamp` is immutable once set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    /// Human-readable failure reason, present iff `status == Some(Failed)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp,
            status: None,
            error: None,
        }
    }

    /// Empty assistant message inserted optimistically before any token
    /// arrives.
    pub fn assistant_placeholder(timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            timestamp,
            status: None,
            error: None,
        }
    }

    pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp,
            status: None,
            error: None,
        }
    }

    /// Append a token fragment to the content.
    pub fn append(&mut self, fragment: &str) {
        self.content.push_str(fragment);
    }

    /// Mark this message failed with the given reason.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = Some(MessageStatus::Failed);
        self.error = Some(reason.into());
    }

    /// Clear a previous failure mark.
    pub fn clear_failure(&mut self) {
        self.status = None;
        self.error = None;
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }

    pub fn is_failed(&self) -> bool {
        self.status == Some(MessageStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_starts_empty() {
        let msg = Message::assistant_placeholder(Utc::now());
        assert!(msg.content.is_empty());
        assert!(msg.is_assistant());
        assert!(!msg.is_failed());
    }

    #[test]
    fn append_grows_content() {
        let mut msg = Message::assistant_placeholder(Utc::now());
        msg.append("Hi");
        msg.append(" there");
        assert_eq!(msg.content, "Hi there");
    }

    #[test]
    fn mark_failed_sets_status_and_reason() {
        let mut msg = Message::user("hello", Utc::now());
        msg.mark_failed("boom");
        assert!(msg.is_failed());
        assert_eq!(msg.error.as_deref(), Some("boom"));

        msg.clear_failure();
        assert!(!msg.is_failed());
        assert!(msg.error.is_none());
    }

    #[test]
    fn serde_roundtrip_omits_empty_status() {
        let msg = Message::user("hello", Utc::now());
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("status").is_none());
        assert!(json.get("error").is_none());
        assert_eq!(json["role"], "user");
    }
}
