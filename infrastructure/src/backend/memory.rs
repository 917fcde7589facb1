//! Self-contained in-memory backend.
//!
//! Stands in for the agent server when no backend URL is configured:
//! sessions live in a process-local map and the "agent" echoes the user's
//! message back as a token stream. Useful for offline runs and as a
//! realistic test double for the full port surface.

use async_trait::async_trait;
use chrono::Utc;
use parley_application::ports::context_reader::ContextReader;
use parley_application::ports::session_backend::{BackendError, SessionBackend};
use parley_application::ports::transport::{ChatTransport, StreamHandle, TransportError};
use parley_domain::chat::registry::PREVIEW_MAX_CHARS;
use parley_domain::{
    ContextSnapshot, Message, SessionId, SessionSummary, StreamEvent, preview_of,
};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;

struct StoredSession {
    messages: Vec<Message>,
    summary: SessionSummary,
}

impl StoredSession {
    fn new(id: SessionId) -> Self {
        Self {
            messages: Vec::new(),
            summary: SessionSummary::new(id, Utc::now()),
        }
    }
}

/// In-memory session store with an echoing agent.
#[derive(Default)]
pub struct InMemoryBackend {
    sessions: Mutex<HashMap<SessionId, StoredSession>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The canned assistant reply for `content`.
    fn reply_for(content: &str) -> String {
        format!("You said: {}", content)
    }
}

#[async_trait]
impl SessionBackend for InMemoryBackend {
    async fn create_session(&self) -> Result<SessionId, BackendError> {
        let id = SessionId::generate();
        self.sessions
            .lock()
            .unwrap()
            .insert(id.clone(), StoredSession::new(id.clone()));
        Ok(id)
    }

    async fn get_messages(&self, id: &SessionId) -> Result<Vec<Message>, BackendError> {
        self.sessions
            .lock()
            .unwrap()
            .get(id)
            .map(|s| s.messages.clone())
            .ok_or_else(|| BackendError::NotFound(id.clone()))
    }

    async fn clear_session(&self, id: &SessionId) -> Result<(), BackendError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(id) {
            Some(session) => {
                session.messages.clear();
                Ok(())
            }
            None => Err(BackendError::NotFound(id.clone())),
        }
    }

    async fn delete_session(&self, id: &SessionId) -> Result<(), BackendError> {
        match self.sessions.lock().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(BackendError::NotFound(id.clone())),
        }
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, BackendError> {
        let sessions = self.sessions.lock().unwrap();
        let mut summaries: Vec<SessionSummary> =
            sessions.values().map(|s| s.summary.clone()).collect();
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(summaries)
    }
}

#[async_trait]
impl ChatTransport for InMemoryBackend {
    async fn open(
        &self,
        session: &SessionId,
        content: &str,
    ) -> Result<StreamHandle, TransportError> {
        let reply = Self::reply_for(content);
        let now = Utc::now();

        {
            let mut sessions = self.sessions.lock().unwrap();
            // Tolerate ids minted locally while the backend was unreachable
            let stored = sessions
                .entry(session.clone())
                .or_insert_with(|| StoredSession::new(session.clone()));
            stored.messages.push(Message::user(content, now));
            stored.messages.push(Message::assistant(reply.clone(), now));
            stored.summary.timestamp = now;
            stored.summary.message_count += 1;
            if stored.summary.preview.is_empty() && !content.is_empty() {
                stored.summary.preview = preview_of(content, PREVIEW_MAX_CHARS);
            }
        }

        // Word-by-word token stream, then done. Pre-filled so no reader
        // task is needed.
        let fragments: Vec<&str> = reply.split_inclusive(' ').collect();
        let (tx, rx) = mpsc::channel(fragments.len() + 1);
        for fragment in fragments {
            let _ = tx.try_send(StreamEvent::token(fragment));
        }
        let _ = tx.try_send(StreamEvent::Done);
        Ok(StreamHandle::new(rx))
    }
}

#[async_trait]
impl ContextReader for InMemoryBackend {
    async fn get_context(&self, id: &SessionId) -> Result<ContextSnapshot, BackendError> {
        let sessions = self.sessions.lock().unwrap();
        let stored = sessions
            .get(id)
            .ok_or_else(|| BackendError::NotFound(id.clone()))?;

        let user_messages: Vec<&Message> =
            stored.messages.iter().filter(|m| m.is_user()).collect();
        let search_query = user_messages.last().map(|m| m.content.clone());

        // Capitalized words from recent user messages, oldest first
        let mut recent_entities = Vec::new();
        for message in user_messages.iter().rev().take(3).rev() {
            for word in message.content.split_whitespace() {
                let word = word.trim_matches(|c: char| !c.is_alphanumeric());
                if word.chars().next().is_some_and(|c| c.is_uppercase())
                    && !recent_entities.contains(&word.to_string())
                {
                    recent_entities.push(word.to_string());
                }
            }
        }

        Ok(ContextSnapshot {
            location: None,
            search_query,
            recent_entities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_list_and_delete() {
        let backend = InMemoryBackend::new();
        let a = backend.create_session().await.unwrap();
        let b = backend.create_session().await.unwrap();
        assert_ne!(a, b);

        let listing = backend.list_sessions().await.unwrap();
        assert_eq!(listing.len(), 2);

        backend.delete_session(&a).await.unwrap();
        assert_eq!(backend.list_sessions().await.unwrap().len(), 1);
        assert!(matches!(
            backend.get_messages(&a).await,
            Err(BackendError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn stream_echoes_content_word_by_word() {
        let backend = InMemoryBackend::new();
        let id = backend.create_session().await.unwrap();

        let mut handle = backend.open(&id, "hello there").await.unwrap();
        let mut assembled = String::new();
        loop {
            match handle.next_event().await {
                Some(StreamEvent::Token { content }) => assembled.push_str(&content),
                Some(StreamEvent::Done) => break,
                other => panic!("unexpected event: {:?}", other),
            }
        }
        assert_eq!(assembled, "You said: hello there");

        // The exchange was persisted
        let messages = backend.get_messages(&id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hello there");
        assert_eq!(messages[1].content, "You said: hello there");
    }

    #[tokio::test]
    async fn summaries_track_previews_and_counts() {
        let backend = InMemoryBackend::new();
        let id = backend.create_session().await.unwrap();

        backend.open(&id, "First question").await.unwrap();
        backend.open(&id, "Second question").await.unwrap();

        let listing = backend.list_sessions().await.unwrap();
        assert_eq!(listing[0].preview, "First question");
        assert_eq!(listing[0].message_count, 2);
    }

    #[tokio::test]
    async fn clear_keeps_session_but_drops_messages() {
        let backend = InMemoryBackend::new();
        let id = backend.create_session().await.unwrap();
        backend.open(&id, "hi").await.unwrap();

        backend.clear_session(&id).await.unwrap();
        assert!(backend.get_messages(&id).await.unwrap().is_empty());
        assert_eq!(backend.list_sessions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn context_reflects_recent_user_messages() {
        let backend = InMemoryBackend::new();
        let id = backend.create_session().await.unwrap();
        backend.open(&id, "Best ramen near Shibuya Station").await.unwrap();

        let context = backend.get_context(&id).await.unwrap();
        assert_eq!(
            context.search_query.as_deref(),
            Some("Best ramen near Shibuya Station")
        );
        assert!(context.recent_entities.contains(&"Shibuya".to_string()));
    }
}
