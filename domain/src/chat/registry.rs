//! Session registry ordered by most recent activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::id::SessionId;
use crate::core::string::preview_of;

/// Maximum preview length in characters.
pub const PREVIEW_MAX_CHARS: usize = 100;

/// Sidebar summary of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique session identifier.
    pub id: SessionId,
    /// First user message's content, truncated to 100 characters.
    /// Empty until a first message is sent; set at most once.
    pub preview: String,
    /// Last-activity time.
    pub timestamp: DateTime<Utc>,
    /// Incremented once per user turn; never decreases.
    pub message_count: u32,
}

impl SessionSummary {
    pub fn new(id: SessionId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            preview: String::new(),
            timestamp,
            message_count: 0,
        }
    }
}

/// Ordered list of session summaries, most recently active at index 0.
///
/// Every mutation that "touches" a session is a single total-order
/// move-to-front: remove the entry if present, update its fields, reinsert
/// at index 0. There is no secondary sort key.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    entries: Vec<SessionSummary>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[SessionSummary] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &SessionId) -> Option<&SessionSummary> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn position(&self, id: &SessionId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    /// Move the session to index 0 and update its activity timestamp,
    /// synthesizing a fresh entry if the id is not present.
    pub fn touch(&mut self, id: &SessionId, now: DateTime<Utc>) {
        let mut entry = self.take_or_create(id, now);
        entry.timestamp = now;
        self.entries.insert(0, entry);
    }

    /// Touch for a sent user message: move-to-front, bump the turn count,
    /// and set the preview from `content` if no preview exists yet (first
    /// non-empty value wins, never overwritten).
    pub fn touch_with_message(&mut self, id: &SessionId, content: &str, now: DateTime<Utc>) {
        let mut entry = self.take_or_create(id, now);
        entry.timestamp = now;
        entry.message_count += 1;
        if entry.preview.is_empty() && !content.is_empty() {
            entry.preview = preview_of(content, PREVIEW_MAX_CHARS);
        }
        self.entries.insert(0, entry);
    }

    /// Remove the entry for `id`. Returns true if one was removed.
    pub fn remove(&mut self, id: &SessionId) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Replace the full registry contents (backend listing).
    pub fn replace_all(&mut self, entries: Vec<SessionSummary>) {
        self.entries = entries;
    }

    fn take_or_create(&mut self, id: &SessionId, now: DateTime<Utc>) -> SessionSummary {
        match self.position(id) {
            Some(pos) => self.entries.remove(pos),
            None => SessionSummary::new(id.clone(), now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(s: &str) -> SessionId {
        SessionId::new(s)
    }

    #[test]
    fn touch_inserts_new_entry_at_front() {
        let mut registry = SessionRegistry::new();
        registry.touch(&sid("s1"), Utc::now());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries()[0].id, sid("s1"));
        assert!(registry.entries()[0].preview.is_empty());
        assert_eq!(registry.entries()[0].message_count, 0);
    }

    #[test]
    fn touch_moves_existing_entry_to_front() {
        let mut registry = SessionRegistry::new();
        registry.touch(&sid("s1"), Utc::now());
        registry.touch(&sid("s2"), Utc::now());
        registry.touch(&sid("s3"), Utc::now());
        assert_eq!(registry.entries()[0].id, sid("s3"));

        registry.touch(&sid("s1"), Utc::now());
        assert_eq!(registry.entries()[0].id, sid("s1"));
        assert_eq!(registry.entries()[1].id, sid("s3"));
        assert_eq!(registry.entries()[2].id, sid("s2"));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn preview_first_nonempty_wins() {
        let mut registry = SessionRegistry::new();
        registry.touch_with_message(&sid("s1"), "Hello", Utc::now());
        assert_eq!(registry.entries()[0].preview, "Hello");
        assert_eq!(registry.entries()[0].message_count, 1);

        registry.touch_with_message(&sid("s1"), "Second message", Utc::now());
        assert_eq!(registry.entries()[0].preview, "Hello");
        assert_eq!(registry.entries()[0].message_count, 2);
    }

    #[test]
    fn preview_truncated_to_100_chars() {
        let mut registry = SessionRegistry::new();
        let long = "x".repeat(250);
        registry.touch_with_message(&sid("s1"), &long, Utc::now());
        assert_eq!(registry.entries()[0].preview.chars().count(), 100);
    }

    #[test]
    fn touch_with_message_does_not_alter_other_sessions() {
        let mut registry = SessionRegistry::new();
        registry.touch_with_message(&sid("s1"), "one", Utc::now());
        registry.touch_with_message(&sid("s1"), "two", Utc::now());
        registry.touch_with_message(&sid("s1"), "three", Utc::now());
        registry.touch_with_message(&sid("s2"), "only", Utc::now());

        // Sending on s2 moved it to front without changing s1
        assert_eq!(registry.entries()[0].id, sid("s2"));
        let s1 = registry.get(&sid("s1")).unwrap();
        assert_eq!(s1.message_count, 3);
        assert_eq!(s1.preview, "one");
    }

    #[test]
    fn remove_entry() {
        let mut registry = SessionRegistry::new();
        registry.touch(&sid("s1"), Utc::now());
        registry.touch(&sid("s2"), Utc::now());

        assert!(registry.remove(&sid("s1")));
        assert_eq!(registry.len(), 1);
        assert!(!registry.remove(&sid("s1")));
    }
}
