//! Ordered message store for one session.

use super::entities::{Message, Role};

/// The ordered message sequence of the active session.
///
/// Append-only by default; truncation happens only through retry and edit
/// flows. Within the sequence an assistant message is always preceded by
/// the user message it answers, and at most one assistant message is
/// actively growing at a time.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Message> {
        self.messages.get_mut(index)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut Message> {
        self.messages.last_mut()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drop every message at or after `len`.
    pub fn truncate(&mut self, len: usize) {
        self.messages.truncate(len);
    }

    /// Replace the full contents (session load).
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    /// Index of the most recent user message, if any.
    pub fn last_user_index(&self) -> Option<usize> {
        self.messages.iter().rposition(|m| m.role == Role::User)
    }

    /// Remove a trailing assistant message if its content is still empty.
    ///
    /// Returns true if a placeholder was removed.
    pub fn pop_empty_assistant_tail(&mut self) -> bool {
        match self.messages.last() {
            Some(m) if m.role == Role::Assistant && m.content.is_empty() => {
                self.messages.pop();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(content: &str) -> Message {
        Message::user(content, Utc::now())
    }

    #[test]
    fn push_and_truncate() {
        let mut transcript = Transcript::new();
        transcript.push(user("A"));
        transcript.push(Message::assistant("B", Utc::now()));
        transcript.push(user("C"));
        assert_eq!(transcript.len(), 3);

        transcript.truncate(1);
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.get(0).unwrap().content, "A");

        // Truncating beyond the current length is a no-op
        transcript.truncate(10);
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn last_user_index_skips_assistant_tail() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.last_user_index(), None);

        transcript.push(user("A"));
        transcript.push(Message::assistant_placeholder(Utc::now()));
        assert_eq!(transcript.last_user_index(), Some(0));

        transcript.push(user("C"));
        assert_eq!(transcript.last_user_index(), Some(2));
    }

    #[test]
    fn pop_empty_assistant_tail_only_removes_placeholders() {
        let mut transcript = Transcript::new();
        transcript.push(user("A"));
        transcript.push(Message::assistant_placeholder(Utc::now()));
        assert!(transcript.pop_empty_assistant_tail());
        assert_eq!(transcript.len(), 1);

        // Non-empty assistant content stays
        transcript.push(Message::assistant("partial", Utc::now()));
        assert!(!transcript.pop_empty_assistant_tail());
        assert_eq!(transcript.len(), 2);

        // A trailing user message stays
        transcript.push(user("B"));
        assert!(!transcript.pop_empty_assistant_tail());
        assert_eq!(transcript.len(), 3);
    }

    #[test]
    fn replace_swaps_history() {
        let mut transcript = Transcript::new();
        transcript.push(user("old"));

        transcript.replace(vec![user("new1"), user("new2")]);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.get(0).unwrap().content, "new1");

        transcript.replace(Vec::new());
        assert!(transcript.is_empty());
    }
}
