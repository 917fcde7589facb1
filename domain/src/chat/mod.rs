//! Conversation domain.
//!
//! - [`entities::Message`] — a single message within a session
//! - [`transcript::Transcript`] — the ordered message store for one session
//! - [`registry::SessionRegistry`] — session summaries ordered by activity
//! - [`stream::StreamEvent`] — incremental events of a streaming response
//! - [`phase::Phase`] — lifecycle phase of the active exchange

pub mod entities;
pub mod phase;
pub mod registry;
pub mod stream;
pub mod transcript;
