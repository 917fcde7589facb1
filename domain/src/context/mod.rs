//! Server-maintained conversation context.
//!
//! The agent backend keeps auxiliary memory per session (location, current
//! topic, recently mentioned entities) which the client mirrors for
//! display. The mirror is read-mostly: it is refreshed after completed
//! exchanges and its staleness is never an error.

use serde::{Deserialize, Serialize};

/// One snapshot of the backend's conversation memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextSnapshot {
    /// Location the conversation is currently anchored to, if any.
    pub location: Option<String>,
    /// The active search query or topic.
    pub search_query: Option<String>,
    /// Recently mentioned entities, most recent last.
    pub recent_entities: Vec<String>,
}

impl ContextSnapshot {
    /// True when the backend has recorded nothing yet.
    pub fn is_empty(&self) -> bool {
        self.location.is_none() && self.search_query.is_none() && self.recent_entities.is_empty()
    }
}
