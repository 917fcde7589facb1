//! Console output formatter for transcripts, session lists, and context

use colored::Colorize;
use parley_domain::{
    ContextSnapshot, Message, Role, SessionId, SessionRegistry, Transcript, truncate_str,
};

/// Formats chat state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format one message with its transcript index.
    pub fn format_message(index: usize, message: &Message) -> String {
        let label = match message.role {
            Role::User => "You".cyan().bold(),
            Role::Assistant => "Agent".green().bold(),
        };
        let mut line = format!("[{}] {}: {}", index, label, message.content);
        if message.is_failed() {
            let reason = message.error.as_deref().unwrap_or("failed");
            line.push_str(&format!("  {} {}", "✗".red().bold(), reason.red()));
        }
        line
    }

    /// Format the full transcript, one message per line.
    pub fn format_transcript(transcript: &Transcript) -> String {
        if transcript.is_empty() {
            return "No messages yet.".dimmed().to_string();
        }
        transcript
            .messages()
            .iter()
            .enumerate()
            .map(|(i, m)| Self::format_message(i, m))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format the session list, most recent first, marking the active
    /// session.
    pub fn format_sessions(registry: &SessionRegistry, active: &SessionId) -> String {
        if registry.is_empty() {
            return "No sessions.".dimmed().to_string();
        }
        registry
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let marker = if &entry.id == active { "*" } else { " " };
                let preview = if entry.preview.is_empty() {
                    "(empty)".dimmed().to_string()
                } else {
                    truncate_str(&entry.preview, 60)
                };
                format!(
                    "{} {}. {}  {}",
                    marker,
                    i + 1,
                    preview,
                    format!("({} turns)", entry.message_count).dimmed()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format the context panel.
    pub fn format_context(context: &ContextSnapshot) -> String {
        if context.is_empty() {
            return "No context recorded yet.".dimmed().to_string();
        }
        let mut lines = Vec::new();
        if let Some(location) = &context.location {
            lines.push(format!("{} {}", "Location:".cyan().bold(), location));
        }
        if let Some(query) = &context.search_query {
            lines.push(format!("{} {}", "Topic:".cyan().bold(), query));
        }
        if !context.recent_entities.is_empty() {
            lines.push(format!(
                "{} {}",
                "Entities:".cyan().bold(),
                context.recent_entities.join(", ")
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn failed_message_shows_reason() {
        plain();
        let mut message = Message::user("hello", Utc::now());
        message.mark_failed("boom");
        let line = ConsoleFormatter::format_message(0, &message);
        assert!(line.contains("hello"));
        assert!(line.contains("boom"));
    }

    #[test]
    fn session_list_marks_active() {
        plain();
        let mut registry = SessionRegistry::new();
        registry.touch_with_message(&SessionId::new("a"), "first question", Utc::now());
        registry.touch(&SessionId::new("b"), Utc::now());

        let output = ConsoleFormatter::format_sessions(&registry, &SessionId::new("a"));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        // "b" was touched last, so it is first; "a" is active and marked
        assert!(lines[0].starts_with(' '));
        assert!(lines[1].starts_with('*'));
        assert!(lines[1].contains("first question"));
    }

    #[test]
    fn empty_states_have_placeholders() {
        plain();
        assert!(ConsoleFormatter::format_transcript(&Transcript::new()).contains("No messages"));
        assert!(
            ConsoleFormatter::format_context(&ContextSnapshot::default()).contains("No context")
        );
    }

    #[test]
    fn context_panel_lists_fields() {
        plain();
        let context = ContextSnapshot {
            location: Some("Shibuya".to_string()),
            search_query: Some("ramen".to_string()),
            recent_entities: vec!["Ichiran".to_string(), "Shibuya".to_string()],
        };
        let output = ConsoleFormatter::format_context(&context);
        assert!(output.contains("Shibuya"));
        assert!(output.contains("ramen"));
        assert!(output.contains("Ichiran, Shibuya"));
    }
}
