//! String utilities for the domain layer.

/// First `max_chars` characters of `s`, cut at a character boundary.
///
/// Used for session previews: no ellipsis, no padding.
pub fn preview_of(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Truncate a string to a maximum byte length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries. Used for log formatting.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_short_string_unchanged() {
        assert_eq!(preview_of("hello", 100), "hello");
        assert_eq!(preview_of("", 100), "");
    }

    #[test]
    fn preview_cuts_at_char_count() {
        let s = "a".repeat(150);
        assert_eq!(preview_of(&s, 100).len(), 100);
        // Multibyte characters count as one
        assert_eq!(preview_of("日本語テスト", 3), "日本語");
    }

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
    }

    #[test]
    fn truncate_multibyte() {
        assert_eq!(truncate_str("日本語テスト", 30), "日本語テスト");
        assert_eq!(truncate_str("日本語テスト文字列", 15), "日本語テ...");
    }
}
