//! Common utility functions

pub fn truncate_display(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Collapse every whitespace run into a single space and trim both ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

pub fn is_punctuation_only(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| !c.is_alphanumeric())
}

pub fn has_bracket_leftover(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c, '<' | '>' | '[' | ']' | '{' | '}'))
}

pub fn starts_uppercase(s: &str) -> bool {
    s.chars().next().map(char::is_uppercase).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Go   away,\n now "), "Go away, now");
    }

    #[test]
    fn test_char_count_is_scalar_based() {
        assert_eq!(char_count("サレヴォク"), 5);
        assert_eq!(char_count("Selûne"), 6);
    }

    #[test]
    fn test_bracket_leftover() {
        assert!(has_bracket_leftover("CHARNAME>"));
        assert!(!has_bracket_leftover("Baldur's"));
    }

    #[test]
    fn test_truncate_display() {
        assert_eq!(truncate_display("abcdef", 3), "abc...");
        assert_eq!(truncate_display("abc", 3), "abc");
    }
}
