//! Bounding free-form text before it reaches a log line

/// Truncate long strings for logging, respecting char boundaries
pub fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    let mut cut = max_len;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }

    format!("{}...[truncated {} bytes]", &s[..cut], s.len() - cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("hello", 10), "hello");

        let truncated = truncate_for_log("hello world this is a very long string", 10);
        assert!(truncated.starts_with("hello worl"));
        assert!(truncated.contains("[truncated"));
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let truncated = truncate_for_log("héllo", 2);
        assert!(truncated.starts_with("h..."));
    }
}
