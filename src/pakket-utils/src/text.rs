//! Helpers for fitting strings into fixed-size fields.

/// Truncates `s` to at most `max_len` bytes without splitting a
/// UTF-8 character.
#[inline]
pub fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }

    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_str("abcdef", 3), "abc");
        assert_eq!(truncate_str("abc", 3), "abc");
        assert_eq!(truncate_str("ab", 8), "ab");
        assert_eq!(truncate_str("ab", 0), "");
    }

    #[test]
    fn truncate_on_char_boundary() {
        assert_eq!(truncate_str("é", 1), "");
        assert_eq!(truncate_str("aé", 2), "a");
        assert_eq!(truncate_str("aéb", 3), "aé");
        assert_eq!(truncate_str("€x", 2), "");
    }
}
