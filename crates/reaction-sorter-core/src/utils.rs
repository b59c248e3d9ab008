//! Utility functions for text handling.

use std::time::Duration;

/// Truncate a string to at most `max_chars` characters, respecting UTF-8 boundaries.
///
/// # Examples
///
/// ```
/// use reaction_sorter_core::utils::truncate_str;
///
/// assert_eq!(truncate_str("hello", 10), "hello");
/// assert_eq!(truncate_str("привет мир", 6), "привет");
/// ```
pub fn truncate_str(s: impl AsRef<str>, max_chars: usize) -> String {
    let s = s.as_ref();
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    s.char_indices()
        .nth(max_chars)
        .map_or_else(|| s.to_string(), |(pos, _)| s[..pos].to_string())
}

/// Round a duration to whole milliseconds (half up).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use reaction_sorter_core::utils::round_millis;
///
/// assert_eq!(round_millis(Duration::from_micros(41_499)), 41);
/// assert_eq!(round_millis(Duration::from_micros(41_500)), 42);
/// ```
#[must_use]
pub fn round_millis(duration: Duration) -> u128 {
    (duration.as_micros() + 500) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_multibyte() {
        assert_eq!(truncate_str("😀😀😀", 2), "😀😀");
        assert_eq!(truncate_str("", 5), "");
        assert_eq!(truncate_str("abc", 0), "");
    }
}
