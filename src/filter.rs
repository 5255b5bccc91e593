//! Word filtering module
//!
//! Decides whether a stripped line is long enough to keep.

use crate::error::FilterError;

/// Minimum-length filter
///
/// Length is measured in Unicode scalar values, so `"hëllo"` counts as 5.
#[derive(Debug, Clone, Copy)]
pub struct MinLengthFilter {
    min_length: usize,
}

impl MinLengthFilter {
    pub fn new(min_length: usize) -> Result<Self, FilterError> {
        if min_length == 0 {
            return Err(FilterError::InvalidConfig(
                "minimum length must be a positive integer".to_string(),
            ));
        }

        Ok(Self { min_length })
    }

    /// Check if a stripped word is non-empty and at least `min_length` long
    #[inline]
    pub fn matches(&self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }

        // Fast byte-length check first for ASCII-only optimization
        if word.is_ascii() {
            word.len() >= self.min_length
        } else {
            // A string can't hold more chars than bytes
            word.len() >= self.min_length && word.chars().count() >= self.min_length
        }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }
}

/// Strip leading and trailing whitespace
///
/// The information separators U+001C..U+001F count as whitespace here too.
#[inline]
pub fn strip_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_length() {
        let filter = MinLengthFilter::new(8).unwrap();

        assert!(filter.matches("password"));         // 8 chars
        assert!(filter.matches("verylongpassword")); // 16 chars
        assert!(!filter.matches("pass"));            // 4 chars
        assert!(!filter.matches(""));
    }

    #[test]
    fn test_zero_rejected() {
        let err = MinLengthFilter::new(0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidConfig(_)));
    }

    #[test]
    fn test_unicode_length() {
        let filter = MinLengthFilter::new(5).unwrap();

        assert!(filter.matches("hëllo"));  // 5 chars, 6 bytes
        assert!(!filter.matches("hëll"));  // 4 chars, 5 bytes
        assert!(!filter.matches("日本"));  // 2 chars, 6 bytes
    }

    #[test]
    fn test_min_length_one_keeps_any_non_empty() {
        let filter = MinLengthFilter::new(1).unwrap();

        assert!(filter.matches("a"));
        assert!(!filter.matches(strip_line("   \r\n")));
    }

    #[test]
    fn test_strip_line() {
        assert_eq!(strip_line("  b \r\n"), "b");
        assert_eq!(strip_line("\tpass word\n"), "pass word");
        assert_eq!(strip_line("\u{3000}full\u{3000}"), "full");
        assert_eq!(strip_line("\x1cgroup\x1d\x1e\x1f"), "group");
        assert_eq!(strip_line("in\x1fside"), "in\x1fside");
    }

    #[test]
    fn test_separator_does_not_count() {
        let filter = MinLengthFilter::new(8).unwrap();
        assert!(!filter.matches(strip_line("abcdefg\x1f")));
    }
}
