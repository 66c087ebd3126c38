//! String extension helpers
//!
//! Cleaning and shortening of free-text columns (query text, column lists)
//! before they are rendered into a single report line.

/// Marker appended to shortened text
pub const ELLIPSIS: &str = "...";

/// Collapse every whitespace run (including line breaks) into one space
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep the first `max_chars` characters, appending `...` when cut
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &s[..byte_idx], ELLIPSIS),
        None => s.to_string(),
    }
}

/// String cleaning extension trait
pub trait StringExt {
    /// Trimmed value, `None` when empty
    fn clean(&self) -> Option<String>;

    /// Trimmed value, or `placeholder` when empty
    fn or_placeholder(&self, placeholder: &str) -> String {
        self.clean().unwrap_or_else(|| placeholder.to_string())
    }

    /// Single-line preview: whitespace collapsed, cut to `max_chars`
    fn inline_preview(&self, max_chars: usize) -> String;
}

impl StringExt for str {
    #[inline]
    fn clean(&self) -> Option<String> {
        let trimmed = self.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    }

    fn inline_preview(&self, max_chars: usize) -> String {
        truncate_with_ellipsis(&collapse_whitespace(self), max_chars)
    }
}

impl StringExt for String {
    #[inline]
    fn clean(&self) -> Option<String> {
        self.as_str().clean()
    }

    fn inline_preview(&self, max_chars: usize) -> String {
        self.as_str().inline_preview(max_chars)
    }
}

impl<T: AsRef<str>> StringExt for Option<T> {
    #[inline]
    fn clean(&self) -> Option<String> {
        self.as_ref().and_then(|s| s.as_ref().clean())
    }

    fn inline_preview(&self, max_chars: usize) -> String {
        self.as_ref()
            .map(|s| s.as_ref().inline_preview(max_chars))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("short", 100), "short");
        assert_eq!(truncate_with_ellipsis("abcdef", 3), "abc...");
        assert_eq!(truncate_with_ellipsis("abc", 3), "abc");

        let long = "x".repeat(150);
        let cut = truncate_with_ellipsis(&long, 100);
        assert_eq!(cut.len(), 103);
        assert!(cut.ends_with(ELLIPSIS));
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate_with_ellipsis("żółw jest", 4), "żółw...");
    }

    #[test]
    fn test_inline_preview_collapses_lines() {
        let sql = "SELECT *\r\n  FROM dbo.Orders\n\tWHERE Id = 1";
        assert_eq!(sql.inline_preview(100), "SELECT * FROM dbo.Orders WHERE Id = 1");
        assert_eq!(sql.inline_preview(8), "SELECT *...");
    }

    #[test]
    fn test_clean_optional() {
        assert_eq!(Some("  [Total] ").clean(), Some("[Total]".to_string()));
        assert_eq!(Some("   ").clean(), None);
        assert_eq!(None::<String>.or_placeholder("none"), "none");
    }
}
