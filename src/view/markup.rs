//! Display values shared by the section templates.
//!
//! Everything here produces plain text; escaping is left to the templates.

/// Placeholder for a missing scalar value.
pub const DASH: &str = "—";

/// Maximum number of list items shown in a preview.
pub const PREVIEW_LIMIT: usize = 5;

/// Trimmed text, or the fallback when absent or blank.
pub fn text_or(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Integers print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn number_or(value: Option<f64>, fallback: &str) -> String {
    value
        .map(format_number)
        .unwrap_or_else(|| fallback.to_string())
}

/// Link target for an optional URL; `#` when absent.
pub fn href(url: Option<&str>) -> String {
    text_or(url, "#")
}

/// Keep at most `limit` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

/// The first [`PREVIEW_LIMIT`] items.
pub fn preview<'a, T>(items: &'a [T]) -> &'a [T] {
    &items[..items.len().min(PREVIEW_LIMIT)]
}
