// src/fields/markers.rs

use regex::Regex;
use std::sync::LazyLock;

/// Line breaks plus any whitespace hugging them.
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\n\s*").expect("static regex"));

/// Take the text between the first `marker` and the next `end_marker`.
///
/// Multi-line values (addresses) are folded onto one line with `", "`.
/// Returns `None` when either marker is missing or nothing sits between them.
pub fn extract_field(text: &str, marker: &str, end_marker: &str) -> Option<String> {
    let start = text.find(marker)? + marker.len();
    let end = start + text[start..].find(end_marker)?;

    let value = text[start..end].trim();
    if value.is_empty() {
        return None;
    }
    Some(LINE_BREAK.replace_all(value, ", ").into_owned())
}

/// Try each marker in turn; the first non-empty value wins.
pub fn extract_field_multiple<S: AsRef<str>>(
    text: &str,
    markers: &[S],
    end_marker: &str,
) -> Option<String> {
    markers
        .iter()
        .find_map(|m| extract_field(text, m.as_ref(), end_marker))
}
