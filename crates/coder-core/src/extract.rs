//! Candidate-block extraction from raw model text.
//!
//! Models wrap their JSON in code fences, prose, or both. [`extract`] peels
//! that away and returns the outermost `{ … }` span when one exists.

const FENCE: &str = "```";

/// Isolate the candidate structured block in `raw`.
///
/// Returns an empty string for empty input. When no brace pair is found the
/// trimmed text is returned unchanged; it will fail to parse downstream.
pub fn extract(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut text = raw.trim();

    if text.starts_with(FENCE) {
        // The first line carries the fence and an optional language tag.
        if let Some(newline) = text.find('\n') {
            text = &text[newline + 1..];
        }
        text = text.trim_end_matches('`').trim();
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => text[start..=end].to_string(),
        _ => text.to_string(),
    }
}

/// First `limit` characters of `text`, cut on a char boundary.
pub fn preview(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
