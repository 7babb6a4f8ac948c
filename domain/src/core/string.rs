//! String utilities for the domain layer.

/// Truncate a string to a maximum number of characters, appending an ellipsis
///
/// Counts characters rather than bytes so previews of Korean or emoji-heavy
/// model output are cut at the same visual width as ASCII.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Collapse a possibly multi-line text into a single preview line
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
