/// Normalizes raw rendered text into visible lines
///
/// This mirrors how a browser reports an element's visible text:
/// - Whitespace runs inside a line collapse to a single space
/// - Each line is trimmed
/// - Empty lines are dropped
/// - Lines are joined with a single `\n`
pub fn normalize_visible_text(raw: &str) -> String {
    raw.lines()
        .map(normalize_whitespace_in_segment)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the non-empty, trimmed lines of a visible text block
pub fn visible_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Normalizes whitespace within a single line
pub fn normalize_whitespace_in_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns whether `text` contains any of the given phrases
pub fn contains_any(text: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|phrase| text.contains(phrase.as_str()))
}
