//! String helpers shared by summaries, labels, and why-clauses

/// Truncate to at most `max_chars` characters, cutting on a char boundary.
///
/// Unlike a display ellipsis helper, the returned string never exceeds
/// `max_chars` in total: when text is cut, the last character is replaced by
/// `…`. Whitespace at the cut point is trimmed first.
pub fn clamp_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let kept: String = s.chars().take(max_chars - 1).collect();
    format!("{}…", kept.trim_end())
}

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased, whitespace-collapsed key used to compare topics
pub fn normalize_key(s: &str) -> String {
    collapse_whitespace(s).to_lowercase()
}
