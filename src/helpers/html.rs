//! HTML text helpers

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Collapse every run of whitespace into a single space
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Shorten `s` to at most `length` characters, cutting at a word boundary
/// and appending `omission` when anything was removed.
///
/// # Examples
/// ```ignore
/// prune("Hello brave new world", 12, "…") // -> "Hello brave…"
/// ```
pub fn prune(s: &str, length: usize, omission: &str) -> String {
    if s.chars().count() <= length {
        return s.to_string();
    }

    // One extra char so a word ending exactly at `length` survives
    let head: String = s.chars().take(length + 1).collect();
    let cut = match head.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => &head[..pos],
        _ => {
            let end = head
                .char_indices()
                .nth(length)
                .map(|(i, _)| i)
                .unwrap_or(head.len());
            &head[..end]
        }
    };

    let cut = cut.trim_end_matches(|c: char| c.is_whitespace() || ",;:.!?-".contains(c));
    format!("{}{}", cut, omission)
}
