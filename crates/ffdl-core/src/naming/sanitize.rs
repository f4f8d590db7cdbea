//! Portable filename sanitization.

/// Sanitizes one filename component so it is valid on Linux, macOS and Windows.
///
/// - Collapses whitespace runs to a single space
/// - Replaces `/ \ : * ? " < > |` and control characters with `_`
/// - Trims leading/trailing spaces, dots and underscores
/// - Falls back to `untitled` when nothing is left
/// - Limits length to `max_len` bytes (on a char boundary), then trims again
pub fn sanitize_component(name: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_space = false;

    for c in name.trim().chars() {
        if c.is_whitespace() {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
            continue;
        }
        prev_space = false;
        let unsafe_char = matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
            || c.is_control();
        out.push(if unsafe_char { '_' } else { c });
    }

    let trim = |s: &str| s.trim_matches(|c| c == ' ' || c == '.' || c == '_').to_string();
    let mut cleaned = trim(&out);

    if cleaned.len() > max_len {
        let mut take = max_len;
        while take > 0 && !cleaned.is_char_boundary(take) {
            take -= 1;
        }
        cleaned = trim(&cleaned[..take]);
    }

    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}
