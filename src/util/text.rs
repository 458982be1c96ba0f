/// Normalizes a text field taken from a feed.
///
/// Control characters are dropped, runs of whitespace (including newlines
/// picked up from pretty-printed XML) collapse to a single space, and the
/// result is trimmed.
///
/// # Returns
///
/// `None` if nothing but whitespace or control characters remains.
///
/// # Examples
///
/// ```
/// use feedreport::util::clean_text;
///
/// assert_eq!(clean_text("  Hello\n   world "), Some("Hello world".to_string()));
/// assert_eq!(clean_text(" \t\n"), None);
/// ```
pub fn clean_text(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut pending_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if c.is_control() {
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
