//! Text helpers for Telegram output.

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Split `text` into chunks of at most `limit` UTF-16 code units (the unit
/// Telegram measures message length in).
///
/// Splitting is purely positional: line boundaries are not preserved, but a
/// character is never cut in half. Empty input yields no chunks.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(2);
    let mut out = Vec::new();
    let mut chunk = String::new();
    let mut units = 0usize;

    for ch in text.chars() {
        let w = ch.len_utf16();
        if units + w > limit {
            out.push(std::mem::take(&mut chunk));
            units = 0;
        }
        chunk.push(ch);
        units += w;
    }
    if !chunk.is_empty() {
        out.push(chunk);
    }
    out
}

/// Truncate to `max` chars with an ellipsis (for previews in logs and alerts).
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    format!("{}...", s.chars().take(max).collect::<String>())
}
