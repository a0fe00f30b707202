use chrono::Local;

// ============== Timestamp Helpers ==============

/// Local wall-clock time as shown to admins in topic introductions.
pub fn local_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

// ============== Text Helpers ==============

/// Cut `s` to at most `max` characters (not bytes).
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// One-line error text for chat messages, with a `...` tail when cut.
pub fn short_error(err: &impl std::fmt::Display, max: usize) -> String {
    let msg = err.to_string();
    if msg.chars().count() > max {
        format!("{}...", truncate_chars(&msg, max))
    } else {
        msg
    }
}
