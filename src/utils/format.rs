//! Output formatting utilities

/// Truncate a string to at most `max_len` characters, ending in `...`.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len < 3 {
        return "...".to_string();
    }
    let trimmed: String = s.chars().take(max_len - 3).collect();
    format!("{trimmed}...")
}

/// Format size in human-readable form
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Render a 0..=1 score as a whole percentage.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_percent(score: f64) -> String {
    format!("{}%", (score.clamp(0.0, 1.0) * 100.0).round() as u32)
}
