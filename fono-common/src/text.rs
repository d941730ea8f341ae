//! Display helpers shared by every table and panel

/// Default display budget for cell values in error details
pub const VALUE_DISPLAY_CHARS: usize = 30;

/// Placeholder for missing values
pub const EMPTY_PLACEHOLDER: &str = "-";

/// Truncate to `max_chars` characters, appending `...` when anything was cut
///
/// Counts characters, not bytes. Blank input renders as `-`.
pub fn truncate_display(value: &str, max_chars: usize) -> String {
    if value.trim().is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }
    match value.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}

/// `value` or `-` when missing or blank
pub fn or_placeholder(value: Option<&str>) -> &str {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(EMPTY_PLACEHOLDER)
}

/// `1 erro` / `N erros`
pub fn error_count_label(count: usize) -> String {
    if count == 1 {
        "1 erro".to_string()
    } else {
        format!("{} erros", count)
    }
}
