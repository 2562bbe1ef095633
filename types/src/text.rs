//! Small pure text helpers.

/// Keep at most `max` characters of `raw`.
///
/// Counts `char`s, not bytes, so multi-byte scalar values are never split.
#[must_use]
pub fn truncate_chars(raw: &str, max: usize) -> String {
    raw.chars().take(max).collect()
}

/// Truncate a string to fit within `max_total` characters, appending `suffix` if truncated.
///
/// The suffix counts toward the budget: the returned string is at most `max_total` characters.
#[must_use]
pub fn truncate_to_fit(raw: &str, max_total: usize, suffix: &str) -> String {
    if raw.chars().count() <= max_total {
        return raw.to_string();
    }
    let take = max_total.saturating_sub(suffix.chars().count());
    let head: String = raw.chars().take(take).collect();
    format!("{head}{suffix}")
}
