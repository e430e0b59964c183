//! Common helper functions for output formatting.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;

/// Truncates an ID to 8 characters for display.
pub fn truncate_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// Two spaces per level of depth.
pub fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Renders `text` with the characters at `positions` emphasized.
///
/// `positions` are character indices in ascending order. Without colors the
/// text is returned unchanged.
pub fn highlight(text: &str, positions: &[usize], use_colors: bool) -> String {
    if !use_colors || positions.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut wanted = positions.iter().peekable();
    for (index, c) in text.chars().enumerate() {
        if wanted.peek() == Some(&&index) {
            wanted.next();
            out.push_str(&c.yellow().bold().to_string());
        } else {
            out.push(c);
        }
    }
    out
}

/// Formats attributes and tags as `@key=value #tag`.
pub fn format_metadata(attributes: &BTreeMap<String, String>, tags: &[String]) -> String {
    attributes
        .iter()
        .map(|(key, value)| {
            if value.is_empty() {
                format!("@{key}")
            } else {
                format!("@{key}={value}")
            }
        })
        .chain(tags.iter().map(|tag| format!("#{tag}")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats a stored timestamp in local time.
pub fn format_datetime(datetime: &DateTime<Utc>) -> String {
    datetime
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}
