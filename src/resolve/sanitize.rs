// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Name and rune-length sanitization (§3 invariants).

/// Sanitize a channel `name`/`display_name` candidate: map every
/// disallowed-but-ASCII rune to `_`, drop non-ASCII runes outright, trim
/// leading/trailing `_`/`-`, cap at `max_len` runes. Falls back to
/// `fallback_id.to_lowercase()` if the result would be empty.
pub fn sanitize_channel_name(raw: &str, fallback_id: &str, max_len: usize) -> String {
    let filtered: String = raw
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                Some(c)
            } else if c.is_ascii() {
                Some('_')
            } else {
                None
            }
        })
        .collect();

    let trimmed = trim_underscores_and_dashes(&filtered);
    let truncated: String = trimmed.chars().take(max_len).collect();
    let truncated = trim_underscores_and_dashes(&truncated);

    if truncated.is_empty() {
        fallback_id.to_lowercase()
    } else {
        truncated.to_string()
    }
}

fn trim_underscores_and_dashes(s: &str) -> &str {
    s.trim_matches(|c| c == '_' || c == '-')
}

/// Truncate `text` to at most `max_runes` Unicode scalar values.
pub fn cap_runes(text: &str, max_runes: usize) -> String {
    if text.chars().count() <= max_runes {
        text.to_string()
    } else {
        text.chars().take(max_runes).collect()
    }
}

/// Count of Unicode scalar values in `text`.
pub fn rune_count(text: &str) -> usize {
    text.chars().count()
}
