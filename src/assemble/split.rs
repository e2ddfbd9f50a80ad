// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Rune-aware text splitting (§4.4).

use crate::resolve::sanitize::rune_count;

/// Width, in runes, of the trailing window searched for a `\n` or space
/// split point before falling back to a hard cut.
const SOFT_BREAK_WINDOW: usize = 100;

/// Split `text` into chunks of at most `max_runes` Unicode scalar values
/// each, preferring to break at a newline or space near the end of the
/// window. Returns a single-element vector when no split is needed.
pub fn split_text(text: &str, max_runes: usize) -> Vec<String> {
    if max_runes == 0 || rune_count(text) <= max_runes {
        return vec![text.to_string()];
    }

    let runes: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < runes.len() {
        let remaining = runes.len() - start;
        if remaining <= max_runes {
            chunks.push(runes[start..].iter().collect::<String>());
            break;
        }

        let window_end = start + max_runes;
        let window_start = window_end.saturating_sub(SOFT_BREAK_WINDOW).max(start);

        let newline_split = runes[window_start..window_end].iter().rposition(|&c| c == '\n');
        let (split_at, on_newline) = match newline_split {
            Some(offset) => (window_start + offset + 1, true),
            None => match runes[window_start..window_end].iter().rposition(|&c| c == ' ') {
                Some(offset) => (window_start + offset + 1, false),
                None => (window_end, false),
            },
        };

        let mut chunk: String = runes[start..split_at].iter().collect();
        // A newline is a line delimiter, not content, so it is dropped;
        // a space that caused the split is kept (§8 scenario 4: "Hello
        // world " / "this is a test").
        if on_newline {
            while chunk.ends_with('\n') {
                chunk.pop();
            }
        }
        chunks.push(chunk);
        start = split_at;

        while start < runes.len() && runes[start] == ' ' {
            start += 1;
        }
    }

    chunks
}
