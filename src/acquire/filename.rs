// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Attachment filename normalization (§4.5).

use unicode_normalization::UnicodeNormalization;

/// Multi-character sequences replaced before decomposition, so the
/// resulting ASCII reads naturally instead of simply dropping the rune
/// (e.g. German "ß" becomes "ss", not nothing).
const MULTICHAR_REPLACEMENTS: &[(&str, &str)] = &[
    ("ß", "ss"),
    ("æ", "ae"),
    ("Æ", "AE"),
    ("œ", "oe"),
    ("Œ", "OE"),
    ("ø", "o"),
    ("Ø", "O"),
];

/// Normalize a source file name into the charset safe for the
/// destination path: NFKD-decompose, substitute known multichar
/// sequences, map every rune to `[A-Za-z0-9._-]` or `_`, reject runes
/// that remain non-ASCII (diacritics left over from decomposition,
/// unmapped scripts), then NFC-recompose what's left.
pub fn normalize_filename(name: &str) -> String {
    let substituted = apply_multichar_replacements(name);
    let decomposed: String = substituted.nfkd().collect();

    let mapped: String = decomposed
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                Some(c)
            } else if c.is_ascii() {
                Some('_')
            } else {
                None
            }
        })
        .collect();

    mapped.nfc().collect()
}

fn apply_multichar_replacements(name: &str) -> String {
    let mut result = name.to_string();
    for (from, to) in MULTICHAR_REPLACEMENTS {
        result = result.replace(from, to);
    }
    result
}
