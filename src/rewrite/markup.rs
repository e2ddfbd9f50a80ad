// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Markup rewriting: links, bold, strikethrough, blockquotes (§4.2, step 3).
//!
//! Uses the `regex` crate's non-backtracking engine throughout (§9 design
//! note: "must not use a backtracking engine on untrusted input without a
//! pathological-pattern budget" — `regex` has no such budget to exceed).

use regex::Regex;

/// Apply the full markup rewrite: links, bold, strikethrough, then
/// blockquotes (multiline block before the single-line entity form).
pub fn rewrite_markup(text: &str) -> String {
    let text = rewrite_links(text);
    let text = rewrite_bold(&text);
    let text = rewrite_strikethrough(&text);
    let text = rewrite_multiline_blockquote(&text);
    rewrite_single_line_blockquote(&text)
}

/// `<url|label>` → `[label](url)`.
///
/// Excludes `@`/`#` as the first character of the URL half so a mention
/// token left unresolved by [`super::mentions`] is never mistaken for a
/// link.
fn rewrite_links(text: &str) -> String {
    let re = Regex::new(r"<([^@#|<>][^|<>]*)\|([^<>]+)>").expect("valid link regex");
    re.replace_all(text, "[$2]($1)").into_owned()
}

/// `*x*` → `**x**`, only when `*` opens at a leading boundary (start of
/// line, or preceded by whitespace/`.`/`;`/`,`).
fn rewrite_bold(text: &str) -> String {
    let re = Regex::new(r"(?m)(^|[\s.;,])\*([^*\n]+)\*").expect("valid bold regex");
    re.replace_all(text, "$1**$2**").into_owned()
}

/// `~x~` → `~~x~~`, same leading-boundary rule as bold.
fn rewrite_strikethrough(text: &str) -> String {
    let re = Regex::new(r"(?m)(^|[\s.;,])~([^~\n]+)~").expect("valid strikethrough regex");
    re.replace_all(text, "$1~~$2~~").into_owned()
}

/// A message that opens with `>>>` is a multiline blockquote: strip the
/// marker and prefix every remaining line with `> `.
fn rewrite_multiline_blockquote(text: &str) -> String {
    match text.strip_prefix(">>>") {
        Some(rest) => {
            let rest = rest.strip_prefix('\n').unwrap_or(rest);
            rest.lines()
                .map(|line| format!("> {line}"))
                .collect::<Vec<_>>()
                .join("\n")
        }
        None => text.to_string(),
    }
}

/// A line opening with the `&gt;` HTML entity is a single-line blockquote:
/// replace the leading entity with a literal `>`.
fn rewrite_single_line_blockquote(text: &str) -> String {
    let re = Regex::new(r"(?m)^&gt;").expect("valid blockquote regex");
    re.replace_all(text, ">").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_link() {
        assert_eq!(
            rewrite_markup("see <https://example.com|docs>"),
            "see [docs](https://example.com)"
        );
    }

    #[test]
    fn rewrites_bold_at_start_of_line() {
        assert_eq!(rewrite_markup("*hello*"), "**hello**");
    }

    #[test]
    fn rewrites_bold_after_boundary_punctuation() {
        assert_eq!(rewrite_markup("well, *hello* there"), "well, **hello** there");
    }

    #[test]
    fn does_not_rewrite_bold_mid_word() {
        assert_eq!(rewrite_markup("a*b*c"), "a*b*c");
    }

    #[test]
    fn rewrites_strikethrough() {
        assert_eq!(rewrite_markup("~nope~"), "~~nope~~");
    }

    #[test]
    fn rewrites_single_line_blockquote() {
        assert_eq!(rewrite_markup("&gt; quoted line"), "> quoted line");
    }

    #[test]
    fn rewrites_multiline_blockquote_block() {
        let input = ">>>\nfirst\nsecond";
        assert_eq!(rewrite_markup(input), "> first\n> second");
    }
}
