// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! User, channel, and special-token mention rewriting (§4.2, steps 1-2).

use std::collections::BTreeMap;

use regex::Regex;

/// Replace `<@id>` and `<@id|username>` with `@username` for every known
/// user, iterating users in username-ascending order (resolves the base
/// spec's "Open question: sort stability").
pub fn rewrite_user_mentions(text: &str, users_by_id: &BTreeMap<String, String>) -> String {
    let mut entries: Vec<(&String, &String)> = users_by_id.iter().collect();
    entries.sort_by(|a, b| a.1.cmp(b.1));

    let mut out = text.to_string();
    for (id, username) in entries {
        let escaped_id = regex::escape(id);
        let exact = Regex::new(&format!("<@{escaped_id}>")).expect("valid mention regex");
        out = exact.replace_all(&out, format!("@{username}")).into_owned();

        let with_label =
            Regex::new(&format!("<@{escaped_id}\\|[^>]*>")).expect("valid mention-with-label regex");
        out = with_label.replace_all(&out, format!("@{username}")).into_owned();
    }
    out
}

/// Replace `<!here>`/`<@here>` → `@here`, `<!channel>` → `@channel`,
/// `<!everyone>` → `@all`.
pub fn rewrite_special_mentions(text: &str) -> String {
    static HERE: &str = r"<!here>|<@here>";
    static CHANNEL: &str = r"<!channel>";
    static EVERYONE: &str = r"<!everyone>";

    let here = Regex::new(HERE).expect("valid here regex");
    let channel = Regex::new(CHANNEL).expect("valid channel regex");
    let everyone = Regex::new(EVERYONE).expect("valid everyone regex");

    let out = here.replace_all(text, "@here").into_owned();
    let out = channel.replace_all(&out, "@channel").into_owned();
    everyone.replace_all(&out, "@all").into_owned()
}

/// Replace `<#cid>` and `<#cid|cname>` with `~cname` for every known
/// channel.
pub fn rewrite_channel_mentions(text: &str, channels_by_id: &BTreeMap<String, String>) -> String {
    let mut entries: Vec<(&String, &String)> = channels_by_id.iter().collect();
    entries.sort_by(|a, b| a.1.cmp(b.1));

    let mut out = text.to_string();
    for (id, name) in entries {
        let escaped_id = regex::escape(id);
        let exact = Regex::new(&format!("<#{escaped_id}>")).expect("valid channel mention regex");
        out = exact.replace_all(&out, format!("~{name}")).into_owned();

        let with_label =
            Regex::new(&format!("<#{escaped_id}\\|[^>]*>")).expect("valid channel-with-label regex");
        out = with_label.replace_all(&out, format!("~{name}")).into_owned();
    }
    out
}
