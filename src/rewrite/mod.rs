// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Mention & Markup Rewriter (§4.2).
//!
//! Applies, in a fixed deterministic order, the regex substitutions that
//! translate source-ecosystem mention tokens and markup into the target's
//! Markdown dialect. Grounded on the teacher's `regex`-based
//! `transform::topic_rename::TopicRenameTransform`, which also compiles a
//! set of patterns once and applies them in a defined order rather than
//! iterating an unordered map.

mod markup;
mod mentions;

pub use markup::rewrite_markup;
pub use mentions::{rewrite_channel_mentions, rewrite_special_mentions, rewrite_user_mentions};

use std::collections::BTreeMap;

/// Lookup tables the rewriter needs: known users (id → username, iterated
/// username-ascending to resolve the "sort stability" open question) and
/// known channels (id → name).
#[derive(Debug, Clone, Default)]
pub struct RewriteContext {
    /// User id → username, to be substituted in `<@id>`/`<@id|username>`.
    pub users_by_id: BTreeMap<String, String>,
    /// Channel id → name, to be substituted in `<#cid>`/`<#cid|cname>`.
    pub channels_by_id: BTreeMap<String, String>,
}

impl RewriteContext {
    /// Build a context from id→username and id→name maps.
    pub fn new(
        users_by_id: impl IntoIterator<Item = (String, String)>,
        channels_by_id: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        // `BTreeMap`, keyed by id, is not itself what gives us
        // username-ascending order (ids and usernames are independent); the
        // iteration order is produced in `rewrite_user_mentions` by sorting
        // on the *value* (username) rather than the key.
        Self {
            users_by_id: users_by_id.into_iter().collect(),
            channels_by_id: channels_by_id.into_iter().collect(),
        }
    }

    /// Apply every substitution in the documented order to `text`.
    pub fn rewrite(&self, text: &str) -> String {
        let text = rewrite_user_mentions(text, &self.users_by_id);
        let text = rewrite_special_mentions(&text);
        let text = rewrite_channel_mentions(&text, &self.channels_by_id);
        rewrite_markup(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_rewrite_pipeline_matches_scenario_3() {
        let ctx = RewriteContext::new(
            [("U002".to_string(), "jane".to_string())],
            [("C002".to_string(), "random".to_string())],
        );
        let out = ctx.rewrite("Hey <@U002>, cc <#C002|random> <!here>");
        assert_eq!(out, "Hey @jane, cc ~random @here");
    }
}
