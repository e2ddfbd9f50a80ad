// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Source and intermediate domain records.
//!
//! `Source*` types mirror the shape of the export archive's JSON records as
//! closely as useful, tolerating unknown and partially-corrupt fields.
//! `Intermediate*` types are the post-resolver domain model that the
//! [`crate::emit`] stage serializes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The four channel kinds, derived from which catalog file a channel came
/// from (`channels.json`, `groups.json`, `mpims.json`, `dms.json`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Public, open-membership channel (from `channels.json`).
    Open,
    /// Private channel (from `groups.json`).
    Private,
    /// Multi-person group channel (from `mpims.json`).
    Group,
    /// Two-person direct channel (from `dms.json`).
    Direct,
}

/// A channel purpose or topic field, which the source represents as an
/// object with a `value` key (plus creator/timestamp metadata this tool
/// does not use).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceTextField {
    /// The text content.
    #[serde(default)]
    pub value: String,
}

/// A channel record as decoded from one of the five catalog files.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceChannel {
    /// Source-assigned channel id.
    pub id: String,
    /// Source channel name.
    #[serde(default)]
    pub name: String,
    /// Id of the user who created the channel.
    #[serde(default)]
    pub creator: String,
    /// Member user ids.
    #[serde(default)]
    pub members: Vec<String>,
    /// Channel purpose.
    #[serde(default)]
    pub purpose: SourceTextField,
    /// Channel topic.
    #[serde(default)]
    pub topic: SourceTextField,
    /// Kind is not present in the JSON; it is assigned by the archive
    /// reader based on which catalog file produced this record.
    #[serde(skip)]
    pub kind: Option<ChannelKind>,
}

/// A user profile, as nested under `SourceUser::profile`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceProfile {
    /// Display/real name, e.g. "Jane Doe".
    #[serde(default)]
    pub real_name: String,
    /// Email address, possibly empty.
    #[serde(default)]
    pub email: String,
    /// Job title, mapped onto the intermediate user's `position`.
    #[serde(default)]
    pub title: String,
    /// Bot id, present only for bot "users".
    #[serde(default)]
    pub bot_id: String,
}

/// A user record as decoded from `users.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceUser {
    /// Source-assigned user id.
    pub id: String,
    /// Login/display username.
    #[serde(default)]
    pub username: String,
    /// Whether this entry represents a bot identity.
    #[serde(default)]
    pub is_bot: bool,
    /// Whether the account has been deleted/deactivated upstream.
    #[serde(default)]
    pub deleted: bool,
    /// Nested profile fields.
    #[serde(default)]
    pub profile: SourceProfile,
}

/// A file reference, e.g. an image or document shared in a channel.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceFile {
    /// File id; matches the `__uploads/<id>/` directory name when the file
    /// is embedded in the archive.
    pub id: String,
    /// Original file name.
    #[serde(default)]
    pub name: String,
    /// Expected size in bytes, used to validate/resume downloads.
    #[serde(default)]
    pub size: u64,
    /// Remote URL to fetch the file from when it is not embedded.
    #[serde(default)]
    pub download_url: Option<String>,
}

/// A reaction ("emoji") applied to a post.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceReaction {
    /// Reaction name (without colons), e.g. "thumbsup".
    pub name: String,
    /// Number of users who applied the reaction.
    #[serde(default)]
    pub count: u32,
    /// User ids who applied the reaction.
    #[serde(default)]
    pub users: Vec<String>,
}

/// Call/huddle metadata attached to a `huddle_thread` post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRoom {
    /// User id who started the call.
    #[serde(default)]
    pub created_by: String,
    /// Call start time, seconds since epoch.
    #[serde(default)]
    pub date_start: i64,
    /// Call end time, seconds since epoch.
    #[serde(default)]
    pub date_end: i64,
}

/// A comment on a file, used by `file_comment` subtype posts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceComment {
    /// Author of the comment.
    #[serde(default)]
    pub user: String,
    /// Comment body.
    #[serde(default)]
    pub comment: String,
}

/// A rich attachment block (unstructured, forwarded into `props.attachments`
/// verbatim by the assembler).
pub type SourceAttachment = serde_json::Value;

/// A single message as decoded from a per-channel daily batch file.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcePost {
    /// Author user id.
    #[serde(default)]
    pub user: String,
    /// Author bot id, when this message was posted by a bot.
    #[serde(default)]
    pub bot_id: String,
    /// Bot display name, used as a fallback author label.
    #[serde(default)]
    pub bot_username: String,
    /// Message body, pre-rewrite.
    #[serde(default)]
    pub text: String,
    /// `"<seconds>.<micros>"` timestamp of this message.
    #[serde(default)]
    pub ts: String,
    /// `"<seconds>.<micros>"` timestamp of the thread root, or empty.
    #[serde(default)]
    pub thread_ts: String,
    /// Top-level message type (almost always `"message"`).
    #[serde(default, rename = "type")]
    pub kind: String,
    /// Message subtype, e.g. `"file_share"`, `"bot_message"`.
    #[serde(default)]
    pub subtype: String,
    /// File comment payload, present for `subtype == "file_comment"`.
    #[serde(default)]
    pub comment: Option<SourceComment>,
    /// Single attached file (legacy single-file field).
    #[serde(default)]
    pub file: Option<SourceFile>,
    /// Attached files.
    #[serde(default)]
    pub files: Vec<SourceFile>,
    /// Rich, unstructured attachment blocks.
    #[serde(default)]
    pub attachments: Vec<SourceAttachment>,
    /// Reactions applied to this message.
    #[serde(default)]
    pub reactions: Vec<SourceReaction>,
    /// Call metadata, present for `subtype == "huddle_thread"`.
    #[serde(default)]
    pub room: Option<SourceRoom>,
}

/// One public/private/group/direct channel in the resolved intermediate
/// model.
#[derive(Debug, Clone, Serialize)]
pub struct IntermediateChannel {
    /// Source channel id, retained for diagnostics and checker keys.
    pub id: String,
    /// Original (unsanitized) channel name.
    pub original_name: String,
    /// Sanitized channel name (§3 invariants).
    pub name: String,
    /// Sanitized display name.
    pub display_name: String,
    /// Member user ids (post-filtering).
    pub members: Vec<String>,
    /// Member usernames, resolved from `members`.
    pub member_usernames: Vec<String>,
    /// Sanitized purpose, ≤ 250 runes.
    pub purpose: String,
    /// Sanitized header (source topic), ≤ 1024 runes.
    pub header: String,
    /// Unsanitized topic, retained for reference.
    pub topic: String,
    /// Resolved channel kind (after group→private reclassification).
    pub kind: ChannelKind,
}

/// A resolved user in the intermediate model.
#[derive(Debug, Clone, Serialize)]
pub struct IntermediateUser {
    /// Source user id (or bot id, for bot identities).
    pub id: String,
    /// Sanitized username.
    pub username: String,
    /// First name (first word of `real_name`).
    pub first_name: String,
    /// Last name (remainder of `real_name`, possibly empty).
    pub last_name: String,
    /// Job title / position.
    pub position: String,
    /// Email address (possibly empty, per §4.3 policy).
    pub email: String,
    /// Freshly generated placeholder password token.
    pub password: String,
    /// Names of public/private channels this user belongs to.
    pub memberships: Vec<String>,
    /// Non-zero (ms since epoch) when the source account was deleted.
    pub delete_at: i64,
}

/// A resolved post or reply in the intermediate model.
#[derive(Debug, Clone, Serialize)]
pub struct IntermediatePost {
    /// Author username.
    pub user: String,
    /// Channel name this post belongs to.
    pub channel: String,
    /// Rewritten, possibly-split message text.
    pub message: String,
    /// Opaque platform-specific properties (e.g. attachments, call info).
    pub props: serde_json::Map<String, serde_json::Value>,
    /// Milliseconds since epoch, unique within `channel`.
    pub create_at: i64,
    /// Post type (`""` for plain messages, `"custom_calls"` for huddles).
    #[serde(rename = "type")]
    pub kind: String,
    /// Resolved attachment destination paths.
    pub attachments: Vec<String>,
    /// Thread replies, sorted ascending by `create_at`.
    pub replies: Vec<IntermediatePost>,
    /// Reaction summaries.
    pub reactions: Vec<IntermediateReaction>,
    /// True for posts belonging to a group/direct channel.
    pub is_direct: bool,
    /// Member usernames of the owning channel, when `is_direct`.
    pub channel_members: Vec<String>,
    /// Files awaiting acquisition; drained into `attachments` by the
    /// Attachment Acquirer and never serialized.
    #[serde(skip)]
    pub pending_files: Vec<SourceFile>,
}

/// A resolved reaction, ready for emission.
#[derive(Debug, Clone, Serialize)]
pub struct IntermediateReaction {
    /// Reaction name.
    pub name: String,
    /// Usernames who applied the reaction.
    pub users: Vec<String>,
}

/// The fully resolved and assembled intermediate model, ready for the
/// emitter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Intermediate {
    /// Public (open) channels.
    pub public_channels: Vec<IntermediateChannel>,
    /// Private channels (including group channels reclassified for
    /// exceeding the group cap).
    pub private_channels: Vec<IntermediateChannel>,
    /// Multi-person group channels.
    pub group_channels: Vec<IntermediateChannel>,
    /// Two-person direct channels.
    pub direct_channels: Vec<IntermediateChannel>,
    /// All resolved users, keyed by source id, in insertion order.
    #[serde(skip)]
    pub users_by_id: indexmap_like::InsertionOrderedMap<String, IntermediateUser>,
    /// Flattened post list (roots only; replies nest under each root).
    pub posts: Vec<IntermediatePost>,
}

impl Default for ChannelKind {
    fn default() -> Self {
        ChannelKind::Open
    }
}

/// A tiny insertion-ordered map, used for `users_by_id` (§3: "order =
/// insertion order of `users_by_id`").
///
/// `serde_json`'s `preserve_order` feature keeps `serde_json::Map` ordered,
/// but the resolver needs random access by id as well as ordered iteration,
/// so this module keeps a small dedicated type rather than reaching for a
/// third map crate (the teacher favors small, purpose-built utility types
/// over general-purpose dependencies for pipeline-internal bookkeeping —
/// see `types::arena_pool`).
pub mod indexmap_like {
    use std::collections::HashMap;

    /// Preserves the order in which keys were first inserted.
    #[derive(Debug, Clone, Default)]
    pub struct InsertionOrderedMap<K, V> {
        order: Vec<K>,
        values: HashMap<K, V>,
    }

    impl<K, V> InsertionOrderedMap<K, V>
    where
        K: std::hash::Hash + Eq + Clone,
    {
        /// Create an empty map.
        pub fn new() -> Self {
            Self {
                order: Vec::new(),
                values: HashMap::new(),
            }
        }

        /// Insert a value, recording insertion order only for new keys.
        pub fn insert(&mut self, key: K, value: V) {
            if !self.values.contains_key(&key) {
                self.order.push(key.clone());
            }
            self.values.insert(key, value);
        }

        /// Look up a value by key.
        pub fn get(&self, key: &K) -> Option<&V> {
            self.values.get(key)
        }

        /// Look up a mutable reference to a value by key.
        pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
            self.values.get_mut(key)
        }

        /// Check whether a key is present.
        pub fn contains_key(&self, key: &K) -> bool {
            self.values.contains_key(key)
        }

        /// Number of entries.
        pub fn len(&self) -> usize {
            self.order.len()
        }

        /// Whether the map has no entries.
        pub fn is_empty(&self) -> bool {
            self.order.is_empty()
        }

        /// Iterate values in insertion order.
        pub fn values_in_order(&self) -> impl Iterator<Item = &V> {
            self.order.iter().map(move |k| &self.values[k])
        }

        /// Iterate key/value pairs in insertion order.
        pub fn iter_in_order(&self) -> impl Iterator<Item = (&K, &V)> {
            self.order.iter().map(move |k| (k, &self.values[k]))
        }
    }
}

/// Parsed catalogs, keyed by workspace-relative channel name for post
/// batches.
#[derive(Debug, Clone, Default)]
pub struct SourceCatalogs {
    /// Channels from `channels.json`.
    pub channels: Vec<SourceChannel>,
    /// Channels from `groups.json`.
    pub groups: Vec<SourceChannel>,
    /// Channels from `mpims.json`.
    pub mpims: Vec<SourceChannel>,
    /// Channels from `dms.json`.
    pub dms: Vec<SourceChannel>,
    /// Users from `users.json` (or the `USERS_JSON_FILE` override).
    pub users: Vec<SourceUser>,
    /// Per-channel post batches, keyed by channel name, each entry the
    /// concatenation of every daily file for that channel.
    pub posts: HashMap<String, Vec<SourcePost>>,
    /// Embedded file uploads, keyed by file id, holding archive entry
    /// paths rather than bytes (acquired lazily in the Acquirer stage).
    pub uploads: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::indexmap_like::InsertionOrderedMap;

    #[test]
    fn insertion_ordered_map_preserves_first_insertion_order() {
        let mut map = InsertionOrderedMap::new();
        map.insert("b".to_string(), 2);
        map.insert("a".to_string(), 1);
        map.insert("b".to_string(), 20);
        let order: Vec<_> = map.iter_in_order().map(|(k, _)| k.clone()).collect();
        assert_eq!(order, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(*map.get(&"b".to_string()).unwrap(), 20);
    }
}
