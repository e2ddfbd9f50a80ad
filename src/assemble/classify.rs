// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! (type, subtype) classification (§4.4): turns one [`SourcePost`] into a
//! shape-neutral [`ClassifiedPost`] the assembler can then resolve,
//! rewrite, and chunk.

use crate::core::model::{SourceFile, SourcePost};

/// The post kind emitted on the wire (`""` for an ordinary post, or a
/// platform-specific custom type such as `"custom_calls"`).
pub const KIND_PLAIN: &str = "";
pub const KIND_CUSTOM_CALLS: &str = "custom_calls";

/// Intermediate shape produced by classification, before author
/// resolution, rewriting, and splitting.
pub struct ClassifiedPost {
    /// Author user or bot id (may be absent from the user table — the
    /// caller resolves/synthesizes).
    pub author_id: String,
    /// Message body, pre-rewrite.
    pub text: String,
    /// Post kind for the wire record.
    pub kind: &'static str,
    /// Files to attach.
    pub files: Vec<SourceFile>,
    /// Rich attachment blocks, forwarded into `props.attachments`.
    pub attachments: Vec<serde_json::Value>,
    /// Extra props beyond `attachments` (e.g. huddle start/end times).
    pub extra_props: serde_json::Map<String, serde_json::Value>,
}

/// Classify one source post, or return `None` if its (type, subtype)
/// combination is not recognized ("other | warn and drop").
pub fn classify(post: &SourcePost) -> Option<ClassifiedPost> {
    match post.subtype.as_str() {
        "" | "file_share" | "thread_broadcast" => Some(ClassifiedPost {
            author_id: post.user.clone(),
            text: post.text.clone(),
            kind: KIND_PLAIN,
            files: merged_files(post),
            attachments: post.attachments.clone(),
            extra_props: serde_json::Map::new(),
        }),
        "file_comment" => {
            let comment = post.comment.clone().unwrap_or_default();
            Some(ClassifiedPost {
                author_id: comment.user,
                text: comment.comment,
                kind: KIND_PLAIN,
                files: merged_files(post),
                attachments: post.attachments.clone(),
                extra_props: serde_json::Map::new(),
            })
        }
        "bot_message" | "tombstone" => {
            let author_id = if !post.bot_id.is_empty() {
                post.bot_id.clone()
            } else {
                post.user.clone()
            };
            Some(ClassifiedPost {
                author_id,
                text: post.text.clone(),
                kind: KIND_PLAIN,
                files: merged_files(post),
                attachments: post.attachments.clone(),
                extra_props: serde_json::Map::new(),
            })
        }
        "channel_join" | "channel_leave" | "channel_topic" | "channel_purpose"
        | "channel_name" | "me_message" => Some(ClassifiedPost {
            author_id: post.user.clone(),
            text: post.text.clone(),
            kind: KIND_PLAIN,
            files: Vec::new(),
            attachments: Vec::new(),
            extra_props: serde_json::Map::new(),
        }),
        "huddle_thread" => {
            let room = post.room.clone().unwrap_or_default();
            let author_id = if !room.created_by.is_empty() {
                room.created_by.clone()
            } else {
                post.user.clone()
            };
            let mut extra_props = serde_json::Map::new();
            extra_props.insert("start_at".to_string(), serde_json::json!(room.date_start));
            extra_props.insert("end_at".to_string(), serde_json::json!(room.date_end));
            extra_props.insert("from_plugin".to_string(), serde_json::json!(true));
            Some(ClassifiedPost {
                author_id,
                text: "Call ended".to_string(),
                kind: KIND_CUSTOM_CALLS,
                files: Vec::new(),
                attachments: vec![serde_json::json!({ "fallback": "Call ended" })],
                extra_props,
            })
        }
        _ => None,
    }
}

fn merged_files(post: &SourcePost) -> Vec<SourceFile> {
    let mut files = post.files.clone();
    if let Some(file) = &post.file {
        files.insert(0, file.clone());
    }
    files
}
