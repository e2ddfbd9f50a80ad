// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Post Assembler (§4.4).
//!
//! Classifies every source post, resolves its author (synthesizing a
//! placeholder when necessary), rewrites its text, assembles reply
//! threads, and splits oversized text/attachment lists into chained
//! reply posts. Grounded on the teacher's `transform::TransformPipeline`,
//! which drives a fixed sequence of per-record passes over a shared
//! mutable accumulator.

pub mod classify;
pub mod split;
pub mod threads;
pub mod timestamp;

use std::collections::HashMap;

use crate::config::{PipelineConfig, MAX_ATTACHMENTS_PER_POST};
use crate::core::model::SourceCatalogs;
use crate::core::{ChannelKind, IntermediatePost, IntermediateReaction};
use crate::ports::Logger;
use crate::resolve::sanitize::rune_count;
use crate::resolve::{resolve_or_synthesize, ResolvedIdentities};
use crate::rewrite::RewriteContext;

use classify::ClassifiedPost;
use threads::ThreadTracker;

struct ChannelInfo {
    name: String,
    kind: ChannelKind,
    member_usernames: Vec<String>,
}

fn build_channel_lookup(identities: &ResolvedIdentities) -> HashMap<String, ChannelInfo> {
    identities
        .public_channels
        .iter()
        .chain(identities.private_channels.iter())
        .chain(identities.group_channels.iter())
        .chain(identities.direct_channels.iter())
        .map(|channel| {
            (
                channel.original_name.clone(),
                ChannelInfo {
                    name: channel.name.clone(),
                    kind: channel.kind,
                    member_usernames: channel.member_usernames.clone(),
                },
            )
        })
        .collect()
}

/// Assemble every channel's post batch into the flattened, thread-rooted
/// global posts list.
pub fn assemble(
    catalogs: &SourceCatalogs,
    identities: &mut ResolvedIdentities,
    rewrite_ctx: &RewriteContext,
    config: &PipelineConfig,
    logger: &dyn Logger,
) -> Vec<IntermediatePost> {
    let channel_lookup = build_channel_lookup(identities);

    let mut posts = Vec::new();
    for (channel_name, batch) in &catalogs.posts {
        let Some(info) = channel_lookup.get(channel_name) else {
            logger.warn(
                "dropping post batch for unknown channel",
                &[("channel", &channel_name.as_str())],
            );
            continue;
        };

        let mut sorted: Vec<&crate::core::SourcePost> = batch.iter().collect();
        sorted.sort_by_key(|post| timestamp::convert_ts(&post.ts));

        let mut tracker = ThreadTracker::new();
        let mut roots: Vec<IntermediatePost> = Vec::new();

        for source in sorted {
            let Some(classified) = classify::classify(source) else {
                logger.warn(
                    "dropping post with unrecognized subtype",
                    &[("channel", &channel_name.as_str()), ("subtype", &source.subtype.as_str())],
                );
                continue;
            };

            if classified.author_id.is_empty() {
                logger.warn(
                    "dropping post with no resolvable author",
                    &[("channel", &channel_name.as_str())],
                );
                continue;
            }

            let Some(props) = build_props(&classified, config, rewrite_ctx) else {
                if config.discard_invalid_props {
                    logger.warn(
                        "dropping post with oversized props",
                        &[("channel", &channel_name.as_str())],
                    );
                    continue;
                }
                unreachable!("build_props only returns None when discard_invalid_props is set");
            };

            let username = resolve_or_synthesize(&mut identities.users_by_id, &classified.author_id)
                .username
                .clone();
            let reactions = resolve_reactions(&source.reactions, &mut identities.users_by_id);
            let message = rewrite_ctx.rewrite(&classified.text);

            let is_direct = matches!(info.kind, ChannelKind::Group | ChannelKind::Direct);
            let create_at = tracker.reserve_create_at(timestamp::convert_ts(&source.ts));

            let (first_files, overflow_files) = split_attachments(classified.files.clone());

            let mut main_post = IntermediatePost {
                user: username.clone(),
                channel: info.name.clone(),
                message,
                props,
                create_at,
                kind: classified.kind.to_string(),
                attachments: Vec::new(),
                replies: Vec::new(),
                reactions,
                is_direct,
                channel_members: if is_direct {
                    info.member_usernames.clone()
                } else {
                    Vec::new()
                },
                pending_files: first_files,
            };

            let mut extra_replies = Vec::new();
            extra_replies.extend(attachment_overflow_replies(
                overflow_files,
                &info.name,
                &username,
                is_direct,
                &info.member_usernames,
                create_at,
                &mut tracker,
            ));

            let message_chunks = split::split_text(&main_post.message, config.max_message_length);
            if message_chunks.len() > 1 {
                main_post.message = message_chunks[0].clone();
                extra_replies.extend(text_overflow_replies(
                    &message_chunks[1..],
                    &info.name,
                    &username,
                    is_direct,
                    &info.member_usernames,
                    create_at,
                    &mut tracker,
                ));
            }

            let thread_ts = &source.thread_ts;
            if !thread_ts.is_empty() && thread_ts != &source.ts {
                match tracker.root_index(thread_ts) {
                    Some(idx) => {
                        roots[idx].replies.push(main_post);
                        roots[idx].replies.extend(extra_replies);
                    }
                    None => {
                        logger.warn(
                            "dropping reply with no matching thread root",
                            &[("channel", &channel_name.as_str()), ("thread_ts", &thread_ts.as_str())],
                        );
                    }
                }
            } else {
                let idx = roots.len();
                tracker.register_root(source.ts.clone(), idx);
                roots.push(main_post);
                roots[idx].replies.extend(extra_replies);
            }
        }

        threads::sort_replies(&mut roots);
        posts.extend(roots);
    }

    posts
}

/// Split a post's files into the first 5 (attached directly) and the
/// remainder (overflowed into synthetic replies).
fn split_attachments(
    mut files: Vec<crate::core::SourceFile>,
) -> (Vec<crate::core::SourceFile>, Vec<crate::core::SourceFile>) {
    if files.len() <= MAX_ATTACHMENTS_PER_POST {
        (files, Vec::new())
    } else {
        let overflow = files.split_off(MAX_ATTACHMENTS_PER_POST);
        (files, overflow)
    }
}

/// Build zero-text replies for files beyond the per-post attachment cap,
/// chunked into groups of at most 5 (§4.4 "Attachment overflow").
fn attachment_overflow_replies(
    overflow_files: Vec<crate::core::SourceFile>,
    channel_name: &str,
    username: &str,
    is_direct: bool,
    member_usernames: &[String],
    base_create_at: i64,
    tracker: &mut ThreadTracker,
) -> Vec<IntermediatePost> {
    let mut replies = Vec::new();
    for (i, chunk) in overflow_files.chunks(MAX_ATTACHMENTS_PER_POST).enumerate() {
        let create_at = tracker.reserve_create_at(base_create_at + i as i64 + 1);
        replies.push(IntermediatePost {
            user: username.to_string(),
            channel: channel_name.to_string(),
            message: String::new(),
            props: serde_json::Map::new(),
            create_at,
            kind: classify::KIND_PLAIN.to_string(),
            attachments: Vec::new(),
            replies: Vec::new(),
            reactions: Vec::new(),
            is_direct,
            channel_members: if is_direct { member_usernames.to_vec() } else { Vec::new() },
            pending_files: chunk.to_vec(),
        });
    }
    replies
}

/// Build plain-text replies for message chunks beyond the first
/// (§4.4 "Text splitting").
fn text_overflow_replies(
    chunks: &[String],
    channel_name: &str,
    username: &str,
    is_direct: bool,
    member_usernames: &[String],
    base_create_at: i64,
    tracker: &mut ThreadTracker,
) -> Vec<IntermediatePost> {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let create_at = tracker.reserve_create_at(base_create_at + i as i64 + 1);
            IntermediatePost {
                user: username.to_string(),
                channel: channel_name.to_string(),
                message: chunk.clone(),
                props: serde_json::Map::new(),
                create_at,
                kind: classify::KIND_PLAIN.to_string(),
                attachments: Vec::new(),
                replies: Vec::new(),
                reactions: Vec::new(),
                is_direct,
                channel_members: if is_direct { member_usernames.to_vec() } else { Vec::new() },
                pending_files: Vec::new(),
            }
        })
        .collect()
}

fn resolve_reactions(
    source_reactions: &[crate::core::SourceReaction],
    users_by_id: &mut crate::core::model::indexmap_like::InsertionOrderedMap<
        String,
        crate::core::IntermediateUser,
    >,
) -> Vec<IntermediateReaction> {
    source_reactions
        .iter()
        .map(|reaction| IntermediateReaction {
            name: reaction.name.clone(),
            users: reaction
                .users
                .iter()
                .map(|id| resolve_or_synthesize(users_by_id, id).username.clone())
                .collect(),
        })
        .collect()
}

/// Marshal a classified post's attachments and extra fields into
/// `props`, rewriting attachment fallback/text fields. Returns `None`
/// when the serialized length exceeds `config.max_props_length` and
/// `discard_invalid_props` is set (the caller drops the whole post);
/// otherwise over-length props are simply omitted (empty map).
fn build_props(
    classified: &ClassifiedPost,
    config: &PipelineConfig,
    rewrite_ctx: &RewriteContext,
) -> Option<serde_json::Map<String, serde_json::Value>> {
    let mut props = classified.extra_props.clone();
    if !classified.attachments.is_empty() {
        let rewritten: Vec<serde_json::Value> = classified
            .attachments
            .iter()
            .map(|attachment| rewrite_attachment_text(attachment, rewrite_ctx))
            .collect();
        props.insert("attachments".to_string(), serde_json::Value::Array(rewritten));
    }

    if props.is_empty() {
        return Some(props);
    }

    let serialized = serde_json::to_string(&props).unwrap_or_default();
    if rune_count(&serialized) > config.max_props_length {
        if config.discard_invalid_props {
            None
        } else {
            Some(serde_json::Map::new())
        }
    } else {
        Some(props)
    }
}

/// Rewrite an attachment block's `fallback`/`text` string fields
/// (§4.2: rewriting applies "to both post text and any attachment's
/// fallback text").
fn rewrite_attachment_text(value: &serde_json::Value, rewrite_ctx: &RewriteContext) -> serde_json::Value {
    let serde_json::Value::Object(map) = value else {
        return value.clone();
    };
    let mut rewritten = serde_json::Map::new();
    for (key, field) in map {
        if (key == "fallback" || key == "text") {
            if let serde_json::Value::String(text) = field {
                rewritten.insert(key.clone(), serde_json::Value::String(rewrite_ctx.rewrite(text)));
                continue;
            }
        }
        rewritten.insert(key.clone(), field.clone());
    }
    serde_json::Value::Object(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{SourceChannel, SourcePost, SourceTextField, SourceUser};
    use crate::ports::PanicExitHook;

    fn user(id: &str, username: &str) -> SourceUser {
        SourceUser {
            id: id.to_string(),
            username: username.to_string(),
            is_bot: false,
            deleted: false,
            profile: crate::core::model::SourceProfile {
                real_name: "Name".to_string(),
                email: format!("{username}@example.com"),
                title: String::new(),
                bot_id: String::new(),
            },
        }
    }

    fn channel(name: &str, members: &[&str]) -> SourceChannel {
        SourceChannel {
            id: "C1".to_string(),
            name: name.to_string(),
            creator: String::new(),
            members: members.iter().map(|s| s.to_string()).collect(),
            purpose: SourceTextField::default(),
            topic: SourceTextField::default(),
            kind: Some(ChannelKind::Open),
        }
    }

    fn plain_post(user: &str, ts: &str, thread_ts: &str, text: &str) -> SourcePost {
        SourcePost {
            user: user.to_string(),
            bot_id: String::new(),
            bot_username: String::new(),
            text: text.to_string(),
            ts: ts.to_string(),
            thread_ts: thread_ts.to_string(),
            kind: "message".to_string(),
            subtype: String::new(),
            comment: None,
            file: None,
            files: Vec::new(),
            attachments: Vec::new(),
            reactions: Vec::new(),
            room: None,
        }
    }

    fn setup() -> (SourceCatalogs, ResolvedIdentities, RewriteContext, PipelineConfig) {
        let catalogs = SourceCatalogs {
            channels: vec![channel("general", &["U1"])],
            users: vec![user("U1", "alice")],
            ..Default::default()
        };
        let config = PipelineConfig::default();
        let identities = crate::resolve::resolve(&catalogs, &config, &PanicExitHook, 0);
        let rewrite_ctx = RewriteContext::new([], []);
        (catalogs, identities, rewrite_ctx, config)
    }

    #[test]
    fn assembles_a_simple_root_post() {
        let (mut catalogs, mut identities, rewrite_ctx, config) = setup();
        catalogs
            .posts
            .insert("general".to_string(), vec![plain_post("U1", "100.000000", "", "hi there")]);
        let posts = assemble(&catalogs, &mut identities, &rewrite_ctx, &config, &crate::ports::TracingLogger);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].user, "alice");
        assert_eq!(posts[0].message, "hi there");
        assert_eq!(posts[0].channel, "general");
    }

    #[test]
    fn reply_attaches_to_its_thread_root() {
        let (mut catalogs, mut identities, rewrite_ctx, config) = setup();
        catalogs.posts.insert(
            "general".to_string(),
            vec![
                plain_post("U1", "100.000000", "", "root"),
                plain_post("U1", "101.000000", "100.000000", "a reply"),
            ],
        );
        let posts = assemble(&catalogs, &mut identities, &rewrite_ctx, &config, &crate::ports::TracingLogger);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].replies.len(), 1);
        assert_eq!(posts[0].replies[0].message, "a reply");
    }

    #[test]
    fn unknown_channel_batch_is_dropped() {
        let (mut catalogs, mut identities, rewrite_ctx, config) = setup();
        catalogs
            .posts
            .insert("ghost-channel".to_string(), vec![plain_post("U1", "100.000000", "", "hi")]);
        let posts = assemble(&catalogs, &mut identities, &rewrite_ctx, &config, &crate::ports::TracingLogger);
        assert!(posts.is_empty());
    }

    #[test]
    fn oversized_message_is_split_into_replies() {
        let (mut catalogs, mut identities, rewrite_ctx, mut config) = setup();
        config.max_message_length = 10;
        let long_text = "word ".repeat(10);
        catalogs
            .posts
            .insert("general".to_string(), vec![plain_post("U1", "100.000000", "", &long_text)]);
        let posts = assemble(&catalogs, &mut identities, &rewrite_ctx, &config, &crate::ports::TracingLogger);
        assert_eq!(posts.len(), 1);
        assert!(!posts[0].replies.is_empty());
        let mut rejoined = posts[0].message.clone();
        for reply in &posts[0].replies {
            rejoined.push(' ');
            rejoined.push_str(&reply.message);
        }
        assert_eq!(
            rejoined.split_whitespace().collect::<Vec<_>>(),
            long_text.split_whitespace().collect::<Vec<_>>()
        );
    }

    #[test]
    fn missing_author_reference_synthesizes_placeholder() {
        let (mut catalogs, mut identities, rewrite_ctx, config) = setup();
        catalogs.posts.insert(
            "general".to_string(),
            vec![plain_post("U_MISSING", "100.000000", "", "hi")],
        );
        let posts = assemble(&catalogs, &mut identities, &rewrite_ctx, &config, &crate::ports::TracingLogger);
        assert_eq!(posts[0].user, "u_missing");
    }
}
