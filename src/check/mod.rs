// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Intermediate Checker (§4.7).
//!
//! A read-only consistency pass over the assembled [`Intermediate`]
//! model: it only logs warnings through the [`Logger`] port and never
//! mutates anything, matching the teacher's `transform::validate`
//! read-only sanity pass that runs after every `TransformPipeline`
//! stage.

use std::collections::{HashMap, HashSet};

use crate::config::PipelineConfig;
use crate::core::{Intermediate, IntermediatePost};
use crate::ports::Logger;
use crate::resolve::sanitize::rune_count;

/// Run every consistency check against `intermediate`, logging warnings
/// through `logger`. Never mutates `intermediate`.
pub fn check(intermediate: &Intermediate, config: &PipelineConfig, logger: &dyn Logger) {
    let channels_by_name = build_channels_by_name(intermediate, logger);
    check_posts_by_channel_name(intermediate, &channels_by_name, logger);
    check_members_are_known_users(intermediate, logger);
    check_message_lengths(intermediate, config, logger);
}

fn build_channels_by_name(intermediate: &Intermediate, logger: &dyn Logger) -> HashSet<String> {
    let mut seen = HashSet::new();

    for channel in intermediate.public_channels.iter().chain(intermediate.private_channels.iter()) {
        if !seen.insert(channel.name.clone()) {
            logger.warn("duplicate channel name", &[("name", &channel.name.as_str())]);
        }
    }

    for channel in intermediate.group_channels.iter().chain(intermediate.direct_channels.iter()) {
        let mut members = channel.members.clone();
        members.sort();
        let key = members.join(",");
        if !seen.insert(key.clone()) {
            logger.warn("duplicate direct/group channel membership key", &[("key", &key.as_str())]);
        }
    }

    seen
}

fn check_posts_by_channel_name(intermediate: &Intermediate, channels_by_name: &HashSet<String>, logger: &dyn Logger) {
    let mut posts_by_channel_name: HashMap<&str, usize> = HashMap::new();
    for post in &intermediate.posts {
        *posts_by_channel_name.entry(post.channel.as_str()).or_insert(0) += 1;
    }
    for channel_name in posts_by_channel_name.keys() {
        if !channels_by_name.contains(*channel_name) {
            logger.warn(
                "posts reference a channel absent from the resolved channel tables",
                &[("channel", channel_name)],
            );
        }
    }
}

fn check_members_are_known_users(intermediate: &Intermediate, logger: &dyn Logger) {
    let channels = intermediate
        .public_channels
        .iter()
        .chain(intermediate.private_channels.iter())
        .chain(intermediate.group_channels.iter())
        .chain(intermediate.direct_channels.iter());
    for channel in channels {
        for member_id in &channel.members {
            if !intermediate.users_by_id.contains_key(member_id) {
                logger.warn(
                    "channel member id has no matching resolved user",
                    &[("channel", &channel.name.as_str()), ("member_id", &member_id.as_str())],
                );
            }
        }
    }
}

fn check_message_lengths(intermediate: &Intermediate, config: &PipelineConfig, logger: &dyn Logger) {
    for post in &intermediate.posts {
        check_post_length(post, config, logger);
    }
}

fn check_post_length(post: &IntermediatePost, config: &PipelineConfig, logger: &dyn Logger) {
    if rune_count(&post.message) > config.max_message_length {
        logger.warn(
            "post exceeds the configured maximum message length",
            &[("channel", &post.channel.as_str()), ("create_at", &post.create_at)],
        );
    }
    for reply in &post.replies {
        check_post_length(reply, config, logger);
    }
}
