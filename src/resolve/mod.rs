// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Identity & Channel Resolver (§4.3).
//!
//! Builds the intermediate user and channel tables from the parsed
//! catalogs: sanitizes names and limits, synthesizes placeholder users,
//! splits oversized group channels into private channels, and populates
//! cross-reference membership lists.

pub mod channels;
pub mod sanitize;
pub mod users;

pub use channels::transform_channel;
pub use users::{resolve_or_synthesize, synthesize_placeholder_user, transform_user};

use std::collections::HashSet;

use crate::config::PipelineConfig;
use crate::core::model::{indexmap_like::InsertionOrderedMap, SourceCatalogs};
use crate::core::{ChannelKind, IntermediateChannel, IntermediateUser};
use crate::ports::ExitHook;

/// The fully resolved user and channel tables, ready for the Post
/// Assembler.
#[derive(Debug, Clone, Default)]
pub struct ResolvedIdentities {
    /// Resolved users, keyed by id, in insertion order.
    pub users_by_id: InsertionOrderedMap<String, IntermediateUser>,
    /// Public (open) channels.
    pub public_channels: Vec<IntermediateChannel>,
    /// Private channels, including group channels reclassified for
    /// exceeding the group cap.
    pub private_channels: Vec<IntermediateChannel>,
    /// Group channels within the cap.
    pub group_channels: Vec<IntermediateChannel>,
    /// Direct (two-person) channels.
    pub direct_channels: Vec<IntermediateChannel>,
}

/// Resolve every user and channel in `catalogs`.
pub fn resolve(
    catalogs: &SourceCatalogs,
    config: &PipelineConfig,
    exit_hook: &dyn ExitHook,
    now_millis: i64,
) -> ResolvedIdentities {
    let mut users_by_id = InsertionOrderedMap::new();
    for source_user in &catalogs.users {
        let resolved = transform_user(source_user, config, exit_hook, now_millis);
        users_by_id.insert(resolved.id.clone(), resolved);
    }

    let known_user_ids: HashSet<String> = catalogs
        .users
        .iter()
        .map(|u| {
            if u.is_bot && !u.profile.bot_id.is_empty() {
                u.profile.bot_id.clone()
            } else {
                u.id.clone()
            }
        })
        .collect();

    let mut identities = ResolvedIdentities {
        users_by_id,
        ..Default::default()
    };

    for source_channel in catalogs
        .channels
        .iter()
        .chain(catalogs.groups.iter())
        .chain(catalogs.mpims.iter())
        .chain(catalogs.dms.iter())
    {
        let Some(mut channel) = transform_channel(source_channel, config, &known_user_ids) else {
            continue;
        };
        channel.member_usernames = channel
            .members
            .iter()
            .filter_map(|id| identities.users_by_id.get(id))
            .map(|u| u.username.clone())
            .collect();

        match channel.kind {
            ChannelKind::Open => identities.public_channels.push(channel),
            ChannelKind::Private => identities.private_channels.push(channel),
            ChannelKind::Group => identities.group_channels.push(channel),
            ChannelKind::Direct => identities.direct_channels.push(channel),
        }
    }

    populate_memberships(&mut identities);
    identities
}

/// For every user, compute the list of public+private channel names they
/// belong to (§4.3: "Populate memberships").
fn populate_memberships(identities: &mut ResolvedIdentities) {
    let channels = identities
        .public_channels
        .iter()
        .chain(identities.private_channels.iter());
    for channel in channels {
        for member_id in &channel.members {
            if let Some(user) = identities.users_by_id.get_mut(member_id) {
                user.memberships.push(channel.name.clone());
            }
        }
    }
}
