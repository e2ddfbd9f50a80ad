// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Channel identity resolution: sanitization, member filtering, and
//! group→private reclassification (§4.3).

use std::collections::HashSet;

use crate::config::PipelineConfig;
use crate::core::model::SourceChannel;
use crate::core::{ChannelKind, IntermediateChannel};

use super::sanitize::{cap_runes, sanitize_channel_name};

/// Resolve one [`SourceChannel`] into an [`IntermediateChannel`], or
/// `None` if it should be dropped (filtered by `channel_only`, or a
/// direct/group channel left with ≤1 known member after filtering).
pub fn transform_channel(
    source: &SourceChannel,
    config: &PipelineConfig,
    known_user_ids: &HashSet<String>,
) -> Option<IntermediateChannel> {
    if let Some(only) = &config.channel_only {
        if &source.name != only {
            return None;
        }
    }

    let kind = source.kind.unwrap_or(ChannelKind::Open);

    let mut members = source.members.clone();
    if matches!(kind, ChannelKind::Direct | ChannelKind::Group) {
        members.retain(|id| known_user_ids.contains(id));
        if members.len() <= 1 {
            return None;
        }
    }

    let (resolved_kind, name_source) = if kind == ChannelKind::Group
        && members.len() > config.max_group_channel_members
    {
        (ChannelKind::Private, source.purpose.value.clone())
    } else {
        (kind, source.name.clone())
    };

    let name = sanitize_channel_name(&name_source, &source.id, config.max_channel_name_length);
    let display_name = name.clone();
    let purpose = cap_runes(&source.purpose.value, config.max_purpose_length);
    let header = cap_runes(&source.topic.value, config.max_header_length);

    Some(IntermediateChannel {
        id: source.id.clone(),
        original_name: source.name.clone(),
        name,
        display_name,
        members,
        member_usernames: Vec::new(),
        purpose,
        header,
        topic: source.topic.value.clone(),
        kind: resolved_kind,
    })
}
