// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Catalog parsing: `channels.json`, `groups.json`, `mpims.json`,
//! `dms.json`, `users.json`.

use crate::core::model::{SourceChannel, SourceUser};
use crate::core::{ChannelKind, ParseError};
use crate::ports::Logger;

use super::decode_tolerant_array;

/// Decode one channel catalog file, tagging every record with `kind`.
pub fn parse_channel_catalog(
    bytes: &[u8],
    catalog_name: &str,
    kind: ChannelKind,
    logger: &dyn Logger,
) -> Result<Vec<SourceChannel>, ParseError> {
    let mut channels: Vec<SourceChannel> = decode_tolerant_array(bytes, catalog_name, logger)?;
    for channel in &mut channels {
        channel.kind = Some(kind);
    }
    Ok(channels)
}

/// Decode `users.json` (or its `USERS_JSON_FILE` override).
pub fn parse_user_catalog(bytes: &[u8], logger: &dyn Logger) -> Result<Vec<SourceUser>, ParseError> {
    decode_tolerant_array(bytes, "users.json", logger)
}
