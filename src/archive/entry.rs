// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Entry path classification (§4.1 table).

use crate::core::ChannelKind;

use super::{matches_workspace, strip_workspace, CHANNELS_JSON, DMS_JSON, GROUPS_JSON, MPIMS_JSON, USERS_JSON};

/// What kind of record a given archive entry path holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// One of the four channel catalogs.
    ChannelCatalog(ChannelKind),
    /// The user catalog.
    UserCatalog,
    /// A per-channel daily post batch, e.g. `general/2020-01-01.json`.
    PostBatch {
        /// Channel name (first path segment).
        channel: String,
    },
    /// An embedded file upload, `__uploads/<file_id>/<name>`.
    Upload {
        /// File id (the directory name under `__uploads/`).
        file_id: String,
    },
    /// A profile picture; not consumed by this pipeline but recognized so
    /// it is not logged as unclassified noise.
    ProfilePicture,
    /// Anything else, ignored.
    Ignored,
}

/// Classify `path` within workspace `ws`. Returns `None` if `path` does not
/// belong to `ws` at all.
pub fn classify_entry(path: &str, ws: &str) -> Option<EntryKind> {
    if !matches_workspace(path, ws) {
        return None;
    }
    let relative = strip_workspace(path, ws);

    if relative == CHANNELS_JSON {
        return Some(EntryKind::ChannelCatalog(ChannelKind::Open));
    }
    if relative == GROUPS_JSON {
        return Some(EntryKind::ChannelCatalog(ChannelKind::Private));
    }
    if relative == MPIMS_JSON {
        return Some(EntryKind::ChannelCatalog(ChannelKind::Group));
    }
    if relative == DMS_JSON {
        return Some(EntryKind::ChannelCatalog(ChannelKind::Direct));
    }
    if relative == USERS_JSON {
        return Some(EntryKind::UserCatalog);
    }
    if let Some(rest) = relative.strip_prefix("__uploads/") {
        let file_id = rest.split('/').next().unwrap_or_default();
        if !file_id.is_empty() {
            return Some(EntryKind::Upload {
                file_id: file_id.to_string(),
            });
        }
        return Some(EntryKind::Ignored);
    }
    if relative.starts_with("profile_pictures/") {
        return Some(EntryKind::ProfilePicture);
    }
    // `<chan>/<date>.json`: exactly one directory segment, ending in
    // ".json", and not one of the reserved top-level names handled above.
    if let Some((channel, rest)) = relative.split_once('/') {
        if !channel.is_empty()
            && !rest.contains('/')
            && rest.ends_with(".json")
            && channel != "__uploads"
            && channel != "profile_pictures"
        {
            return Some(EntryKind::PostBatch {
                channel: channel.to_string(),
            });
        }
    }
    Some(EntryKind::Ignored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_catalogs() {
        assert_eq!(
            classify_entry("channels.json", ""),
            Some(EntryKind::ChannelCatalog(ChannelKind::Open))
        );
        assert_eq!(
            classify_entry("groups.json", ""),
            Some(EntryKind::ChannelCatalog(ChannelKind::Private))
        );
        assert_eq!(
            classify_entry("mpims.json", ""),
            Some(EntryKind::ChannelCatalog(ChannelKind::Group))
        );
        assert_eq!(
            classify_entry("dms.json", ""),
            Some(EntryKind::ChannelCatalog(ChannelKind::Direct))
        );
        assert_eq!(classify_entry("users.json", ""), Some(EntryKind::UserCatalog));
    }

    #[test]
    fn classifies_post_batch() {
        assert_eq!(
            classify_entry("general/2020-01-01.json", ""),
            Some(EntryKind::PostBatch {
                channel: "general".to_string()
            })
        );
    }

    #[test]
    fn classifies_upload() {
        assert_eq!(
            classify_entry("__uploads/F123/photo.png", ""),
            Some(EntryKind::Upload {
                file_id: "F123".to_string()
            })
        );
    }

    #[test]
    fn classifies_profile_picture_and_ignored() {
        assert_eq!(
            classify_entry("profile_pictures/U1.png", ""),
            Some(EntryKind::ProfilePicture)
        );
        assert_eq!(classify_entry("README.md", ""), Some(EntryKind::Ignored));
    }

    #[test]
    fn respects_workspace_prefix() {
        assert_eq!(classify_entry("teams/acme/channels.json", ""), None);
        assert_eq!(
            classify_entry("teams/acme/channels.json", "acme"),
            Some(EntryKind::ChannelCatalog(ChannelKind::Open))
        );
        assert_eq!(
            classify_entry("teams/acme/general/2020-01-01.json", "acme"),
            Some(EntryKind::PostBatch {
                channel: "general".to_string()
            })
        );
    }
}
