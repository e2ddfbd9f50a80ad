// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Archive Reader (§4.1).
//!
//! Enumerates ZIP archive entries, classifies each by path under an
//! optional `teams/<workspace>/` prefix, and hands the matching bytes to
//! [`crate::parse`]. Works against any `Read + Seek` source, so tests can
//! build an in-memory archive with [`std::io::Cursor`] the way the teacher's
//! `FormatReader` abstracts over mmap'd files and buffers (`io::traits`).

mod entry;

pub use entry::{EntryKind, classify_entry};

use std::collections::HashSet;
use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::core::ArchiveError;

/// The five well-known catalog file names.
pub const CHANNELS_JSON: &str = "channels.json";
pub const GROUPS_JSON: &str = "groups.json";
pub const MPIMS_JSON: &str = "mpims.json";
pub const DMS_JSON: &str = "dms.json";
pub const USERS_JSON: &str = "users.json";

/// Files that must be present (directly or under a subdirectory) for
/// [`precheck`] to pass.
const REQUIRED_FILES: &[&str] = &["channels.json", "integration_logs.json"];

/// A seekable export archive, wrapping `zip::ZipArchive`.
pub struct ArchiveSource<R: Read + Seek> {
    inner: ZipArchive<R>,
}

impl<R: Read + Seek> ArchiveSource<R> {
    /// Open an archive from any seekable byte source.
    pub fn open(reader: R) -> Result<Self, ArchiveError> {
        let inner = ZipArchive::new(reader).map_err(|e| ArchiveError::Open {
            message: e.to_string(),
        })?;
        Ok(Self { inner })
    }

    /// Names of every entry in the archive, in archive order.
    pub fn entry_names(&self) -> Vec<String> {
        self.inner.file_names().map(|s| s.to_string()).collect()
    }

    /// Read one entry's full contents into memory.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let mut file = self
            .inner
            .by_name(name)
            .map_err(|e| ArchiveError::EntryOpen {
                path: name.to_string(),
                message: e.to_string(),
            })?;
        let mut buf = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut buf)
            .map_err(|e| ArchiveError::EntryOpen {
                path: name.to_string(),
                message: e.to_string(),
            })?;
        Ok(buf)
    }

    /// Run the archive's precheck: every name in `integration_logs.json`/
    /// `channels.json` must have a matching entry somewhere in the archive
    /// (root or under any subdirectory).
    pub fn precheck(&self) -> Result<(), ArchiveError> {
        let names = self.entry_names();
        for required in REQUIRED_FILES {
            let found = names.iter().any(|n| n == required || n.ends_with(&format!("/{required}")));
            if !found {
                return Err(ArchiveError::MissingRequiredFile {
                    name: required.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Scan entry names for `teams/<name>/…` prefixes and return the distinct
/// workspace names, excluding any whose first path segment after `teams/`
/// is hidden (dot-prefixed).
pub fn detect_workspaces<I, S>(entry_names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for name in entry_names {
        let name = name.as_ref();
        if let Some(rest) = name.strip_prefix("teams/") {
            if let Some((workspace, _)) = rest.split_once('/') {
                if !workspace.is_empty() && !workspace.starts_with('.') && seen.insert(workspace.to_string()) {
                    ordered.push(workspace.to_string());
                }
            }
        }
    }
    ordered
}

/// Whether `path` belongs to workspace `ws` (`""` selects the flat,
/// single-workspace layout).
pub fn matches_workspace(path: &str, ws: &str) -> bool {
    if ws.is_empty() {
        !path.starts_with("teams/")
    } else {
        path.starts_with(&format!("teams/{ws}/"))
    }
}

/// Strip the workspace prefix from a path, returning the path as it would
/// appear in a flat-layout archive.
pub fn strip_workspace<'a>(path: &'a str, ws: &str) -> &'a str {
    if ws.is_empty() {
        path
    } else {
        path.strip_prefix(&format!("teams/{ws}/")).unwrap_or(path)
    }
}
