// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Attachment Acquirer (§4.5).
//!
//! Drains each post's `pending_files` (populated by the assembler) into
//! its `attachments` list of destination paths, extracting embedded
//! uploads from the archive or, when enabled, resuming a download from
//! the file's source URL. Grounded on the teacher's `io::traits`
//! abstraction over heterogeneous byte sources, generalized here from
//! "mmap vs. buffer" to "archive entry vs. network body".

pub mod download;
pub mod filename;

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use crate::archive::ArchiveSource;
use crate::config::PipelineConfig;
use crate::core::{AcquireError, IntermediatePost, SourceFile};
use crate::ports::{HttpClient, Logger};

/// Relative directory, under the output directory, that holds acquired
/// attachments (§4.5: "destination relative path `bulk-export-attachments/…`").
pub const ATTACHMENTS_DIR: &str = "bulk-export-attachments";

/// Drives attachment acquisition for every post and reply in a tree,
/// against one archive source.
pub struct Acquirer<'a, R: Read + Seek> {
    archive: &'a mut ArchiveSource<R>,
    uploads: &'a HashMap<String, String>,
    config: &'a PipelineConfig,
    http_client: &'a dyn HttpClient,
    logger: &'a dyn Logger,
    output_dir: &'a Path,
}

impl<'a, R: Read + Seek> Acquirer<'a, R> {
    /// Build an acquirer over `archive`, resolving embedded uploads via
    /// `uploads` (file id → archive entry path) and writing destination
    /// files under `output_dir`.
    pub fn new(
        archive: &'a mut ArchiveSource<R>,
        uploads: &'a HashMap<String, String>,
        config: &'a PipelineConfig,
        http_client: &'a dyn HttpClient,
        logger: &'a dyn Logger,
        output_dir: &'a Path,
    ) -> Self {
        Self {
            archive,
            uploads,
            config,
            http_client,
            logger,
            output_dir,
        }
    }

    /// Acquire attachments for every post and, recursively, every reply.
    /// A no-op when `config.skip_attachments` is set.
    pub fn acquire_all(&mut self, posts: &mut [IntermediatePost]) {
        if self.config.skip_attachments {
            return;
        }
        for post in posts {
            self.acquire_post(post);
        }
    }

    fn acquire_post(&mut self, post: &mut IntermediatePost) {
        let pending = std::mem::take(&mut post.pending_files);
        for file in pending {
            match self.acquire_one(&file) {
                Ok(relative_path) => post.attachments.push(relative_path),
                Err(err) => self.logger.warn(
                    "skipping attachment",
                    &[("file_id", &file.id.as_str()), ("error", &err.to_string().as_str())],
                ),
            }
        }
        self.acquire_all(&mut post.replies);
    }

    fn acquire_one(&mut self, file: &SourceFile) -> Result<String, AcquireError> {
        let normalized = filename::normalize_filename(&file.name);
        let relative_path = format!("{ATTACHMENTS_DIR}/{}_{normalized}", file.id);
        let destination = self.output_dir.join(&relative_path);

        let io_err = |e: std::io::Error| AcquireError::Io {
            file_id: file.id.clone(),
            message: e.to_string(),
        };

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        if let Some(entry_path) = self.uploads.get(&file.id) {
            let bytes = self
                .archive
                .read_entry(entry_path)
                .map_err(|e| AcquireError::Io {
                    file_id: file.id.clone(),
                    message: e.to_string(),
                })?;
            std::fs::write(&destination, bytes).map_err(io_err)?;
            return Ok(relative_path);
        }

        if self.config.allow_download {
            if let Some(url) = &file.download_url {
                download::download_resumable(self.http_client, url, &destination, file.size)?;
                return Ok(relative_path);
            }
        }

        Err(AcquireError::NotAvailable {
            file_id: file.id.clone(),
        })
    }
}
