// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Top-level pipeline facade (§4.10).
//!
//! [`Pipeline`] owns a [`PipelineConfig`] and the three collaborator ports
//! and drives every stage, in order, over one archive. Grounded on the
//! teacher's `RoboRewriter` facade, which likewise owns a config plus a set
//! of collaborators and sequences format-specific rewriters behind one
//! entry point rather than leaving callers to wire up each stage by hand.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::acquire::Acquirer;
use crate::archive::{self, ArchiveSource, EntryKind};
use crate::assemble;
use crate::check;
use crate::config::PipelineConfig;
use crate::core::model::{ChannelKind, Intermediate, SourceCatalogs};
use crate::core::{PipelineError, Result};
use crate::emit::{self, ChunkMetadata};
use crate::parse::{self, catalog};
use crate::ports::{ExitHook, HttpClient, Logger};
use crate::resolve::{self, ResolvedIdentities};
use crate::rewrite::RewriteContext;

/// Summary of one completed pipeline run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of users written to the `users.json`-derived table.
    pub users_written: usize,
    /// Number of channels written, across every kind.
    pub channels_written: usize,
    /// Number of root posts written (replies are nested and not counted
    /// separately here).
    pub posts_written: usize,
    /// Metadata for every chunk file written, in order.
    pub chunks: Vec<ChunkMetadata>,
    /// Number of warnings logged over the course of the run.
    pub warnings_emitted: usize,
    /// Directory the output was written to.
    pub output_dir: PathBuf,
}

/// Wraps a caller-supplied [`Logger`] to count `warn` calls, so
/// [`RunReport::warnings_emitted`] can be populated without requiring every
/// `Logger` implementation to track its own call count.
struct CountingLogger<'a> {
    inner: &'a dyn Logger,
    warnings: AtomicUsize,
}

impl<'a> CountingLogger<'a> {
    fn new(inner: &'a dyn Logger) -> Self {
        Self {
            inner,
            warnings: AtomicUsize::new(0),
        }
    }

    fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }
}

impl<'a> Logger for CountingLogger<'a> {
    fn debug(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        self.inner.debug(message, fields);
    }

    fn info(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        self.inner.info(message, fields);
    }

    fn warn(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
        self.inner.warn(message, fields);
    }

    fn error(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        self.inner.error(message, fields);
    }
}

/// Drives stages 1 through 8 — Archive Reader, JSON Parsers, Rewriter
/// context construction, Identity/Channel Resolver, Post Assembler,
/// Attachment Acquirer, Intermediate Checker, Emitter — over one archive.
pub struct Pipeline<'a> {
    config: PipelineConfig,
    logger: &'a dyn Logger,
    exit_hook: &'a dyn ExitHook,
    http_client: &'a dyn HttpClient,
}

impl<'a> Pipeline<'a> {
    /// Build a pipeline over `config`, delegating to the given collaborator
    /// ports for logging, fatal termination, and HTTP downloads.
    pub fn new(
        config: PipelineConfig,
        logger: &'a dyn Logger,
        exit_hook: &'a dyn ExitHook,
        http_client: &'a dyn HttpClient,
    ) -> Self {
        Self {
            config,
            logger,
            exit_hook,
            http_client,
        }
    }

    /// Run the full pipeline against `archive_path`, writing output chunks
    /// under `output_dir`. Never cancels.
    pub fn run(&self, archive_path: &Path, output_dir: &Path) -> Result<RunReport> {
        self.run_cancellable(archive_path, output_dir, &|| false)
    }

    /// Run the full pipeline, checking `should_cancel` at each stage
    /// boundary (§5) and returning [`PipelineError::Cancelled`] as soon as
    /// it reports `true`.
    pub fn run_cancellable(
        &self,
        archive_path: &Path,
        output_dir: &Path,
        should_cancel: &dyn Fn() -> bool,
    ) -> Result<RunReport> {
        self.config
            .validate()
            .map_err(|e| PipelineError::Other(e.to_string()))?;

        let file = File::open(archive_path).map_err(|e| {
            PipelineError::Other(format!("failed to open archive '{}': {e}", archive_path.display()))
        })?;
        self.run_from_reader(BufReader::new(file), output_dir, should_cancel)
    }

    fn run_from_reader<R: Read + Seek>(
        &self,
        reader: R,
        output_dir: &Path,
        should_cancel: &dyn Fn() -> bool,
    ) -> Result<RunReport> {
        let logger = CountingLogger::new(self.logger);

        let mut archive = ArchiveSource::open(reader)?;
        archive.precheck()?;
        check_cancelled(should_cancel)?;

        let catalogs = read_catalogs(&mut archive, &self.config, &logger)?;
        check_cancelled(should_cancel)?;

        let now_millis = chrono::Utc::now().timestamp_millis();
        let mut identities = resolve::resolve(&catalogs, &self.config, self.exit_hook, now_millis);
        check_cancelled(should_cancel)?;

        let rewrite_ctx = build_rewrite_context(&identities);
        let mut posts = assemble::assemble(&catalogs, &mut identities, &rewrite_ctx, &self.config, &logger);
        check_cancelled(should_cancel)?;

        std::fs::create_dir_all(output_dir)
            .map_err(|e| PipelineError::Other(format!("failed to create output directory: {e}")))?;
        let mut acquirer = Acquirer::new(
            &mut archive,
            &catalogs.uploads,
            &self.config,
            self.http_client,
            &logger,
            output_dir,
        );
        acquirer.acquire_all(&mut posts);
        check_cancelled(should_cancel)?;

        let users_written = identities.users_by_id.len();
        let channels_written = identities.public_channels.len()
            + identities.private_channels.len()
            + identities.group_channels.len()
            + identities.direct_channels.len();
        let posts_written = posts.len();

        let intermediate = Intermediate {
            public_channels: identities.public_channels,
            private_channels: identities.private_channels,
            group_channels: identities.group_channels,
            direct_channels: identities.direct_channels,
            users_by_id: identities.users_by_id,
            posts,
        };

        check::check(&intermediate, &self.config, &logger);
        check_cancelled(should_cancel)?;

        let chunks = emit::emit(&intermediate, &self.config, output_dir)?;

        Ok(RunReport {
            users_written,
            channels_written,
            posts_written,
            chunks,
            warnings_emitted: logger.warning_count(),
            output_dir: output_dir.to_path_buf(),
        })
    }
}

fn check_cancelled(should_cancel: &dyn Fn() -> bool) -> Result<()> {
    if should_cancel() {
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}

/// Read every catalog and post batch out of `archive`, classifying each
/// entry by its workspace-relative path (§4.1).
fn read_catalogs<R: Read + Seek>(
    archive: &mut ArchiveSource<R>,
    config: &PipelineConfig,
    logger: &dyn Logger,
) -> Result<SourceCatalogs> {
    let ws = &config.workspace_name;
    let mut catalogs = SourceCatalogs::default();

    for name in archive.entry_names() {
        let Some(kind) = archive::classify_entry(&name, ws) else {
            continue;
        };
        match kind {
            EntryKind::ChannelCatalog(channel_kind) => {
                let relative = archive::strip_workspace(&name, ws).to_string();
                let bytes = archive.read_entry(&name)?;
                let channels = catalog::parse_channel_catalog(&bytes, &relative, channel_kind, logger)?;
                match channel_kind {
                    ChannelKind::Open => catalogs.channels.extend(channels),
                    ChannelKind::Private => catalogs.groups.extend(channels),
                    ChannelKind::Group => catalogs.mpims.extend(channels),
                    ChannelKind::Direct => catalogs.dms.extend(channels),
                }
            }
            EntryKind::UserCatalog => {
                let bytes = archive.read_entry(&name)?;
                catalogs.users = catalog::parse_user_catalog(&bytes, logger)?;
            }
            EntryKind::PostBatch { channel } => {
                let bytes = archive.read_entry(&name)?;
                let posts = parse::parse_post_batch(&bytes, &channel, &name, logger)?;
                catalogs.posts.entry(channel).or_default().extend(posts);
            }
            EntryKind::Upload { file_id } => {
                catalogs.uploads.insert(file_id, name);
            }
            EntryKind::ProfilePicture | EntryKind::Ignored => {}
        }
    }

    Ok(catalogs)
}

/// Build the rewriter's id→username and id→channel-name lookup tables from
/// the resolved identities (§4.2, §4.3).
fn build_rewrite_context(identities: &ResolvedIdentities) -> RewriteContext {
    let users = identities
        .users_by_id
        .iter_in_order()
        .map(|(id, user)| (id.clone(), user.username.clone()));

    let channels = identities
        .public_channels
        .iter()
        .chain(identities.private_channels.iter())
        .chain(identities.group_channels.iter())
        .chain(identities.direct_channels.iter())
        .map(|channel| (channel.id.clone(), channel.name.clone()));

    RewriteContext::new(users, channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PanicExitHook, RangeResponse, TracingLogger};
    use std::io::Cursor;
    use std::io::Write as _;

    struct NoDownloadsClient;
    impl HttpClient for NoDownloadsClient {
        fn get_range(&self, _url: &str, _start: u64) -> std::result::Result<RangeResponse, crate::core::AcquireError> {
            Ok(RangeResponse {
                status: 200,
                body: Box::new(std::io::empty()),
            })
        }
    }

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();
            for (name, data) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn runs_end_to_end_over_a_minimal_archive() {
        let zip_bytes = build_zip(&[
            ("channels.json", br#"[{"id":"C1","name":"general","creator":"U1","members":["U1"]}]"#),
            ("integration_logs.json", b"[]"),
            ("groups.json", b"[]"),
            ("mpims.json", b"[]"),
            ("dms.json", b"[]"),
            (
                "users.json",
                br#"[{"id":"U1","username":"alice","profile":{"real_name":"Alice A","email":"alice@example.com"}}]"#,
            ),
            (
                "general/2020-01-01.json",
                br#"[{"user":"U1","text":"hello team","ts":"100.000000","type":"message","subtype":""}]"#,
            ),
        ]);

        let config = crate::config::PipelineConfigBuilder::new()
            .with_team_name("acme")
            .with_skip_empty_emails(true)
            .build();
        let logger = TracingLogger;
        let http_client = NoDownloadsClient;
        let pipeline = Pipeline::new(config, &logger, &PanicExitHook, &http_client);
        let temp_dir = tempfile::tempdir().unwrap();

        let report = pipeline
            .run_from_reader(Cursor::new(zip_bytes), temp_dir.path(), &|| false)
            .unwrap();

        assert_eq!(report.users_written, 1);
        assert_eq!(report.channels_written, 1);
        assert_eq!(report.posts_written, 1);
        assert_eq!(report.chunks.len(), 1);
        assert!(report.chunks[0].file_path.exists());
    }

    #[test]
    fn cancellation_is_observed_before_any_output_is_written() {
        let zip_bytes = build_zip(&[("channels.json", b"[]"), ("integration_logs.json", b"[]")]);
        let config = crate::config::PipelineConfigBuilder::new()
            .with_skip_empty_emails(true)
            .build();
        let logger = TracingLogger;
        let http_client = NoDownloadsClient;
        let pipeline = Pipeline::new(config, &logger, &PanicExitHook, &http_client);
        let temp_dir = tempfile::tempdir().unwrap();

        let result = pipeline.run_from_reader(Cursor::new(zip_bytes), temp_dir.path(), &|| true);
        assert!(matches!(result, Err(PipelineError::Cancelled)));
    }

    #[test]
    fn missing_archive_file_reports_an_error_not_a_panic() {
        let config = crate::config::PipelineConfigBuilder::new()
            .with_skip_empty_emails(true)
            .build();
        let logger = TracingLogger;
        let http_client = NoDownloadsClient;
        let pipeline = Pipeline::new(config, &logger, &PanicExitHook, &http_client);
        let temp_dir = tempfile::tempdir().unwrap();

        let result = pipeline.run(Path::new("/nonexistent/export.zip"), temp_dir.path());
        assert!(result.is_err());
    }
}
