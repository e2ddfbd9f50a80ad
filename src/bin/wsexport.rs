// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Thin CLI driver (§4.11). Translates flags onto [`PipelineConfigBuilder`]
//! and calls [`Pipeline::run`]; out of scope for correctness testing, kept
//! only so the crate is runnable end-to-end.

use std::io::IsTerminal as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use wsexport::config::PipelineConfigBuilder;
use wsexport::ports::{ProcessExitHook, TracingLogger, UreqHttpClient};
use wsexport::Pipeline;

/// Transform a workspace export archive into a bulk-import NDJSON stream.
#[derive(Debug, Parser)]
#[command(name = "wsexport", version, about)]
struct Cli {
    /// Path to the export ZIP archive.
    archive: PathBuf,

    /// Directory to write the output chunk files and attachments into.
    output_dir: PathBuf,

    /// Label for the emitted team scope.
    #[arg(long, default_value = "")]
    team_name: String,

    /// Workspace name inside a multi-workspace archive.
    #[arg(long, default_value = "")]
    workspace_name: String,

    /// Restrict transformation to a single channel name.
    #[arg(long)]
    channel_only: Option<String>,

    /// Maximum runes per emitted message before splitting.
    #[arg(long)]
    max_message_length: Option<usize>,

    /// Maximum posts per output chunk file (0 disables chunking).
    #[arg(long)]
    max_chunk_size: Option<usize>,

    /// Maximum group-channel member count before reclassification to private.
    #[arg(long)]
    max_group_channel_members: Option<usize>,

    /// Skip attachment extraction and download entirely.
    #[arg(long)]
    skip_attachments: bool,

    /// Fetch missing uploads from their source URL.
    #[arg(long)]
    allow_download: bool,

    /// Drop posts whose props exceed the platform limit, instead of keeping
    /// the post without props.
    #[arg(long)]
    discard_invalid_props: bool,

    /// Leave empty emails blank instead of requiring `--default-email-domain`.
    #[arg(long)]
    skip_empty_emails: bool,

    /// Domain suffix applied to users with an empty email.
    #[arg(long)]
    default_email_domain: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut builder = PipelineConfigBuilder::new()
        .with_team_name(cli.team_name)
        .with_workspace_name(cli.workspace_name)
        .with_skip_attachments(cli.skip_attachments)
        .with_allow_download(cli.allow_download)
        .with_discard_invalid_props(cli.discard_invalid_props)
        .with_skip_empty_emails(cli.skip_empty_emails);

    if let Some(channel) = cli.channel_only {
        builder = builder.with_channel_only(channel);
    }
    if let Some(max) = cli.max_message_length {
        builder = builder.with_max_message_length(max);
    }
    if let Some(max) = cli.max_chunk_size {
        builder = builder.with_max_chunk_size(max);
    }
    if let Some(max) = cli.max_group_channel_members {
        builder = builder.with_max_group_channel_members(max);
    }
    if let Some(domain) = cli.default_email_domain {
        builder = builder.with_default_email_domain(domain);
    }

    let config = builder.build();
    if let Err(e) = config.validate() {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }

    let logger = TracingLogger;
    let http_client = UreqHttpClient;
    let pipeline = Pipeline::new(config, &logger, &ProcessExitHook, &http_client);

    let spinner = std::io::stderr().is_terminal().then(|| {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(indicatif::ProgressStyle::default_spinner().template("{spinner:.green} {msg}").unwrap());
        pb.set_message("exporting…");
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        pb
    });

    let result = pipeline.run(&cli.archive, &cli.output_dir);

    match result {
        Ok(report) => {
            if let Some(pb) = &spinner {
                pb.finish_with_message(format!("wrote {} chunk(s)", report.chunks.len()));
            }
            tracing::info!(
                users = report.users_written,
                channels = report.channels_written,
                posts = report.posts_written,
                chunks = report.chunks.len(),
                warnings = report.warnings_emitted,
                "export complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(pb) = &spinner {
                pb.finish_with_message("export failed");
            }
            tracing::error!("export failed: {e}");
            ExitCode::FAILURE
        }
    }
}
