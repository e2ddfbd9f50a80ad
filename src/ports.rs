// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Collaborator ports: the external interfaces the core delegates to
//! instead of owning directly (§6, §1 out-of-scope list).
//!
//! These mirror the way the teacher abstracts over format-specific I/O
//! through `&dyn FormatReader` / `&dyn FormatWriter` (`io::traits`): a small
//! object-safe trait plus one default implementation, so embedders and
//! tests can substitute their own.

use std::fmt;
use std::io::Read;

use crate::core::AcquireError;

/// Structured logging sink.
///
/// The core never installs a global logger; it only calls through this
/// trait, so an embedder that already runs `tracing`, `log`, or something
/// else entirely can route pipeline diagnostics wherever it likes.
pub trait Logger: Send + Sync {
    /// Log a debug-level message with structured fields.
    fn debug(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]);
    /// Log an info-level message with structured fields.
    fn info(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]);
    /// Log a warn-level message with structured fields.
    fn warn(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]);
    /// Log an error-level message with structured fields.
    fn error(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]);
}

fn render_fields(fields: &[(&str, &dyn fmt::Display)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Default [`Logger`] implementation, forwarding to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        tracing::debug!(fields = %render_fields(fields), "{message}");
    }

    fn info(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        tracing::info!(fields = %render_fields(fields), "{message}");
    }

    fn warn(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        tracing::warn!(fields = %render_fields(fields), "{message}");
    }

    fn error(&self, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        tracing::error!(fields = %render_fields(fields), "{message}");
    }
}

/// Process termination collaborator, invoked for the one fatal condition
/// described in §4.3/§7 (a user with no resolvable email and no configured
/// policy).
///
/// Replaceable so tests never actually terminate the test process.
pub trait ExitHook: Send + Sync {
    /// Terminate (or, in a test double, panic) with the given message.
    fn exit(&self, message: &str) -> !;
}

/// Default [`ExitHook`]: logs then calls [`std::process::exit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExitHook;

impl ExitHook for ProcessExitHook {
    fn exit(&self, message: &str) -> ! {
        tracing::error!("{message}");
        std::process::exit(1)
    }
}

/// Test double for [`ExitHook`] that panics instead of terminating the
/// process, so `#[should_panic]` tests can assert the fatal path is taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicExitHook;

impl ExitHook for PanicExitHook {
    fn exit(&self, message: &str) -> ! {
        panic!("{message}");
    }
}

/// A byte range response from [`HttpClient::get_range`].
pub struct RangeResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body reader.
    pub body: Box<dyn Read + Send>,
}

/// HTTP collaborator used by the Attachment Acquirer for resumable
/// range downloads (§4.5).
pub trait HttpClient: Send + Sync {
    /// Issue `GET <url>` with a `Range: bytes=<start>-` header.
    fn get_range(&self, url: &str, start: u64) -> Result<RangeResponse, AcquireError>;
}

/// Default [`HttpClient`] implementation backed by `ureq`.
///
/// Chosen in the style of `necauqua-twitch-archiver`, which uses `ureq` as
/// a small, synchronous, blocking HTTP client appropriate for this crate's
/// single-threaded pipeline (§5: "no stage requires parallelism").
#[derive(Debug, Clone, Default)]
pub struct UreqHttpClient;

impl HttpClient for UreqHttpClient {
    fn get_range(&self, url: &str, start: u64) -> Result<RangeResponse, AcquireError> {
        let range_header = format!("bytes={start}-");
        let result = ureq::get(url)
            .header("Range", &range_header)
            .call();

        match result {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.into_body().into_reader();
                Ok(RangeResponse {
                    status,
                    body: Box::new(body),
                })
            }
            Err(ureq::Error::StatusCode(status)) => Ok(RangeResponse {
                status,
                body: Box::new(std::io::empty()),
            }),
            Err(err) => Err(AcquireError::Io {
                file_id: url.to_string(),
                message: err.to_string(),
            }),
        }
    }
}
