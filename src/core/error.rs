// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Crate-wide error taxonomy.
//!
//! Provides error types for every pipeline stage:
//! - Archive reading and entry classification
//! - Catalog and post-batch decoding
//! - Identity and channel resolution
//! - Attachment acquisition
//! - Emission

use std::fmt;

/// Errors that can occur while reading the export archive.
#[derive(Debug, Clone)]
pub enum ArchiveError {
    /// The archive itself could not be opened (not a valid ZIP, I/O failure).
    Open {
        /// Error message from the underlying archive library or filesystem.
        message: String,
    },

    /// A specific entry inside the archive could not be opened for reading.
    EntryOpen {
        /// Path of the entry inside the archive.
        path: String,
        /// Error message.
        message: String,
    },

    /// The precheck found a required catalog missing from the archive.
    MissingRequiredFile {
        /// Name of the missing file (e.g. "channels.json").
        name: String,
    },
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Open { message } => write!(f, "failed to open archive: {message}"),
            ArchiveError::EntryOpen { path, message } => {
                write!(f, "failed to open entry '{path}': {message}")
            }
            ArchiveError::MissingRequiredFile { name } => {
                write!(f, "required file '{name}' missing from archive")
            }
        }
    }
}

impl std::error::Error for ArchiveError {}

/// Errors encountered while decoding JSON catalogs or post batches.
///
/// Most of these are non-fatal: a catalog decode failure leaves the caller
/// with a partial list rather than aborting the run (see `docs::SPEC_FULL`
/// §4.2 and §7).
#[derive(Debug, Clone)]
pub enum ParseError {
    /// A catalog file failed to decode as JSON.
    CatalogDecode {
        /// Name of the catalog (e.g. "users.json").
        catalog: String,
        /// Error message from the JSON decoder.
        message: String,
    },

    /// A per-channel post batch failed to decode as JSON.
    PostBatchDecode {
        /// Channel name the batch belongs to.
        channel: String,
        /// Entry path inside the archive.
        path: String,
        /// Error message from the JSON decoder.
        message: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::CatalogDecode { catalog, message } => {
                write!(f, "failed to decode '{catalog}': {message}")
            }
            ParseError::PostBatchDecode {
                channel,
                path,
                message,
            } => write!(
                f,
                "failed to decode post batch '{path}' for channel '{channel}': {message}"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors raised while resolving identities and channels.
#[derive(Debug, Clone)]
pub enum ResolveError {
    /// No email policy is configured for a user with a missing email address.
    ///
    /// This is the one fatal condition in the resolver (§4.3, §7): it is
    /// surfaced through the registered [`crate::ports::ExitHook`] rather
    /// than aborting the pipeline via `Result`, matching the spec's exit-hook
    /// collaborator contract. [`PipelineConfig::validate`](crate::config::PipelineConfig::validate)
    /// lets callers detect the same condition ahead of time.
    MissingEmailPolicy {
        /// The user id that triggered the fatal condition.
        user_id: String,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::MissingEmailPolicy { user_id } => write!(
                f,
                "user '{user_id}' has no email and no email policy is configured"
            ),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Errors raised while acquiring (extracting or downloading) an attachment.
#[derive(Debug, Clone)]
pub enum AcquireError {
    /// The file is referenced but present in neither the archive nor, when
    /// downloads are disabled, any remote location.
    NotAvailable {
        /// File id.
        file_id: String,
    },

    /// A resumable download's overlap check failed: the trailing bytes of
    /// the local partial file did not match the leading bytes of the
    /// ranged response.
    OverlapMismatch {
        /// File id being downloaded.
        file_id: String,
    },

    /// The HTTP client returned an unexpected status code.
    UnexpectedStatus {
        /// File id being downloaded.
        file_id: String,
        /// Status code returned.
        status: u16,
    },

    /// A local or network I/O failure occurred while acquiring the file.
    Io {
        /// File id being acquired.
        file_id: String,
        /// Error message.
        message: String,
    },
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireError::NotAvailable { file_id } => {
                write!(f, "attachment '{file_id}' is not available")
            }
            AcquireError::OverlapMismatch { file_id } => write!(
                f,
                "resumable download overlap mismatch for attachment '{file_id}'"
            ),
            AcquireError::UnexpectedStatus { file_id, status } => write!(
                f,
                "unexpected HTTP status {status} while downloading attachment '{file_id}'"
            ),
            AcquireError::Io { file_id, message } => {
                write!(f, "I/O error acquiring attachment '{file_id}': {message}")
            }
        }
    }
}

impl std::error::Error for AcquireError {}

/// Errors raised while emitting the newline-delimited output stream.
#[derive(Debug, Clone)]
pub enum EmitError {
    /// An output chunk file could not be created or written.
    ChunkWrite {
        /// Path of the chunk file.
        path: String,
        /// Error message.
        message: String,
    },

    /// A record failed to serialize to JSON.
    Serialize {
        /// Kind of record (e.g. "post", "user").
        kind: String,
        /// Error message.
        message: String,
    },
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::ChunkWrite { path, message } => {
                write!(f, "failed to write chunk '{path}': {message}")
            }
            EmitError::Serialize { kind, message } => {
                write!(f, "failed to serialize {kind} record: {message}")
            }
        }
    }
}

impl std::error::Error for EmitError {}

/// Top-level error type returned by every public pipeline entry point.
#[derive(Debug, Clone)]
pub enum PipelineError {
    /// Archive reading failed.
    Archive(ArchiveError),
    /// Parsing failed in a way that could not be downgraded to a warning.
    Parse(ParseError),
    /// Identity/channel resolution failed fatally.
    Resolve(ResolveError),
    /// Attachment acquisition failed in a way that aborts the run.
    Acquire(AcquireError),
    /// Emission failed.
    Emit(EmitError),
    /// The run was cancelled via the caller-supplied cancellation signal.
    Cancelled,
    /// Any other condition not covered by the stage-specific variants.
    Other(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Archive(e) => write!(f, "{e}"),
            PipelineError::Parse(e) => write!(f, "{e}"),
            PipelineError::Resolve(e) => write!(f, "{e}"),
            PipelineError::Acquire(e) => write!(f, "{e}"),
            PipelineError::Emit(e) => write!(f, "{e}"),
            PipelineError::Cancelled => write!(f, "pipeline run was cancelled"),
            PipelineError::Other(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ArchiveError> for PipelineError {
    fn from(e: ArchiveError) -> Self {
        PipelineError::Archive(e)
    }
}

impl From<ParseError> for PipelineError {
    fn from(e: ParseError) -> Self {
        PipelineError::Parse(e)
    }
}

impl From<ResolveError> for PipelineError {
    fn from(e: ResolveError) -> Self {
        PipelineError::Resolve(e)
    }
}

impl From<AcquireError> for PipelineError {
    fn from(e: AcquireError) -> Self {
        PipelineError::Acquire(e)
    }
}

impl From<EmitError> for PipelineError {
    fn from(e: EmitError) -> Self {
        PipelineError::Emit(e)
    }
}
