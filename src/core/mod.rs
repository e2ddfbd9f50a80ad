// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types shared across every pipeline stage: the error taxonomy and
//! the source/intermediate domain model.

pub mod error;
pub mod model;

pub use error::{AcquireError, ArchiveError, EmitError, ParseError, PipelineError, ResolveError};
pub use model::{
    ChannelKind, Intermediate, IntermediateChannel, IntermediatePost, IntermediateReaction,
    IntermediateUser, SourceCatalogs, SourceChannel, SourceFile, SourcePost, SourceReaction,
    SourceRoom, SourceUser,
};

/// Crate-wide result alias, matching the teacher's `Result<T> = Result<T, CodecError>`.
pub type Result<T> = std::result::Result<T, PipelineError>;
