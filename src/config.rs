// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Pipeline configuration.
//!
//! [`PipelineConfig`] enumerates every knob named in the external-interfaces
//! section of the spec. [`PipelineConfigBuilder`] offers fluent `with_*`
//! setters in the same style as the teacher's `transform::TransformBuilder`.

use std::fmt;

/// Default rune cap for an emitted message body.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 16383;

/// Maximum attachments per emitted post or reply before overflow replies
/// are synthesized.
pub const MAX_ATTACHMENTS_PER_POST: usize = 5;

/// Typed configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Label for the emitted team scope.
    pub team_name: String,
    /// Selects a workspace inside a multi-workspace archive; empty means a
    /// flat (single-workspace) layout.
    pub workspace_name: String,
    /// If non-empty, restricts transformation to one channel name.
    pub channel_only: Option<String>,
    /// Maximum runes per emitted message before splitting.
    pub max_message_length: usize,
    /// Maximum posts per output chunk file; `0` means a single file.
    pub max_chunk_size: usize,
    /// Maximum group-channel member count before reclassification to
    /// private.
    pub max_group_channel_members: usize,
    /// If set, files and uploads are not processed at all.
    pub skip_attachments: bool,
    /// If set, missing archive uploads are fetched from their URLs.
    pub allow_download: bool,
    /// If set, drop posts whose props exceed the platform limit rather
    /// than keeping the post without props.
    pub discard_invalid_props: bool,
    /// If set, leave empty emails blank instead of requiring
    /// `default_email_domain`.
    pub skip_empty_emails: bool,
    /// Suffix applied to users with an empty email, e.g. `"example.com"`.
    pub default_email_domain: Option<String>,
    /// Maximum rune length of a channel purpose.
    pub max_purpose_length: usize,
    /// Maximum rune length of a channel header.
    pub max_header_length: usize,
    /// Maximum rune length of a channel name/display name.
    pub max_channel_name_length: usize,
    /// Maximum serialized rune length of a post's `props.attachments`.
    pub max_props_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            team_name: String::new(),
            workspace_name: String::new(),
            channel_only: None,
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            max_chunk_size: 0,
            max_group_channel_members: 8,
            skip_attachments: false,
            allow_download: false,
            discard_invalid_props: false,
            skip_empty_emails: false,
            default_email_domain: None,
            max_purpose_length: 250,
            max_header_length: 1024,
            max_channel_name_length: 64,
            max_props_length: DEFAULT_MAX_MESSAGE_LENGTH,
        }
    }
}

/// Error raised by [`PipelineConfig::validate`].
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// Human-readable reason the configuration is invalid.
    pub reason: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration: {}", self.reason)
    }
}

impl std::error::Error for ConfigError {}

impl PipelineConfig {
    /// Check for the one statically-detectable fatal condition: no email
    /// policy configured at all (§4.3, §7).
    ///
    /// This lets a caller fail fast instead of waiting for the resolver to
    /// hit the first user with a missing email and invoke the exit hook.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.skip_empty_emails && self.default_email_domain.is_none() {
            return Err(ConfigError {
                reason: "skip_empty_emails is false and default_email_domain is unset; \
                         one email policy must be configured"
                    .to_string(),
            });
        }
        Ok(())
    }

    /// Start building a config with the documented defaults.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }
}

/// Fluent builder for [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Start from the documented defaults.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// Set the emitted team scope label.
    pub fn with_team_name(mut self, team_name: impl Into<String>) -> Self {
        self.config.team_name = team_name.into();
        self
    }

    /// Select a workspace inside a multi-workspace archive.
    pub fn with_workspace_name(mut self, workspace_name: impl Into<String>) -> Self {
        self.config.workspace_name = workspace_name.into();
        self
    }

    /// Restrict transformation to a single channel name.
    pub fn with_channel_only(mut self, channel: impl Into<String>) -> Self {
        self.config.channel_only = Some(channel.into());
        self
    }

    /// Set the maximum runes per emitted message.
    pub fn with_max_message_length(mut self, max: usize) -> Self {
        self.config.max_message_length = max;
        self
    }

    /// Set the maximum posts per output chunk (`0` disables chunking).
    pub fn with_max_chunk_size(mut self, max: usize) -> Self {
        self.config.max_chunk_size = max;
        self
    }

    /// Set the maximum group-channel member count before reclassification.
    pub fn with_max_group_channel_members(mut self, max: usize) -> Self {
        self.config.max_group_channel_members = max;
        self
    }

    /// Disable attachment processing entirely.
    pub fn with_skip_attachments(mut self, skip: bool) -> Self {
        self.config.skip_attachments = skip;
        self
    }

    /// Allow downloading missing uploads from their source URL.
    pub fn with_allow_download(mut self, allow: bool) -> Self {
        self.config.allow_download = allow;
        self
    }

    /// Drop posts whose props exceed the platform limit, instead of
    /// keeping the post without props.
    pub fn with_discard_invalid_props(mut self, discard: bool) -> Self {
        self.config.discard_invalid_props = discard;
        self
    }

    /// Leave empty emails blank instead of requiring a default domain.
    pub fn with_skip_empty_emails(mut self, skip: bool) -> Self {
        self.config.skip_empty_emails = skip;
        self
    }

    /// Set the domain suffix applied to users with an empty email.
    pub fn with_default_email_domain(mut self, domain: impl Into<String>) -> Self {
        self.config.default_email_domain = Some(domain.into());
        self
    }

    /// Finish building.
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_message_length, DEFAULT_MAX_MESSAGE_LENGTH);
        assert_eq!(config.max_chunk_size, 0);
        assert!(config.workspace_name.is_empty());
    }

    #[test]
    fn validate_fails_with_no_email_policy() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_passes_with_skip_empty_emails() {
        let config = PipelineConfigBuilder::new()
            .with_skip_empty_emails(true)
            .build();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_passes_with_default_email_domain() {
        let config = PipelineConfigBuilder::new()
            .with_default_email_domain("example.com")
            .build();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_every_field() {
        let config = PipelineConfigBuilder::new()
            .with_team_name("acme")
            .with_workspace_name("ws1")
            .with_channel_only("general")
            .with_max_message_length(100)
            .with_max_chunk_size(50)
            .with_skip_attachments(true)
            .with_allow_download(true)
            .with_discard_invalid_props(true)
            .with_skip_empty_emails(true)
            .build();
        assert_eq!(config.team_name, "acme");
        assert_eq!(config.workspace_name, "ws1");
        assert_eq!(config.channel_only.as_deref(), Some("general"));
        assert_eq!(config.max_message_length, 100);
        assert_eq!(config.max_chunk_size, 50);
        assert!(config.skip_attachments);
        assert!(config.allow_download);
        assert!(config.discard_invalid_props);
        assert!(config.skip_empty_emails);
    }
}
