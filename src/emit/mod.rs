// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Emitter (§4.6).
//!
//! Serializes the assembled [`Intermediate`] model to newline-delimited
//! JSON, one record per line, partitioned into chunks when
//! `max_chunk_size` is set. Grounded on the teacher's `io::traits`
//! `FormatWriter`, generalized from a single binary writer call per
//! record to one `serde_json` line per record.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;

use crate::config::PipelineConfig;
use crate::core::{ChannelKind, EmitError, Intermediate, IntermediateChannel, IntermediatePost, IntermediateUser};

/// Metadata returned for one emitted chunk file.
#[derive(Debug, Clone)]
pub struct ChunkMetadata {
    /// Zero-based chunk index.
    pub id: usize,
    /// Path of the written `.jsonl` file.
    pub file_path: PathBuf,
    /// Relative attachment paths referenced by posts in this chunk.
    pub required_attachment_paths: Vec<String>,
}

#[derive(Serialize)]
struct ChannelPayload<'a> {
    team: &'a str,
    name: &'a str,
    display_name: &'a str,
    #[serde(rename = "type")]
    channel_type: &'static str,
    header: &'a str,
    purpose: &'a str,
}

#[derive(Serialize)]
struct DirectChannelPayload<'a> {
    members: &'a [String],
}

#[derive(Serialize)]
struct UserChannelMembership<'a> {
    name: &'a str,
    roles: &'static str,
}

#[derive(Serialize)]
struct UserTeamMembership<'a> {
    name: &'a str,
    roles: &'static str,
    channels: Vec<UserChannelMembership<'a>>,
}

#[derive(Serialize)]
struct UserPayload<'a> {
    username: &'a str,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    position: &'a str,
    password: &'a str,
    teams: Vec<UserTeamMembership<'a>>,
}

#[derive(Serialize)]
struct AttachmentPayload<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct ReactionPayload<'a> {
    user: &'a str,
    emoji_name: &'a str,
    create_at: i64,
}

#[derive(Serialize)]
struct ReplyPayload<'a> {
    user: &'a str,
    message: &'a str,
    create_at: i64,
    #[serde(rename = "type")]
    kind: &'a str,
    attachments: Vec<AttachmentPayload<'a>>,
    reactions: Vec<ReactionPayload<'a>>,
}

#[derive(Serialize)]
struct PostPayload<'a> {
    team: &'a str,
    channel: &'a str,
    user: &'a str,
    message: &'a str,
    props: &'a serde_json::Map<String, serde_json::Value>,
    create_at: i64,
    #[serde(rename = "type")]
    kind: &'a str,
    attachments: Vec<AttachmentPayload<'a>>,
    replies: Vec<ReplyPayload<'a>>,
    reactions: Vec<ReactionPayload<'a>>,
}

#[derive(Serialize)]
struct DirectPostPayload<'a> {
    channel_members: &'a [String],
    user: &'a str,
    message: &'a str,
    props: &'a serde_json::Map<String, serde_json::Value>,
    create_at: i64,
    #[serde(rename = "type")]
    kind: &'a str,
    attachments: Vec<AttachmentPayload<'a>>,
    replies: Vec<ReplyPayload<'a>>,
    reactions: Vec<ReactionPayload<'a>>,
}

fn reply_payload<'a>(reply: &'a IntermediatePost) -> ReplyPayload<'a> {
    ReplyPayload {
        user: &reply.user,
        message: &reply.message,
        create_at: reply.create_at,
        kind: &reply.kind,
        attachments: reply.attachments.iter().map(|path| AttachmentPayload { path }).collect(),
        reactions: reaction_payloads(reply),
    }
}

fn reaction_payloads(post: &IntermediatePost) -> Vec<ReactionPayload<'_>> {
    post.reactions
        .iter()
        .flat_map(|reaction| {
            reaction.users.iter().map(move |user| ReactionPayload {
                user,
                emoji_name: &reaction.name,
                create_at: post.create_at,
            })
        })
        .collect()
}

fn write_record<T: Serialize>(writer: &mut impl Write, record_type: &str, payload: T) -> Result<(), EmitError> {
    let mut record = serde_json::Map::new();
    record.insert("type".to_string(), json!(record_type));
    let value = serde_json::to_value(payload).map_err(|e| EmitError::Serialize {
        kind: record_type.to_string(),
        message: e.to_string(),
    })?;
    record.insert(record_type.to_string(), value);

    serde_json::to_writer(&mut *writer, &record).map_err(|e| EmitError::Serialize {
        kind: record_type.to_string(),
        message: e.to_string(),
    })?;
    writer.write_all(b"\n").map_err(|e| EmitError::ChunkWrite {
        path: String::new(),
        message: e.to_string(),
    })?;
    Ok(())
}

/// The version record is flat (`{"type":"version","version":1}`), unlike
/// every other record, which nests its payload under a key matching its
/// `type` value.
fn write_version(writer: &mut impl Write) -> Result<(), EmitError> {
    serde_json::to_writer(&mut *writer, &json!({ "type": "version", "version": 1 })).map_err(|e| {
        EmitError::Serialize {
            kind: "version".to_string(),
            message: e.to_string(),
        }
    })?;
    writer.write_all(b"\n").map_err(|e| EmitError::ChunkWrite {
        path: String::new(),
        message: e.to_string(),
    })?;
    Ok(())
}

fn channel_type_code(kind: ChannelKind) -> &'static str {
    match kind {
        ChannelKind::Open => "O",
        _ => "P",
    }
}

fn collect_attachment_paths(post: &IntermediatePost, out: &mut Vec<String>) {
    out.extend(post.attachments.iter().cloned());
    for reply in &post.replies {
        collect_attachment_paths(reply, out);
    }
}

/// Emit `intermediate` as one or more newline-delimited JSON files under
/// `output_dir`, per the ordering and chunking rules of §4.6.
pub fn emit(
    intermediate: &Intermediate,
    config: &PipelineConfig,
    output_dir: &Path,
) -> Result<Vec<ChunkMetadata>, EmitError> {
    std::fs::create_dir_all(output_dir).map_err(|e| EmitError::ChunkWrite {
        path: output_dir.display().to_string(),
        message: e.to_string(),
    })?;

    let owned_chunks: Vec<&[IntermediatePost]> = if config.max_chunk_size == 0 {
        vec![&intermediate.posts[..]]
    } else {
        intermediate.posts.chunks(config.max_chunk_size).collect()
    };

    let mut metas = Vec::with_capacity(owned_chunks.len());
    for (id, chunk_posts) in owned_chunks.into_iter().enumerate() {
        let file_path = output_dir.join(format!("export.{id}.jsonl"));
        let file = File::create(&file_path).map_err(|e| EmitError::ChunkWrite {
            path: file_path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut writer = BufWriter::new(file);

        write_version(&mut writer)?;

        if id == 0 {
            write_channels(&mut writer, &intermediate.public_channels, ChannelKind::Open, &config.team_name)?;
            write_channels(&mut writer, &intermediate.private_channels, ChannelKind::Private, &config.team_name)?;
            for (_, user) in intermediate.users_by_id.iter_in_order() {
                write_user(&mut writer, user, &config.team_name)?;
            }
            write_direct_channels(&mut writer, &intermediate.group_channels)?;
            write_direct_channels(&mut writer, &intermediate.direct_channels)?;
        }

        let mut required_attachment_paths = Vec::new();
        for post in chunk_posts {
            collect_attachment_paths(post, &mut required_attachment_paths);
            if post.is_direct {
                write_record(
                    &mut writer,
                    "direct_post",
                    DirectPostPayload {
                        channel_members: &post.channel_members,
                        user: &post.user,
                        message: &post.message,
                        props: &post.props,
                        create_at: post.create_at,
                        kind: &post.kind,
                        attachments: post.attachments.iter().map(|path| AttachmentPayload { path }).collect(),
                        replies: post.replies.iter().map(reply_payload).collect(),
                        reactions: reaction_payloads(post),
                    },
                )?;
            } else {
                write_record(
                    &mut writer,
                    "post",
                    PostPayload {
                        team: &config.team_name,
                        channel: &post.channel,
                        user: &post.user,
                        message: &post.message,
                        props: &post.props,
                        create_at: post.create_at,
                        kind: &post.kind,
                        attachments: post.attachments.iter().map(|path| AttachmentPayload { path }).collect(),
                        replies: post.replies.iter().map(reply_payload).collect(),
                        reactions: reaction_payloads(post),
                    },
                )?;
            }
        }

        writer.flush().map_err(|e| EmitError::ChunkWrite {
            path: file_path.display().to_string(),
            message: e.to_string(),
        })?;

        metas.push(ChunkMetadata {
            id,
            file_path,
            required_attachment_paths,
        });
    }

    Ok(metas)
}

fn write_channels(
    writer: &mut impl Write,
    channels: &[IntermediateChannel],
    kind: ChannelKind,
    team_name: &str,
) -> Result<(), EmitError> {
    for channel in channels {
        write_record(
            writer,
            "channel",
            ChannelPayload {
                team: team_name,
                name: &channel.name,
                display_name: &channel.display_name,
                channel_type: channel_type_code(kind),
                header: &channel.header,
                purpose: &channel.purpose,
            },
        )?;
    }
    Ok(())
}

fn write_direct_channels(writer: &mut impl Write, channels: &[IntermediateChannel]) -> Result<(), EmitError> {
    for channel in channels {
        write_record(
            writer,
            "direct_channel",
            DirectChannelPayload {
                members: &channel.member_usernames,
            },
        )?;
    }
    Ok(())
}

fn write_user(writer: &mut impl Write, user: &IntermediateUser, team_name: &str) -> Result<(), EmitError> {
    let channels = user
        .memberships
        .iter()
        .map(|name| UserChannelMembership {
            name,
            roles: "channel_user",
        })
        .collect();
    write_record(
        writer,
        "user",
        UserPayload {
            username: &user.username,
            email: &user.email,
            first_name: &user.first_name,
            last_name: &user.last_name,
            position: &user.position,
            password: &user.password,
            teams: vec![UserTeamMembership {
                name: team_name,
                roles: "team_user",
                channels,
            }],
        },
    )?;
    Ok(())
}
