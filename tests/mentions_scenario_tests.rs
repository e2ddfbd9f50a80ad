// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! End-to-end scenario 3 (§8 "Mentions"): user, channel, and special-token
//! mentions all rewrite to the target platform's `@`/`~` syntax in one
//! pass over a single post.

mod common;

use wsexport::config::PipelineConfigBuilder;
use wsexport::ports::{PanicExitHook, TracingLogger};
use wsexport::Pipeline;

#[test]
fn user_channel_and_special_mentions_rewrite_in_one_pass() {
    let temp_dir = tempfile::tempdir().unwrap();
    let archive = common::build_archive(
        temp_dir.path(),
        &[
            (
                "channels.json",
                br#"[
                    {"id":"C001","name":"general","creator":"U001","members":["U001","U002"]},
                    {"id":"C002","name":"random","creator":"U001","members":["U001","U002"]}
                ]"#,
            ),
            ("integration_logs.json", b"[]"),
            ("groups.json", b"[]"),
            ("mpims.json", b"[]"),
            ("dms.json", b"[]"),
            (
                "users.json",
                br#"[
                    {"id":"U001","username":"alice","profile":{"real_name":"Alice Adams","email":"alice@example.com"}},
                    {"id":"U002","username":"jane","profile":{"real_name":"Jane Bell","email":"jane@example.com"}}
                ]"#,
            ),
            (
                "general/2024-01-01.json",
                br#"[{"user":"U001","text":"Hey <@U002>, cc <#C002|random> <!here>","ts":"100.000000","type":"message","subtype":""}]"#,
            ),
        ],
    );

    let config = PipelineConfigBuilder::new().with_skip_empty_emails(true).build();
    let logger = TracingLogger;
    let http_client = common::NoDownloadsClient;
    let pipeline = Pipeline::new(config, &logger, &PanicExitHook, &http_client);

    let output_dir = temp_dir.path().join("out");
    let report = pipeline.run(&archive, &output_dir).unwrap();

    let records = common::read_records(&report);
    let posts = common::records_of_type(&records, "post");
    assert_eq!(posts.len(), 1);
    let message = posts[0].get("post").unwrap().get("message").unwrap().as_str().unwrap();
    assert_eq!(message, "Hey @jane, cc ~random @here");
}
