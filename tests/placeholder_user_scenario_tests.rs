// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! End-to-end scenario 5 (§8 "Placeholder user"): a post authored by a
//! user id absent from the user catalog still gets emitted, attributed to
//! a synthesized placeholder identity.

mod common;

use wsexport::config::PipelineConfigBuilder;
use wsexport::ports::{PanicExitHook, TracingLogger};
use wsexport::Pipeline;

#[test]
fn post_from_missing_user_id_is_authored_by_a_synthesized_placeholder() {
    let temp_dir = tempfile::tempdir().unwrap();
    let archive = common::build_archive(
        temp_dir.path(),
        &[
            (
                "channels.json",
                br#"[{"id":"C001","name":"general","creator":"U001","members":["U001"]}]"#,
            ),
            ("integration_logs.json", b"[]"),
            ("groups.json", b"[]"),
            ("mpims.json", b"[]"),
            ("dms.json", b"[]"),
            (
                "users.json",
                br#"[{"id":"U001","username":"alice","profile":{"real_name":"Alice Adams","email":"alice@example.com"}}]"#,
            ),
            (
                "general/2024-01-01.json",
                br#"[{"user":"U_MISSING","text":"hello from nowhere","ts":"100.000000","type":"message","subtype":""}]"#,
            ),
        ],
    );

    let config = PipelineConfigBuilder::new().with_skip_empty_emails(true).build();
    let logger = TracingLogger;
    let http_client = common::NoDownloadsClient;
    let pipeline = Pipeline::new(config, &logger, &PanicExitHook, &http_client);

    let output_dir = temp_dir.path().join("out");
    let report = pipeline.run(&archive, &output_dir).unwrap();

    assert_eq!(report.users_written, 2);

    let records = common::read_records(&report);
    let users = common::records_of_type(&records, "user");
    let placeholder = users
        .iter()
        .find(|record| record.get("user").unwrap().get("username").unwrap() == "u_missing")
        .expect("placeholder user not emitted");
    let placeholder = placeholder.get("user").unwrap();
    assert_eq!(placeholder.get("first_name").unwrap(), "Deleted");
    assert_eq!(placeholder.get("last_name").unwrap(), "User");
    assert_eq!(placeholder.get("email").unwrap(), "U_MISSING@local");

    let posts = common::records_of_type(&records, "post");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].get("post").unwrap().get("user").unwrap(), "u_missing");
}
