// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-channel daily post batch parsing.

use crate::core::model::SourcePost;
use crate::core::ParseError;
use crate::ports::Logger;

use super::decode_tolerant_array;

/// Decode one `<channel>/<date>.json` post batch.
///
/// Embedded `null` entries (a known corruption pattern in real exports) are
/// tolerated the same way any other malformed element is: skipped with a
/// warning rather than aborting the whole batch.
pub fn parse_post_batch(
    bytes: &[u8],
    channel: &str,
    path: &str,
    logger: &dyn Logger,
) -> Result<Vec<SourcePost>, ParseError> {
    decode_tolerant_array(bytes, path, logger).map_err(|e| match e {
        ParseError::CatalogDecode { message, .. } => ParseError::PostBatchDecode {
            channel: channel.to_string(),
            path: path.to_string(),
            message,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::TracingLogger;

    #[test]
    fn parses_plain_post() {
        let bytes = br#"[{"user":"U1","text":"hi","ts":"1600000000.000100","type":"message","subtype":""}]"#;
        let posts = parse_post_batch(bytes, "general", "general/2020-09-13.json", &TracingLogger).unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].text, "hi");
    }

    #[test]
    fn skips_embedded_null_entries() {
        let bytes = br#"[{"user":"U1","text":"hi","ts":"1.0"},null,{"user":"U2","text":"bye","ts":"2.0"}]"#;
        let posts = parse_post_batch(bytes, "general", "general/2020-09-13.json", &TracingLogger).unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn reports_post_batch_decode_error_on_non_array() {
        let bytes = br#"{"oops": true}"#;
        let result = parse_post_batch(bytes, "general", "general/2020-09-13.json", &TracingLogger);
        match result {
            Err(ParseError::PostBatchDecode { channel, .. }) => assert_eq!(channel, "general"),
            other => panic!("expected PostBatchDecode, got {other:?}"),
        }
    }
}
