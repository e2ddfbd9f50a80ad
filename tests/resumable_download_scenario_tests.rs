// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! End-to-end scenario 6 (§8 "Resumable download"): a 1 MiB payload with a
//! pre-existing 512 KiB local prefix results in one ranged request from
//! the correct offset, an overlap check that passes, and a byte-identical
//! final file.

use std::io::Cursor;
use std::sync::Mutex;

use wsexport::acquire::download::download_resumable;
use wsexport::core::AcquireError;
use wsexport::ports::{HttpClient, RangeResponse};

const PAYLOAD_LEN: usize = 1024 * 1024;
const PREFIX_LEN: usize = 512 * 1024;
const OVERLAP: u64 = 512;

fn deterministic_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

/// Records the `start` offset it was asked for and replies with a 206
/// response carrying the server payload from that offset onward.
struct RangeRecordingClient {
    payload: Vec<u8>,
    requested_start: Mutex<Option<u64>>,
}

impl HttpClient for RangeRecordingClient {
    fn get_range(&self, _url: &str, start: u64) -> Result<RangeResponse, AcquireError> {
        *self.requested_start.lock().unwrap() = Some(start);
        let body = self.payload[start as usize..].to_vec();
        Ok(RangeResponse {
            status: 206,
            body: Box::new(Cursor::new(body)),
        })
    }
}

#[test]
fn resumed_download_requests_from_prefix_minus_overlap_and_reproduces_the_payload() {
    let payload = deterministic_payload(PAYLOAD_LEN);
    let client = RangeRecordingClient {
        payload: payload.clone(),
        requested_start: Mutex::new(None),
    };

    let temp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), &payload[..PREFIX_LEN]).unwrap();

    download_resumable(&client, "http://example.test/object", temp.path(), PAYLOAD_LEN as u64).unwrap();

    let expected_start = PREFIX_LEN as u64 - OVERLAP;
    assert_eq!(*client.requested_start.lock().unwrap(), Some(expected_start));
    assert_eq!(std::fs::read(temp.path()).unwrap(), payload);
}

#[test]
fn overlap_mismatch_on_resume_leaves_local_file_content_untouched() {
    let payload = deterministic_payload(PAYLOAD_LEN);
    let mut corrupted_tail = payload[..PREFIX_LEN].to_vec();
    // Corrupt a byte inside the overlap window so the continuation fails
    // the trailing-vs-leading byte comparison.
    let corrupt_index = PREFIX_LEN - 1;
    corrupted_tail[corrupt_index] ^= 0xFF;

    struct MismatchClient {
        payload: Vec<u8>,
    }
    impl HttpClient for MismatchClient {
        fn get_range(&self, _url: &str, start: u64) -> Result<RangeResponse, AcquireError> {
            let body = self.payload[start as usize..].to_vec();
            Ok(RangeResponse {
                status: 206,
                body: Box::new(Cursor::new(body)),
            })
        }
    }

    let client = MismatchClient { payload: payload.clone() };
    let temp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), &corrupted_tail).unwrap();

    let result = download_resumable(&client, "http://example.test/object", temp.path(), PAYLOAD_LEN as u64);
    assert!(matches!(result, Err(AcquireError::OverlapMismatch { .. })));
    assert_eq!(std::fs::read(temp.path()).unwrap(), corrupted_tail);
}
