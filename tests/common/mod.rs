// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common fixtures for end-to-end pipeline tests.

#![allow(dead_code)]

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use wsexport::core::AcquireError;
use wsexport::ports::{HttpClient, Logger, RangeResponse};

/// Build an in-memory ZIP archive from `(entry path, contents)` pairs and
/// write it to `dir/export.zip`, returning the path.
pub fn build_archive(dir: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
    let mut buf = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }
    let path = dir.join("export.zip");
    fs::write(&path, buf).unwrap();
    path
}

/// An [`HttpClient`] that never succeeds; used by scenarios where every
/// attachment is either embedded or intentionally absent.
pub struct NoDownloadsClient;

impl HttpClient for NoDownloadsClient {
    fn get_range(&self, _url: &str, _start: u64) -> Result<RangeResponse, AcquireError> {
        Ok(RangeResponse {
            status: 200,
            body: Box::new(std::io::empty()),
        })
    }
}

/// A [`Logger`] that swallows every message, keeping test output quiet.
pub struct NullLogger;

impl Logger for NullLogger {
    fn debug(&self, _message: &str, _fields: &[(&str, &dyn std::fmt::Display)]) {}
    fn info(&self, _message: &str, _fields: &[(&str, &dyn std::fmt::Display)]) {}
    fn warn(&self, _message: &str, _fields: &[(&str, &dyn std::fmt::Display)]) {}
    fn error(&self, _message: &str, _fields: &[(&str, &dyn std::fmt::Display)]) {}
}

/// Read every `.jsonl` chunk file written for a run, in chunk-id order,
/// and parse each line into a [`serde_json::Value`].
pub fn read_records(report: &wsexport::RunReport) -> Vec<serde_json::Value> {
    let mut chunks = report.chunks.clone();
    chunks.sort_by_key(|chunk| chunk.id);
    let mut records = Vec::new();
    for chunk in &chunks {
        let contents = fs::read_to_string(&chunk.file_path).unwrap();
        for line in contents.lines() {
            records.push(serde_json::from_str(line).unwrap());
        }
    }
    records
}

/// Select every record of a given `type`.
pub fn records_of_type<'a>(records: &'a [serde_json::Value], kind: &str) -> Vec<&'a serde_json::Value> {
    records
        .iter()
        .filter(|record| record.get("type").and_then(|v| v.as_str()) == Some(kind))
        .collect()
}
