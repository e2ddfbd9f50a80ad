// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Resumable HTTP download (§4.5).

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::core::AcquireError;
use crate::ports::HttpClient;

/// Width, in bytes, of the trailing window re-fetched and compared to
/// verify a resumed download picks up where the local partial file left
/// off.
const OVERLAP_WINDOW: u64 = 512;

/// Fetch `url` into `destination`, resuming a partial download when the
/// file already exists and is shorter than `expected_size`. Returns
/// `Ok(())` once `destination` holds the complete file.
pub fn download_resumable(
    http_client: &dyn HttpClient,
    url: &str,
    destination: &Path,
    expected_size: u64,
) -> Result<(), AcquireError> {
    let io_err = |e: std::io::Error| AcquireError::Io {
        file_id: url.to_string(),
        message: e.to_string(),
    };

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(destination)
        .map_err(io_err)?;

    let mut existing_size = file.metadata().map_err(io_err)?.len();
    if existing_size == expected_size {
        return Ok(());
    }
    if existing_size > expected_size {
        file.set_len(0).map_err(io_err)?;
        existing_size = 0;
    }

    let overlap = existing_size.min(OVERLAP_WINDOW);
    let start = existing_size - overlap;

    let mut tail = vec![0u8; overlap as usize];
    if overlap > 0 {
        file.seek(SeekFrom::Start(start)).map_err(io_err)?;
        file.read_exact(&mut tail).map_err(io_err)?;
    }

    let response = http_client.get_range(url, start)?;
    let mut body = response.body;

    match response.status {
        206 => {
            if overlap > 0 {
                let mut received = vec![0u8; overlap as usize];
                body.read_exact(&mut received).map_err(io_err)?;
                if received != tail {
                    return Err(AcquireError::OverlapMismatch {
                        file_id: url.to_string(),
                    });
                }
            }
            file.seek(SeekFrom::End(0)).map_err(io_err)?;
            std::io::copy(&mut body, &mut file).map_err(io_err)?;
            Ok(())
        }
        200 => {
            file.set_len(0).map_err(io_err)?;
            file.seek(SeekFrom::Start(0)).map_err(io_err)?;
            std::io::copy(&mut body, &mut file).map_err(io_err)?;
            Ok(())
        }
        other => Err(AcquireError::UnexpectedStatus {
            file_id: url.to_string(),
            status: other,
        }),
    }
}
