// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! JSON Parsers (§4.2).
//!
//! Decodes the five catalog files and per-channel post batches into typed
//! records. Decoding is tolerant: unknown fields are ignored (every
//! `Source*` struct in [`crate::core::model`] derives `Deserialize` with
//! `#[serde(default)]` field fallbacks), and a catalog that fails to parse
//! as a whole is salvaged element-by-element rather than discarded.

pub mod catalog;
pub mod posts;

pub use catalog::parse_channel_catalog;
pub use posts::parse_post_batch;

use serde::de::DeserializeOwned;

use crate::core::ParseError;
use crate::ports::Logger;

/// Decode a JSON array of `T`, tolerating per-element corruption.
///
/// Tries the fast path first (`serde_json::from_slice::<Vec<T>>`). If that
/// fails — e.g. because one element in an otherwise well-formed array is
/// malformed — falls back to decoding the array as generic [`serde_json::Value`]
/// elements and skipping any element that doesn't decode as `T`, logging a
/// warning for each skip (§7: "JSON decode failed for a catalog: warn,
/// proceed with partial results").
pub(crate) fn decode_tolerant_array<T: DeserializeOwned>(
    bytes: &[u8],
    catalog_name: &str,
    logger: &dyn Logger,
) -> Result<Vec<T>, ParseError> {
    if let Ok(items) = serde_json::from_slice::<Vec<T>>(bytes) {
        return Ok(items);
    }

    let raw: Vec<serde_json::Value> = serde_json::from_slice(bytes).map_err(|e| ParseError::CatalogDecode {
        catalog: catalog_name.to_string(),
        message: e.to_string(),
    })?;

    let mut decoded = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(item) => decoded.push(item),
            Err(e) => logger.warn(
                "dropping corrupt catalog entry",
                &[
                    ("catalog", &catalog_name),
                    ("index", &index),
                    ("error", &e.to_string().as_str()),
                ],
            ),
        }
    }
    Ok(decoded)
}
