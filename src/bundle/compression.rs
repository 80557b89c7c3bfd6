//! DEFLATE compression for payload bundles.
//!
//! The first byte of the output is a marker: 1 = DEFLATE stream follows,
//! 0 = data stored as-is because compression did not help.

use std::io::Read;

use flate2::read::{DeflateDecoder, DeflateEncoder};
use flate2::Compression;

use super::BundleError;

const STORED: u8 = 0;
const DEFLATED: u8 = 1;

/// Largest bundle accepted after decompression.
pub const MAX_DECOMPRESSED_LEN: u64 = 256 * 1024 * 1024;

/// Compresses data, falling back to storing it when that is smaller.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, BundleError> {
    let mut compressed = Vec::new();
    DeflateEncoder::new(data, Compression::best())
        .read_to_end(&mut compressed)
        .map_err(|e| BundleError::Compression(e.to_string()))?;

    let (marker, body) = if compressed.len() < data.len() {
        (DEFLATED, compressed.as_slice())
    } else {
        (STORED, data)
    };

    let mut result = Vec::with_capacity(body.len() + 1);
    result.push(marker);
    result.extend_from_slice(body);
    Ok(result)
}

/// Decompresses data produced by [`compress`], refusing output larger than
/// [`MAX_DECOMPRESSED_LEN`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, BundleError> {
    decompress_with_limit(data, MAX_DECOMPRESSED_LEN)
}

fn decompress_with_limit(data: &[u8], limit: u64) -> Result<Vec<u8>, BundleError> {
    let (&marker, payload) = data
        .split_first()
        .ok_or_else(|| BundleError::Compression("empty data".to_string()))?;

    match marker {
        STORED => Ok(payload.to_vec()),
        DEFLATED => {
            let mut decompressed = Vec::new();
            DeflateDecoder::new(payload)
                .take(limit + 1)
                .read_to_end(&mut decompressed)
                .map_err(|e| BundleError::Compression(e.to_string()))?;
            if decompressed.len() as u64 > limit {
                return Err(BundleError::Compression(format!(
                    "decompressed bundle exceeds {} bytes",
                    limit
                )));
            }
            Ok(decompressed)
        }
        other => Err(BundleError::Compression(format!("invalid marker byte: {}", other))),
    }
}
