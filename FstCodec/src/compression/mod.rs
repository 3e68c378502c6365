//! Compression utilities
//!
//! Compressed entries are stored as zlib streams. The codec is pure and
//! stateless: callers decide whether to keep the compressed form, and the
//! archive format always keeps it when the entry is flagged compressed.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{Error, Result};

/// Default zlib level used when packing
pub const DEFAULT_LEVEL: u32 = 6;

/// Compress data with the default level
///
/// # Errors
/// Returns an error only if the in-memory encoder fails.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    compress_with_level(data, DEFAULT_LEVEL)
}

/// Compress data with an explicit zlib level (0-9, clamped)
///
/// # Errors
/// Returns an error only if the in-memory encoder fails.
pub fn compress_with_level(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 16),
        Compression::new(level.min(9)),
    );
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompress a zlib stream that must expand to exactly `expected_size` bytes
///
/// The returned error carries no entry index; readers attach one with
/// [`Error::at_entry`].
///
/// # Errors
/// Returns [`Error::CorruptEntry`] if the stream is invalid, expands to a
/// different length, or is followed by trailing bytes.
pub fn decompress(compressed: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut decompressed = Vec::with_capacity(expected_size);

    // One byte of headroom so an over-long stream is detected without
    // inflating it completely.
    let limit = expected_size as u64 + 1;
    (&mut decoder)
        .take(limit)
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::corrupt_payload(format!("invalid zlib stream: {e}")))?;

    if decompressed.len() != expected_size {
        return Err(Error::corrupt_payload(format!(
            "decompressed size mismatch: expected {expected_size} bytes, got {}{}",
            decompressed.len().min(expected_size),
            if decompressed.len() > expected_size { "+" } else { "" }
        )));
    }

    let consumed = decoder.total_in();
    if consumed != compressed.len() as u64 {
        return Err(Error::corrupt_payload(format!(
            "{} trailing bytes after zlib stream",
            compressed.len() as u64 - consumed
        )));
    }

    Ok(decompressed)
}
