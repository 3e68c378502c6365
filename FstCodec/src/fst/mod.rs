//! FST/DPK archive file format reader/writer
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! header      16 bytes   magic "FSTF", version, entry count, total file size
//! directory   272 bytes  per entry: path[256], offset, uncompressed size,
//!                        compressed size, flag, 3 reserved bytes
//! payloads    ...        entry data back to back, in directory order
//! ```

mod reader;
mod types;
mod writer;

pub use reader::FstReader;
pub use types::*;
pub use writer::FstWriter;

/// FST magic bytes
pub const MAGIC: [u8; 4] = [b'F', b'S', b'T', b'F'];

/// Only supported format version
pub const FORMAT_VERSION: u32 = 1;

/// Size of the archive header
pub const HEADER_SIZE: usize = 16;

/// Length of the path field in a directory record
pub const PATH_LENGTH: usize = 256;

/// Longest storable path in bytes (one byte is kept for the NUL terminator)
pub const MAX_PATH_BYTES: usize = PATH_LENGTH - 1;

/// Size of a directory record
pub const ENTRY_SIZE: usize = 272;

/// Offset of the first payload byte for an archive with `entry_count` entries
#[must_use]
pub fn payload_start(entry_count: usize) -> u64 {
    HEADER_SIZE as u64 + ENTRY_SIZE as u64 * entry_count as u64
}
