//! # FstCodec
//!
//! A pure-Rust library for `MechCommander` FST/DPK game archives.
//!
//! An archive is a header, a directory of entries (path, offset, sizes,
//! compression flag) and the entry payloads back to back. A list-file is the
//! text form of that directory and doubles as the input for packing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fstcodec::archive::{FstOperations, PackOptions, UnpackOptions};
//!
//! // Show the directory of an archive
//! let archive = FstOperations::show("EXAMPLE.FST")?;
//! println!("{} entries", archive.amount_entries());
//!
//! // Unpack into EXAMPLE/ and write EXAMPLE.list
//! FstOperations::complex("EXAMPLE.FST", &UnpackOptions::new())?;
//!
//! // Pack the list-file into a new archive
//! FstOperations::pack("EXAMPLE.list", "TARGET.FST", &PackOptions::new())?;
//! # Ok::<(), fstcodec::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `fstfile` command-line binary

pub mod archive;
pub mod compression;
pub mod config;
pub mod error;
pub mod fst;
pub mod listfile;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, ErrorKind, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::archive::{FstOperations, PackOptions, UnpackOptions};
    pub use crate::config::FstConfig;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::fst::{Archive, CompressFlag, Entry, FstReader, FstWriter};
    pub use crate::listfile::{ListFile, ListFileEntry, ListFlag, read_list_file, write_list_file};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
