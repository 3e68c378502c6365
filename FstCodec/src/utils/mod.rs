//! Utility functions

pub mod path;

pub use path::{extension_of, normalize_archive_path, to_fs_path};
