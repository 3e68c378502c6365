//! Options for unpacking and packing

use std::path::PathBuf;

use crate::compression;
use crate::config::FstConfig;

/// Options for unpack, extract, list and complex operations.
///
/// # Example
///
/// ```no_run
/// use fstcodec::archive::UnpackOptions;
///
/// let options = UnpackOptions::new()
///     .with_output_dir("out")
///     .with_overwrite(false);
/// ```
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    /// Extraction folder; defaults to the archive path without its extension
    pub output_dir: Option<PathBuf>,

    /// Replace files that already exist in the output folder
    /// Default: true
    pub overwrite: bool,

    /// Extension of the list-file written next to the archive
    /// Default: "list"
    pub list_extension: String,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            overwrite: true,
            list_extension: "list".to_string(),
        }
    }
}

impl UnpackOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options taken from the `[unpack]` and `[list]` config sections
    #[must_use]
    pub fn from_config(config: &FstConfig) -> Self {
        Self {
            output_dir: None,
            overwrite: config.unpack.overwrite,
            list_extension: config.list.extension.clone(),
        }
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    #[must_use]
    pub fn with_list_extension(mut self, extension: impl Into<String>) -> Self {
        self.list_extension = extension.into();
        self
    }
}

/// Options for packing a list-file into a new archive
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// zlib level for compressed entries
    pub compression_level: u32,

    /// Folder list-file paths are resolved against.
    /// If None, it is derived from the list-file location.
    pub source_root: Option<PathBuf>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            compression_level: compression::DEFAULT_LEVEL,
            source_root: None,
        }
    }
}

impl PackOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_config(config: &FstConfig) -> Self {
        Self {
            compression_level: config.pack.compression_level,
            source_root: None,
        }
    }

    #[must_use]
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    #[must_use]
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(root.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let mut config = FstConfig::default();
        config.unpack.overwrite = false;
        config.list.extension = "lst".to_string();
        config.pack.compression_level = 1;

        let unpack = UnpackOptions::from_config(&config);
        assert!(!unpack.overwrite);
        assert_eq!(unpack.list_extension, "lst");
        assert_eq!(PackOptions::from_config(&config).compression_level, 1);
    }
}
