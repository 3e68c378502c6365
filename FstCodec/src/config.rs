//! Tool configuration (fstfile.toml)
//!
//! ```toml
//! [pack]
//! compression_level = 9
//!
//! [unpack]
//! overwrite = false
//!
//! [list]
//! extension = "txt"
//! ```
//!
//! Every key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compression;
use crate::error::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "FSTFILE_CONFIG";

/// Config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "fstfile.toml";

fn default_compression_level() -> u32 {
    compression::DEFAULT_LEVEL
}

fn default_true() -> bool {
    true
}

/// Archive extensions a list-file must never share
const ARCHIVE_EXTENSIONS: [&str; 2] = ["fst", "dpk"];

fn default_list_extension() -> String {
    "list".to_string()
}

/// The full tool configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FstConfig {
    #[serde(default)]
    pub pack: PackSettings,
    #[serde(default)]
    pub unpack: UnpackSettings,
    #[serde(default)]
    pub list: ListSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackSettings {
    /// zlib level for entries flagged compressed (0-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

impl Default for PackSettings {
    fn default() -> Self {
        Self {
            compression_level: default_compression_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpackSettings {
    /// Replace files that already exist in the output folder
    #[serde(default = "default_true")]
    pub overwrite: bool,
}

impl Default for UnpackSettings {
    fn default() -> Self {
        Self {
            overwrite: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSettings {
    /// Extension of list-files written next to archives
    #[serde(default = "default_list_extension")]
    pub extension: String,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            extension: default_list_extension(),
        }
    }
}

impl FstConfig {
    /// Parse a config from TOML text
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the text is not valid for this schema.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        if config.pack.compression_level > 9 {
            return Err(Error::Config(format!(
                "pack.compression_level must be 0-9, got {}",
                config.pack.compression_level
            )));
        }
        let extension = &config.list.extension;
        if extension.is_empty() {
            return Err(Error::Config("list.extension must not be empty".to_string()));
        }
        if ARCHIVE_EXTENSIONS
            .iter()
            .any(|archive| extension.eq_ignore_ascii_case(archive))
        {
            return Err(Error::Config(format!(
                "list.extension '{extension}' is an archive extension"
            )));
        }
        Ok(config)
    }

    /// Load a config file
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the file cannot be read and
    /// [`Error::Config`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::from_open(e, path))?;
        let config = Self::from_toml(&text)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the config named by `FSTFILE_CONFIG`, else `./fstfile.toml`, else defaults
    ///
    /// # Errors
    /// Returns an error if a config file exists but cannot be loaded.
    pub fn discover() -> Result<Self> {
        match Self::discovered_path() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn discovered_path() -> Option<PathBuf> {
        if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(explicit));
        }
        let local = PathBuf::from(CONFIG_FILE_NAME);
        local.is_file().then_some(local)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let config = FstConfig::from_toml("").unwrap();
        assert_eq!(config, FstConfig::default());
        assert_eq!(config.pack.compression_level, 6);
        assert!(config.unpack.overwrite);
        assert_eq!(config.list.extension, "list");
    }

    #[test]
    fn test_partial_config() {
        let config = FstConfig::from_toml("[unpack]\noverwrite = false\n").unwrap();
        assert!(!config.unpack.overwrite);
        assert_eq!(config.pack.compression_level, 6);
    }

    #[test]
    fn test_roundtrip() {
        let mut config = FstConfig::default();
        config.pack.compression_level = 9;
        config.list.extension = "txt".to_string();
        let parsed = FstConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_config() {
        for bad in [
            "[pack]\ncompression_level = \"high\"",
            "[pack]\ncompression_level = 12",
            "[list]\nextension = \"\"",
            "[list]\nextension = \"FST\"",
            "[list]\nextension = \"dpk\"",
            "not toml at all [",
        ] {
            let err = FstConfig::from_toml(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "accepted {bad:?}");
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[list]\nextension = \"lst\"\n").unwrap();
        assert_eq!(FstConfig::load(&path).unwrap().list.extension, "lst");
        assert_eq!(
            FstConfig::load(dir.path().join("missing.toml"))
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
    }
}
