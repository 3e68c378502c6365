//! Error types for `FstCodec`

use std::panic::Location;
use std::path::PathBuf;

use thiserror::Error;

/// Source position an error was raised at
pub type ErrorLocation = &'static Location<'static>;

/// The error type for `FstCodec` operations.
///
/// Every fallible operation returns this directly; there is no side-channel
/// "last error" record. The command-line layer turns it into a result code
/// and a diagnostic block at the process boundary.
///
/// Variants raised by the codec itself carry the source position that
/// raised them; see [`Error::location`].
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An input path (archive, list-file or packed source file) could not be opened.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// The path that could not be opened.
        path: PathBuf,
        /// Where the error was raised.
        location: ErrorLocation,
    },

    // ==================== Archive Errors ====================
    /// The archive header is unreadable or inconsistent with the file on disk.
    #[error("corrupt archive header: {reason}")]
    CorruptHeader {
        /// What is wrong with the header.
        reason: String,
        /// Where the error was raised.
        location: ErrorLocation,
    },

    /// A directory record or payload is inconsistent, or decompression failed.
    #[error("corrupt entry{}: {reason}", .index.map(|i| format!(" {i}")).unwrap_or_default())]
    CorruptEntry {
        /// Directory index of the offending entry, when known.
        index: Option<usize>,
        /// What is wrong with the entry.
        reason: String,
        /// Where the error was raised.
        location: ErrorLocation,
    },

    /// The requested entry ordinal is beyond the directory size.
    #[error("entry index {index} out of range (archive has {count} entries)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of entries in the directory.
        count: usize,
        /// Where the error was raised.
        location: ErrorLocation,
    },

    /// Extraction was requested for an entry flagged as empty.
    #[error("entry {index} is empty and has no payload to extract")]
    UnsupportedEntry {
        /// Directory index of the empty entry.
        index: usize,
        /// Where the error was raised.
        location: ErrorLocation,
    },

    /// The archive would not fit the format's 32-bit size fields.
    #[error("archive too large: {size} bytes exceeds the 32-bit format limit")]
    ArchiveTooLarge {
        /// Size in bytes that overflowed.
        size: u64,
    },

    // ==================== List-file Errors ====================
    /// A list-file line could not be parsed into `index flag path`.
    #[error("malformed list-file line {line}: {reason}")]
    CorruptListFile {
        /// 1-based line number (0 when the whole file is unreadable as text).
        line: usize,
        /// What is wrong with the line.
        reason: String,
        /// Where the error was raised.
        location: ErrorLocation,
    },

    // ==================== Path / Config Errors ====================
    /// An archive-internal path is empty, absolute, escapes its root or is too long.
    #[error("invalid archive path: {0}")]
    InvalidPath(String),

    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for `FstCodec` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Tag for each [`Error`] variant, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    NotFound,
    CorruptHeader,
    CorruptEntry,
    CorruptListFile,
    IndexOutOfRange,
    UnsupportedEntry,
    ArchiveTooLarge,
    InvalidPath,
    Config,
}

impl ErrorKind {
    /// Short name of the kind, as printed in diagnostics
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Io => "Io",
            Self::NotFound => "NotFound",
            Self::CorruptHeader => "CorruptHeader",
            Self::CorruptEntry => "CorruptEntry",
            Self::CorruptListFile => "CorruptListFile",
            Self::IndexOutOfRange => "IndexOutOfRange",
            Self::UnsupportedEntry => "UnsupportedEntry",
            Self::ArchiveTooLarge => "ArchiveTooLarge",
            Self::InvalidPath => "InvalidPath",
            Self::Config => "Config",
        }
    }

    /// Broad category of the failure
    #[must_use]
    pub fn category(self) -> &'static str {
        match self {
            Self::Io | Self::NotFound => "File system error",
            Self::CorruptHeader | Self::CorruptEntry | Self::ArchiveTooLarge => "Archive format error",
            Self::CorruptListFile => "List-file format error",
            Self::IndexOutOfRange | Self::UnsupportedEntry | Self::InvalidPath => "Invalid input value",
            Self::Config => "Configuration error",
        }
    }

    /// Human-readable description of the failure class
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Io => "Reading or writing a file failed.",
            Self::NotFound => "The input file could not be opened.",
            Self::CorruptHeader => "The archive header is damaged or is not an FST/DPK header.",
            Self::CorruptEntry => {
                "A directory entry points outside the archive or its data cannot be decompressed."
            }
            Self::CorruptListFile => "A list-file line is not in 'index flag path' form.",
            Self::IndexOutOfRange => "The entry number is beyond the end of the directory.",
            Self::UnsupportedEntry => "The entry is empty and has no data to extract.",
            Self::ArchiveTooLarge => "The archive would exceed the 4 GiB limit of the format.",
            Self::InvalidPath => "An archive path is empty, absolute, too long or leaves its folder.",
            Self::Config => "The configuration file could not be parsed.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// The kind tag of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::CorruptHeader { .. } => ErrorKind::CorruptHeader,
            Self::CorruptEntry { .. } => ErrorKind::CorruptEntry,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::UnsupportedEntry { .. } => ErrorKind::UnsupportedEntry,
            Self::ArchiveTooLarge { .. } => ErrorKind::ArchiveTooLarge,
            Self::CorruptListFile { .. } => ErrorKind::CorruptListFile,
            Self::InvalidPath(_) => ErrorKind::InvalidPath,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Directory index (or list-file line) the error originated from, if any
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::CorruptEntry { index, .. } => *index,
            Self::IndexOutOfRange { index, .. } | Self::UnsupportedEntry { index, .. } => {
                Some(*index)
            }
            Self::CorruptListFile { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Source position the error was raised at, if recorded
    #[must_use]
    pub fn location(&self) -> Option<ErrorLocation> {
        match self {
            Self::NotFound { location, .. }
            | Self::CorruptHeader { location, .. }
            | Self::CorruptEntry { location, .. }
            | Self::IndexOutOfRange { location, .. }
            | Self::UnsupportedEntry { location, .. }
            | Self::CorruptListFile { location, .. } => Some(*location),
            Self::Io(_) | Self::ArchiveTooLarge { .. } | Self::InvalidPath(_) | Self::Config(_) => {
                None
            }
        }
    }

    /// Attach a directory index to an entry error raised without one.
    #[must_use]
    pub fn at_entry(self, index: usize) -> Self {
        match self {
            Self::CorruptEntry {
                index: None,
                reason,
                location,
            } => Self::CorruptEntry {
                index: Some(index),
                reason,
                location,
            },
            other => other,
        }
    }

    #[track_caller]
    pub(crate) fn corrupt_header(reason: impl Into<String>) -> Self {
        Self::CorruptHeader {
            reason: reason.into(),
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn corrupt_entry(index: usize, reason: impl Into<String>) -> Self {
        Self::CorruptEntry {
            index: Some(index),
            reason: reason.into(),
            location: Location::caller(),
        }
    }

    /// Entry error whose index is filled in later by [`Error::at_entry`]
    #[track_caller]
    pub(crate) fn corrupt_payload(reason: impl Into<String>) -> Self {
        Self::CorruptEntry {
            index: None,
            reason: reason.into(),
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn corrupt_list(line: usize, reason: impl Into<String>) -> Self {
        Self::CorruptListFile {
            line,
            reason: reason.into(),
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn index_out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange {
            index,
            count,
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub(crate) fn unsupported_entry(index: usize) -> Self {
        Self::UnsupportedEntry {
            index,
            location: Location::caller(),
        }
    }

    /// Map an open/read failure on `path` to `NotFound`, keeping other IO errors as-is.
    #[track_caller]
    pub(crate) fn from_open(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                Self::NotFound {
                    path: path.into(),
                    location: Location::caller(),
                }
            }
            _ => Self::Io(err),
        }
    }
}
