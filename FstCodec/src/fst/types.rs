//! Types for FST/DPK archive handling

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::listfile::{ListFile, ListFlag};
use crate::utils::extension_of;

/// Per-entry payload handling, as stored in the directory flag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressFlag {
    Uncompressed,
    Compressed,
    /// No payload recorded; offset and sizes are never read
    Empty,
}

impl CompressFlag {
    /// Parse the flag byte of a directory record
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Uncompressed),
            1 => Some(Self::Compressed),
            2 => Some(Self::Empty),
            _ => None,
        }
    }

    /// Flag byte written to the directory record
    #[must_use]
    pub fn to_code(self) -> u8 {
        match self {
            Self::Uncompressed => 0,
            Self::Compressed => 1,
            Self::Empty => 2,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uncompressed => "uncompressed",
            Self::Compressed => "compressed",
            Self::Empty => "empty",
        }
    }

    /// Upper-case letter shown in the entry table
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::Uncompressed => 'U',
            Self::Compressed => 'C',
            Self::Empty => 'E',
        }
    }

    /// Projection onto the list-file flags; empty entries list as uncompressed
    #[must_use]
    pub fn to_list_flag(self) -> ListFlag {
        match self {
            Self::Compressed => ListFlag::Compressed,
            Self::Uncompressed | Self::Empty => ListFlag::Uncompressed,
        }
    }
}

impl From<ListFlag> for CompressFlag {
    fn from(flag: ListFlag) -> Self {
        match flag {
            ListFlag::Uncompressed => Self::Uncompressed,
            ListFlag::Compressed => Self::Compressed,
        }
    }
}

/// Header of an FST archive
#[derive(Debug, Clone)]
pub(crate) struct FstHeader {
    /// Number of directory records
    pub entry_count: u32,
    /// Total file size recorded by the packer
    pub file_size: u32,
}

/// One file recorded in the archive directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Position in the directory (0-based, dense)
    pub index: usize,
    /// Archive-relative path, `/`-separated
    pub path: String,
    /// Offset of the payload from the start of the archive
    pub data_offset: u32,
    /// Logical size after decompression (0 means no payload recorded)
    pub uncompressed_size: u32,
    /// Stored size; meaningful only for compressed entries
    pub compressed_size: u32,
    pub flag: CompressFlag,
}

impl Entry {
    /// Number of payload bytes stored on disk for this entry
    #[must_use]
    pub fn stored_size(&self) -> u32 {
        match self.flag {
            CompressFlag::Uncompressed => self.uncompressed_size,
            CompressFlag::Compressed => self.compressed_size,
            CompressFlag::Empty => 0,
        }
    }

    /// Extension of the entry's file name (empty if none)
    #[must_use]
    pub fn extension(&self) -> &str {
        extension_of(&self.path)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flag == CompressFlag::Empty
    }
}

/// An archive's directory, loaded from disk or freshly packed.
///
/// Immutable once built: a read session owns one for its whole lifetime and
/// packing constructs a new one for the file it wrote.
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
    file_size: u32,
    entries: Vec<Entry>,
}

impl Archive {
    pub(crate) fn new(path: PathBuf, file_size: u32, entries: Vec<Entry>) -> Self {
        Self {
            path,
            file_size,
            entries,
        }
    }

    /// Path of the archive on disk
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the whole container in bytes
    #[must_use]
    pub fn file_size(&self) -> u32 {
        self.file_size
    }

    /// Number of directory entries
    #[must_use]
    pub fn amount_entries(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Look up an entry by its directory index
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index` is past the directory end.
    pub fn entry(&self, index: usize) -> Result<&Entry> {
        self.entries
            .get(index)
            .ok_or_else(|| Error::index_out_of_range(index, self.entries.len()))
    }

    /// Project the directory onto a list-file (offsets and sizes dropped)
    #[must_use]
    pub fn dump_list_file(&self) -> ListFile {
        let mut list = ListFile::new();
        for entry in &self.entries {
            list.push(entry.flag.to_list_flag(), entry.path.clone());
        }
        list
    }
}

/// Progress information during archive operations
#[derive(Debug, Clone)]
pub struct FstProgress {
    /// Current operation phase
    pub phase: FstPhase,
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Current entry path (if applicable)
    pub current_file: Option<String>,
}

impl FstProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: FstPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    /// Create a progress update with an entry path
    #[must_use]
    pub fn with_file(
        phase: FstPhase,
        current: usize,
        total: usize,
        file: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of an archive operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FstPhase {
    /// Reading the header and directory
    ReadingDirectory,
    /// Writing entry payloads to disk (during extraction)
    ExtractingFiles,
    /// Reading and compressing source files (during packing)
    CompressingFiles,
    /// Writing header, directory and payloads to the new archive
    WritingArchive,
    /// Operation complete
    Complete,
}

impl FstPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadingDirectory => "Reading directory",
            Self::ExtractingFiles => "Extracting files",
            Self::CompressingFiles => "Compressing files",
            Self::WritingArchive => "Writing archive",
            Self::Complete => "Complete",
        }
    }
}

/// Progress callback for archive operations
pub type ProgressCallback<'a> = &'a dyn Fn(&FstProgress);

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize, path: &str, flag: CompressFlag, size: u32, packed: u32) -> Entry {
        Entry {
            index,
            path: path.to_string(),
            data_offset: 0,
            uncompressed_size: size,
            compressed_size: packed,
            flag,
        }
    }

    #[test]
    fn test_flag_codes() {
        for flag in [
            CompressFlag::Uncompressed,
            CompressFlag::Compressed,
            CompressFlag::Empty,
        ] {
            assert_eq!(CompressFlag::from_code(flag.to_code()), Some(flag));
        }
        assert_eq!(CompressFlag::from_code(3), None);
    }

    #[test]
    fn test_stored_size_follows_flag() {
        assert_eq!(entry(0, "a", CompressFlag::Uncompressed, 10, 99).stored_size(), 10);
        assert_eq!(entry(0, "a", CompressFlag::Compressed, 100, 40).stored_size(), 40);
        assert_eq!(entry(0, "a", CompressFlag::Empty, 7, 7).stored_size(), 0);
    }

    #[test]
    fn test_archive_entry_lookup() {
        let archive = Archive::new(
            PathBuf::from("x.fst"),
            0,
            vec![entry(0, "a.txt", CompressFlag::Uncompressed, 1, 0)],
        );
        assert_eq!(archive.entry(0).unwrap().extension(), "txt");
        let err = archive.entry(5).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 5, count: 1, .. }));
    }

    #[test]
    fn test_dump_list_file_projects_empty_as_uncompressed() {
        let archive = Archive::new(
            PathBuf::from("x.fst"),
            0,
            vec![
                entry(0, "a.txt", CompressFlag::Uncompressed, 10, 0),
                entry(1, "b.bin", CompressFlag::Compressed, 100, 40),
                entry(2, "c.dat", CompressFlag::Empty, 0, 0),
            ],
        );
        let list = archive.dump_list_file();
        let flags: Vec<_> = list.entries().iter().map(|e| e.flag).collect();
        assert_eq!(
            flags,
            vec![ListFlag::Uncompressed, ListFlag::Compressed, ListFlag::Uncompressed]
        );
        assert_eq!(list.entries()[2].index, 2);
    }
}
