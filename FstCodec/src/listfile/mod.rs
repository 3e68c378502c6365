//! List-file handling
//!
//! A list-file is the text form of an archive directory: one line per entry
//! holding the entry index, a compression letter and the archive path.
//!
//! ```text
//! 0    u  data/missions/m1.abl
//! 1    c  art/mechs/atlas.tga
//! ```
//!
//! Listing an archive writes one, and packing reads one back.

use std::path::Path;

use crate::error::{Error, Result};

/// UTF-8 byte order mark, stripped from the start of list-files
const BOM: char = '\u{feff}';

/// Compression requested for a list-file entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFlag {
    Uncompressed,
    Compressed,
}

impl ListFlag {
    /// Letter written to the list-file
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::Uncompressed => 'u',
            Self::Compressed => 'c',
        }
    }

    /// Parse a flag field (case-insensitive)
    #[must_use]
    pub fn from_letter(field: &str) -> Option<Self> {
        match field {
            "u" | "U" => Some(Self::Uncompressed),
            "c" | "C" => Some(Self::Compressed),
            _ => None,
        }
    }
}

/// One line of a list-file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFileEntry {
    /// Index as written in the file
    pub index: usize,
    pub flag: ListFlag,
    /// Archive-relative path
    pub path: String,
}

/// Ordered list-file contents. Entry order is line order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFile {
    entries: Vec<ListFileEntry>,
}

impl ListFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; its index is its position
    pub fn push(&mut self, flag: ListFlag, path: impl Into<String>) {
        let index = self.entries.len();
        self.entries.push(ListFileEntry {
            index,
            flag,
            path: path.into(),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[ListFileEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListFileEntry> {
        self.entries.iter()
    }

    /// Parse list-file text.
    ///
    /// Blank lines are skipped. Line numbers in errors are 1-based.
    ///
    /// # Errors
    /// Returns [`Error::CorruptListFile`] for a line with a missing field, a
    /// non-numeric index or an unknown flag letter.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix(BOM).unwrap_or(text);
        let mut list = Self::new();
        let mut dense = true;

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let (index_field, rest) = split_field(line);
            let (flag_field, path) = split_field(rest);
            if flag_field.is_empty() || path.is_empty() {
                return Err(Error::corrupt_list(
                    line_no,
                    format!("expected 'index flag path', got '{line}'"),
                ));
            }

            let index = index_field.parse::<usize>().map_err(|_| {
                Error::corrupt_list(line_no, format!("index '{index_field}' is not a number"))
            })?;
            let flag = ListFlag::from_letter(flag_field).ok_or_else(|| {
                Error::corrupt_list(
                    line_no,
                    format!("unknown compression flag '{flag_field}' (expected 'u' or 'c')"),
                )
            })?;

            dense &= index == list.len();
            list.entries.push(ListFileEntry {
                index,
                flag,
                path: path.to_string(),
            });
        }

        if !dense {
            tracing::warn!("List-file indices are not sequential; entries are packed in line order");
        }
        Ok(list)
    }

    /// Serialize to list-file text. Indices are re-derived from position.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            out.push_str(&format!("{:<5}{}  {}\n", i, entry.flag.letter(), entry.path));
        }
        out
    }
}

impl<'a> IntoIterator for &'a ListFile {
    type Item = &'a ListFileEntry;
    type IntoIter = std::slice::Iter<'a, ListFileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Split off the first whitespace-delimited field; the rest is left-trimmed
fn split_field(s: &str) -> (&str, &str) {
    match s.find([' ', '\t']) {
        Some(pos) => (&s[..pos], s[pos..].trim_start()),
        None => (s, ""),
    }
}

/// Read and parse a list-file
///
/// # Errors
/// Returns [`Error::NotFound`] if the file cannot be opened and
/// [`Error::CorruptListFile`] if it is not UTF-8 text or a line is malformed.
pub fn read_list_file(path: impl AsRef<Path>) -> Result<ListFile> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::from_open(e, path))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| Error::corrupt_list(0, format!("not UTF-8 text: {e}")))?;

    let list = ListFile::parse(&text)?;
    tracing::debug!("Read {} list-file entries from {}", list.len(), path.display());
    Ok(list)
}

/// Write a list-file
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_list_file(path: impl AsRef<Path>, list: &ListFile) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, list.serialize())?;
    tracing::info!("Wrote list-file {} ({} entries)", path.display(), list.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_basic() {
        let list = ListFile::parse("0    u  a.txt\n1    C  sub dir/b.bin  \n").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].flag, ListFlag::Uncompressed);
        assert_eq!(list.entries()[1].flag, ListFlag::Compressed);
        assert_eq!(list.entries()[1].path, "sub dir/b.bin");
    }

    #[test]
    fn test_parse_tolerates_bom_crlf_and_blank_lines() {
        let text = "\u{feff}0\tu\ta.txt\r\n\r\n1 c b.bin\r\n";
        let list = ListFile::parse(text).unwrap();
        let paths: Vec<_> = list.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["a.txt", "b.bin"]);
    }

    #[test]
    fn test_parse_reports_line_numbers() {
        let err = ListFile::parse("0 u a.txt\n\n1 x b.bin\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptListFile);
        assert_eq!(err.index(), Some(3));

        let err = ListFile::parse("zero u a.txt").unwrap_err();
        assert!(matches!(err, Error::CorruptListFile { line: 1, .. }));

        let err = ListFile::parse("0 u").unwrap_err();
        assert!(matches!(err, Error::CorruptListFile { line: 1, .. }));
    }

    #[test]
    fn test_parse_keeps_line_order_over_indices() {
        let list = ListFile::parse("7 u last.txt\n3 u first.txt\n").unwrap();
        assert_eq!(list.entries()[0].path, "last.txt");
        assert_eq!(list.entries()[0].index, 7);
    }

    #[test]
    fn test_serialize_rederives_indices() {
        let list = ListFile::parse("7 u a.txt\n3 c b.bin\n").unwrap();
        assert_eq!(list.serialize(), "0    u  a.txt\n1    c  b.bin\n");
        assert_eq!(ListFile::parse(&list.serialize()).unwrap().len(), 2);
    }

    #[test]
    fn test_read_missing_list_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_list_file(dir.path().join("nope.list")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_read_non_utf8_list_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.list");
        std::fs::write(&path, [0x30, 0x20, 0x75, 0x20, 0xff, 0xfe]).unwrap();
        let err = read_list_file(&path).unwrap_err();
        assert!(matches!(err, Error::CorruptListFile { line: 0, .. }));
    }
}
