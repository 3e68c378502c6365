//! FST archive reader: header and directory parsing, random-access extraction

use std::fs::File;
use std::io::{BufReader, Cursor, ErrorKind as IoErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};

use super::{
    Archive, CompressFlag, ENTRY_SIZE, Entry, FORMAT_VERSION, FstHeader, FstPhase, FstProgress,
    HEADER_SIZE, MAGIC, PATH_LENGTH, ProgressCallback, payload_start,
};
use crate::compression;
use crate::error::{Error, Result};
use crate::utils::path::{normalize_archive_path, to_fs_path};

/// FST archive reader.
///
/// This is the read session: it owns the open archive and its directory,
/// which stays unchanged until the reader is dropped.
pub struct FstReader<R: Read + Seek> {
    reader: BufReader<R>,
    archive: Archive,
    /// Replace files that already exist in the output folder
    overwrite: bool,
}

impl FstReader<File> {
    /// Open an archive on disk and load its directory
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the file cannot be opened, or any error
    /// from [`FstReader::new`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::from_open(e, path))?;
        Self::new(file, path)
    }
}

impl<R: Read + Seek> FstReader<R> {
    /// Create a reader over a `Read + Seek` source and load its directory
    ///
    /// # Errors
    /// Returns [`Error::CorruptHeader`] if the header is malformed or
    /// disagrees with the source length, and [`Error::CorruptEntry`] if a
    /// directory record is inconsistent.
    pub fn new(source: R, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut reader = BufReader::new(source);

        let actual_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let header = read_header(&mut reader, actual_size)?;
        let entries = read_directory(&mut reader, &header)?;

        tracing::debug!(
            "Loaded {}: {} entries, {} bytes",
            path.display(),
            entries.len(),
            header.file_size
        );

        Ok(Self {
            reader,
            archive: Archive::new(path, header.file_size, entries),
            overwrite: true,
        })
    }

    /// Set whether extraction replaces existing files
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// The loaded directory
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Consume the reader, keeping only the directory
    pub fn into_archive(self) -> Archive {
        self.archive
    }

    /// Read one entry's payload, decompressing it if needed
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] for a bad index,
    /// [`Error::UnsupportedEntry`] for an empty entry and
    /// [`Error::CorruptEntry`] if the payload is truncated or does not
    /// decompress to its recorded size.
    pub fn read_entry(&mut self, index: usize) -> Result<Vec<u8>> {
        let entry = self.archive.entry(index)?;
        if entry.is_empty() {
            return Err(Error::unsupported_entry(index));
        }
        let flag = entry.flag;
        let offset = u64::from(entry.data_offset);
        let stored_size = entry.stored_size() as usize;
        let uncompressed_size = entry.uncompressed_size as usize;

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut stored = vec![0u8; stored_size];
        self.reader.read_exact(&mut stored).map_err(|e| {
            if e.kind() == IoErrorKind::UnexpectedEof {
                Error::corrupt_entry(index, "payload truncated")
            } else {
                Error::Io(e)
            }
        })?;

        match flag {
            CompressFlag::Compressed => {
                compression::decompress(&stored, uncompressed_size).map_err(|e| e.at_entry(index))
            }
            CompressFlag::Uncompressed | CompressFlag::Empty => Ok(stored),
        }
    }

    /// Extract one entry below `output_dir`, mirroring its archive path
    ///
    /// Intermediate folders are created as needed. Returns the written path.
    ///
    /// # Errors
    /// Same as [`FstReader::read_entry`], plus [`Error::InvalidPath`] if the
    /// entry path cannot be mapped below `output_dir` and [`Error::Io`] if
    /// writing fails (or the file exists and overwriting is disabled).
    pub fn extract_entry(&mut self, index: usize, output_dir: &Path) -> Result<PathBuf> {
        let data = self.read_entry(index)?;
        let entry = &self.archive.entries()[index];
        let output_path = output_dir.join(to_fs_path(&entry.path)?);

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !self.overwrite && output_path.exists() {
            return Err(Error::Io(std::io::Error::new(
                IoErrorKind::AlreadyExists,
                format!("{} already exists", output_path.display()),
            )));
        }
        std::fs::write(&output_path, &data)?;

        tracing::debug!("Extracted entry {index} -> {}", output_path.display());
        Ok(output_path)
    }

    /// Extract every non-empty entry in directory order
    ///
    /// Stops at the first failure. Returns the number of files written.
    ///
    /// # Errors
    /// The first error from [`FstReader::extract_entry`].
    pub fn extract_all(
        &mut self,
        output_dir: &Path,
        progress: Option<ProgressCallback>,
    ) -> Result<usize> {
        let progress = progress.unwrap_or(&|_| {});
        let total = self.archive.amount_entries();
        let mut written = 0;

        std::fs::create_dir_all(output_dir)?;

        for index in 0..total {
            let entry = &self.archive.entries()[index];
            progress(&FstProgress::with_file(
                FstPhase::ExtractingFiles,
                index + 1,
                total,
                entry.path.clone(),
            ));

            if entry.is_empty() {
                tracing::debug!("Skipping empty entry {index} ({})", entry.path);
                continue;
            }
            self.extract_entry(index, output_dir)?;
            written += 1;
        }

        progress(&FstProgress::new(FstPhase::Complete, total, total));
        tracing::info!(
            "Extracted {written} of {total} entries to {}",
            output_dir.display()
        );
        Ok(written)
    }
}

/// Read and validate the fixed header against the real source length
fn read_header<R: Read>(reader: &mut R, actual_size: u64) -> Result<FstHeader> {
    if actual_size < HEADER_SIZE as u64 {
        return Err(Error::corrupt_header(format!(
            "file is {actual_size} bytes, smaller than the {HEADER_SIZE}-byte header"
        )));
    }

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(Error::corrupt_header(format!(
            "bad magic {magic:02X?}, expected FSTF"
        )));
    }

    let version = reader.read_u32::<LittleEndian>()?;
    if version != FORMAT_VERSION {
        return Err(Error::corrupt_header(format!(
            "unsupported format version {version} (supported: {FORMAT_VERSION})"
        )));
    }

    let entry_count = reader.read_u32::<LittleEndian>()?;
    let file_size = reader.read_u32::<LittleEndian>()?;

    if u64::from(file_size) != actual_size {
        return Err(Error::corrupt_header(format!(
            "recorded file size {file_size} does not match actual size {actual_size}"
        )));
    }

    let directory_end = payload_start(entry_count as usize);
    if directory_end > actual_size {
        return Err(Error::corrupt_header(format!(
            "directory of {entry_count} entries ends at {directory_end}, past end of file ({actual_size})"
        )));
    }

    Ok(FstHeader {
        entry_count,
        file_size,
    })
}

/// Read every directory record and check it against the file bounds
fn read_directory<R: Read>(reader: &mut R, header: &FstHeader) -> Result<Vec<Entry>> {
    let count = header.entry_count as usize;
    let mut table = vec![0u8; count * ENTRY_SIZE];
    reader.read_exact(&mut table)?;

    let data_start = payload_start(count);
    let file_size = u64::from(header.file_size);

    table
        .chunks_exact(ENTRY_SIZE)
        .enumerate()
        .map(|(index, record)| {
            let entry = parse_entry(index, record)?;
            validate_entry(&entry, data_start, file_size)?;
            Ok(entry)
        })
        .collect()
}

/// Parse a single directory record
fn parse_entry(index: usize, record: &[u8]) -> Result<Entry> {
    // Path: bytes 0-255 (null-terminated string)
    let path_end = record[..PATH_LENGTH]
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(PATH_LENGTH);
    let raw_path = std::str::from_utf8(&record[..path_end])
        .map_err(|e| Error::corrupt_entry(index, format!("path is not valid UTF-8: {e}")))?;
    let path = normalize_archive_path(raw_path)
        .map_err(|e| Error::corrupt_entry(index, e.to_string()))?;

    let mut fields = Cursor::new(&record[PATH_LENGTH..]);
    let data_offset = fields.read_u32::<LittleEndian>()?;
    let uncompressed_size = fields.read_u32::<LittleEndian>()?;
    let compressed_size = fields.read_u32::<LittleEndian>()?;
    let code = fields.read_u8()?;

    let flag = CompressFlag::from_code(code)
        .ok_or_else(|| Error::corrupt_entry(index, format!("unknown compress flag {code}")))?;

    Ok(Entry {
        index,
        path,
        data_offset,
        uncompressed_size,
        compressed_size,
        flag,
    })
}

/// Check that a non-empty entry's payload lies inside the payload region
fn validate_entry(entry: &Entry, data_start: u64, file_size: u64) -> Result<()> {
    if entry.is_empty() {
        return Ok(());
    }

    let offset = u64::from(entry.data_offset);
    let stored = u64::from(entry.stored_size());
    let end = offset + stored;

    if offset < data_start {
        return Err(Error::corrupt_entry(
            entry.index,
            format!("data offset {offset} lies inside the header/directory (payload starts at {data_start})"),
        ));
    }
    if stored > 0 && offset >= file_size {
        return Err(Error::corrupt_entry(
            entry.index,
            format!("data offset {offset} is past end of file ({file_size})"),
        ));
    }
    if end > file_size {
        return Err(Error::corrupt_entry(
            entry.index,
            format!("payload [{offset}, {end}) exceeds file size {file_size}"),
        ));
    }
    Ok(())
}
