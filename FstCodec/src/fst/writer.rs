//! FST archive writer: packs the files named by a list-file into a new archive

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use tempfile::NamedTempFile;

use super::{
    Archive, CompressFlag, ENTRY_SIZE, Entry, FORMAT_VERSION, FstPhase, FstProgress, MAGIC,
    MAX_PATH_BYTES, PATH_LENGTH, ProgressCallback, payload_start,
};
use crate::compression;
use crate::error::{Error, Result};
use crate::listfile::{ListFile, read_list_file};
use crate::utils::path::{normalize_archive_path, source_root_for, to_fs_path};

/// Source file read and (optionally) compressed, ready to be laid out
struct PreparedEntry {
    path: String,
    flag: CompressFlag,
    uncompressed_size: u32,
    /// Bytes that go into the payload region
    stored: Vec<u8>,
}

/// FST archive writer.
///
/// This is the pack session: it holds the parsed list-file and the folder its
/// paths are resolved against. Archives are never edited in place; every
/// call to [`FstWriter::write`] produces a brand-new file.
pub struct FstWriter {
    list: ListFile,
    /// Folder that list-file paths are relative to
    source_root: PathBuf,
    /// zlib level for compressed entries
    compression_level: u32,
}

impl FstWriter {
    /// Create a writer for an already parsed list-file
    pub fn new(list: ListFile, source_root: impl Into<PathBuf>) -> Self {
        Self {
            list,
            source_root: source_root.into(),
            compression_level: compression::DEFAULT_LEVEL,
        }
    }

    /// Read and parse a list-file, resolving its paths with [`source_root_for`]
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the list-file cannot be opened and
    /// [`Error::CorruptListFile`] if a line is malformed.
    pub fn from_list_file(list_path: impl AsRef<Path>) -> Result<Self> {
        let list_path = list_path.as_ref();
        let list = read_list_file(list_path)?;
        Ok(Self::new(list, source_root_for(list_path)))
    }

    /// Override the folder list-file paths are resolved against
    #[must_use]
    pub fn with_source_root(mut self, source_root: impl Into<PathBuf>) -> Self {
        self.source_root = source_root.into();
        self
    }

    /// Set the zlib level used for compressed entries
    #[must_use]
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Get the number of entries that will be written
    pub fn entry_count(&self) -> usize {
        self.list.len()
    }

    /// Get the source root
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Write the archive
    ///
    /// # Errors
    /// See [`FstWriter::write_with_progress`].
    pub fn write(self, output_path: impl AsRef<Path>) -> Result<Archive> {
        self.write_with_progress(output_path, None)
    }

    /// Write the archive with a progress callback
    ///
    /// All source files are read (and compressed) before the output is
    /// touched, and the archive is written to a temporary file that is moved
    /// into place only once complete. A failed pack leaves no output file.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for the first missing source file,
    /// [`Error::InvalidPath`] for an unusable entry path,
    /// [`Error::ArchiveTooLarge`] if offsets overflow 32 bits, and
    /// [`Error::Io`] if writing fails.
    pub fn write_with_progress(
        self,
        output_path: impl AsRef<Path>,
        progress: Option<ProgressCallback>,
    ) -> Result<Archive> {
        let output_path = output_path.as_ref();
        let progress = progress.unwrap_or(&|_| {});

        let prepared = self.prepare_entries(progress)?;
        let (entries, file_size) = layout(&prepared)?;

        progress(&FstProgress::new(
            FstPhase::WritingArchive,
            entries.len(),
            entries.len(),
        ));

        let parent = match output_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        let mut writer = BufWriter::new(temp);

        write_header(&mut writer, entries.len(), file_size)?;
        write_directory(&mut writer, &entries)?;
        for item in &prepared {
            writer.write_all(&item.stored)?;
        }

        let temp = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        temp.as_file().sync_all()?;
        temp.persist(output_path).map_err(|e| Error::Io(e.error))?;

        progress(&FstProgress::new(
            FstPhase::Complete,
            entries.len(),
            entries.len(),
        ));
        tracing::info!(
            "Packed {} entries into {} ({file_size} bytes)",
            entries.len(),
            output_path.display()
        );

        Ok(Archive::new(output_path.to_path_buf(), file_size, entries))
    }

    /// Read every source file in list order, compressing where requested
    fn prepare_entries(&self, progress: ProgressCallback) -> Result<Vec<PreparedEntry>> {
        let total = self.list.len();
        let mut prepared = Vec::with_capacity(total);

        for (i, item) in self.list.entries().iter().enumerate() {
            let path = normalize_archive_path(&item.path)?;
            if path.len() > MAX_PATH_BYTES {
                return Err(Error::InvalidPath(format!(
                    "'{path}' is {} bytes, the limit is {MAX_PATH_BYTES}",
                    path.len()
                )));
            }

            progress(&FstProgress::with_file(
                FstPhase::CompressingFiles,
                i + 1,
                total,
                path.clone(),
            ));

            let source = self.source_root.join(to_fs_path(&path)?);
            let data = std::fs::read(&source).map_err(|e| Error::from_open(e, &source))?;
            let uncompressed_size = u32::try_from(data.len()).map_err(|_| {
                Error::ArchiveTooLarge {
                    size: data.len() as u64,
                }
            })?;

            let flag = CompressFlag::from(item.flag);
            let stored = match flag {
                CompressFlag::Compressed => {
                    compression::compress_with_level(&data, self.compression_level)?
                }
                CompressFlag::Uncompressed | CompressFlag::Empty => data,
            };

            tracing::debug!(
                "Prepared {path}: {uncompressed_size} bytes, stored {} ({})",
                stored.len(),
                flag.as_str()
            );

            prepared.push(PreparedEntry {
                path,
                flag,
                uncompressed_size,
                stored,
            });
        }

        Ok(prepared)
    }
}

/// Assign offsets back to back after the directory and compute the file size
fn layout(prepared: &[PreparedEntry]) -> Result<(Vec<Entry>, u32)> {
    let mut cursor = payload_start(prepared.len());
    let mut entries = Vec::with_capacity(prepared.len());

    for (index, item) in prepared.iter().enumerate() {
        let data_offset = to_u32(cursor)?;
        let stored_size = to_u32(item.stored.len() as u64)?;
        let compressed_size = match item.flag {
            CompressFlag::Compressed => stored_size,
            CompressFlag::Uncompressed | CompressFlag::Empty => 0,
        };

        entries.push(Entry {
            index,
            path: item.path.clone(),
            data_offset,
            uncompressed_size: item.uncompressed_size,
            compressed_size,
            flag: item.flag,
        });
        cursor += u64::from(stored_size);
    }

    Ok((entries, to_u32(cursor)?))
}

fn to_u32(value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::ArchiveTooLarge { size: value })
}

fn write_header<W: Write>(writer: &mut W, entry_count: usize, file_size: u32) -> Result<()> {
    writer.write_all(&MAGIC)?;
    writer.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    writer.write_u32::<LittleEndian>(to_u32(entry_count as u64)?)?;
    writer.write_u32::<LittleEndian>(file_size)?;
    Ok(())
}

fn write_directory<W: Write>(writer: &mut W, entries: &[Entry]) -> Result<()> {
    let mut record = [0u8; ENTRY_SIZE];
    for entry in entries {
        record.fill(0);

        // Path (256 bytes, null-padded)
        let path_bytes = entry.path.as_bytes();
        record[..path_bytes.len()].copy_from_slice(path_bytes);

        let mut fields = &mut record[PATH_LENGTH..];
        fields.write_u32::<LittleEndian>(entry.data_offset)?;
        fields.write_u32::<LittleEndian>(entry.uncompressed_size)?;
        fields.write_u32::<LittleEndian>(entry.compressed_size)?;
        fields.write_u8(entry.flag.to_code())?;

        writer.write_all(&record)?;
    }
    Ok(())
}
