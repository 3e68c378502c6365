//! Core archive operations

use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use super::options::{PackOptions, UnpackOptions};
use crate::error::{Error, Result};
use crate::fst::{Archive, FstReader, FstWriter, ProgressCallback};
use crate::listfile::{read_list_file, write_list_file};
use crate::utils::path::{list_file_for, source_root_for, to_fs_path, unpack_dir_for};

/// Result of unpacking an archive
#[derive(Debug, Clone)]
pub struct UnpackSummary {
    /// Folder the entries were written to
    pub output_dir: PathBuf,
    /// Number of files written
    pub extracted: usize,
    /// Number of empty entries that were skipped
    pub skipped_empty: usize,
}

/// Result of a complex run (unpack all + list)
#[derive(Debug, Clone)]
pub struct ComplexSummary {
    pub unpack: UnpackSummary,
    pub list_path: PathBuf,
}

/// High-level FST archive operations.
///
/// Each method opens its own session, so nothing is shared between calls.
/// The `*_loaded` variants work on a session the caller already opened,
/// which lets a front end show the directory before extracting.
pub struct FstOperations;

impl FstOperations {
    /// Open a read session configured by `options`
    ///
    /// # Errors
    /// Returns [`Error::NotFound`], [`Error::CorruptHeader`] or
    /// [`Error::CorruptEntry`] if the archive cannot be loaded.
    ///
    /// [`Error::NotFound`]: crate::Error::NotFound
    /// [`Error::CorruptHeader`]: crate::Error::CorruptHeader
    /// [`Error::CorruptEntry`]: crate::Error::CorruptEntry
    pub fn open<P: AsRef<Path>>(archive_path: P, options: &UnpackOptions) -> Result<FstReader<File>> {
        Ok(FstReader::open(archive_path)?.with_overwrite(options.overwrite))
    }

    /// Load an archive's directory
    ///
    /// # Errors
    /// See [`FstOperations::open`].
    pub fn show<P: AsRef<Path>>(archive_path: P) -> Result<Archive> {
        Ok(FstReader::open(archive_path)?.into_archive())
    }

    /// Unpack every non-empty entry into the unpack folder
    ///
    /// # Errors
    /// Returns the first load or extraction error.
    pub fn unpack<P: AsRef<Path>>(archive_path: P, options: &UnpackOptions) -> Result<UnpackSummary> {
        let mut reader = Self::open(archive_path, options)?;
        Self::unpack_loaded(&mut reader, options, &|_| {})
    }

    /// Unpack every non-empty entry from an open session
    ///
    /// # Errors
    /// Returns the first extraction error.
    pub fn unpack_loaded<R: Read + Seek>(
        reader: &mut FstReader<R>,
        options: &UnpackOptions,
        progress: ProgressCallback,
    ) -> Result<UnpackSummary> {
        let output_dir = Self::output_dir(reader.archive(), options);
        let extracted = reader.extract_all(&output_dir, Some(progress))?;
        let skipped_empty = reader.archive().amount_entries() - extracted;
        Ok(UnpackSummary {
            output_dir,
            extracted,
            skipped_empty,
        })
    }

    /// Extract the entry at `index` into the unpack folder
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] or [`Error::UnsupportedEntry`] for
    /// an unusable index, or the load or extraction error.
    ///
    /// [`Error::IndexOutOfRange`]: crate::Error::IndexOutOfRange
    /// [`Error::UnsupportedEntry`]: crate::Error::UnsupportedEntry
    pub fn extract<P: AsRef<Path>>(
        archive_path: P,
        index: usize,
        options: &UnpackOptions,
    ) -> Result<PathBuf> {
        let mut reader = Self::open(archive_path, options)?;
        Self::extract_loaded(&mut reader, index, options)
    }

    /// Extract one entry from an open session
    ///
    /// # Errors
    /// See [`FstOperations::extract`].
    pub fn extract_loaded<R: Read + Seek>(
        reader: &mut FstReader<R>,
        index: usize,
        options: &UnpackOptions,
    ) -> Result<PathBuf> {
        let output_dir = Self::output_dir(reader.archive(), options);
        let path = reader.extract_entry(index, &output_dir)?;
        tracing::info!("Extracted entry {index} to {}", path.display());
        Ok(path)
    }

    /// Write the archive's list-file next to it
    ///
    /// # Errors
    /// Returns the load error, or [`Error::Io`] if the list-file cannot be written.
    ///
    /// [`Error::Io`]: crate::Error::Io
    pub fn list<P: AsRef<Path>>(archive_path: P, options: &UnpackOptions) -> Result<PathBuf> {
        let archive = Self::show(archive_path)?;
        Self::list_loaded(&archive, options)
    }

    /// Write the list-file for an already loaded directory
    ///
    /// # Errors
    /// Returns [`Error::InvalidPath`] if the list-file would replace the
    /// archive itself, or [`Error::Io`] if it cannot be written.
    ///
    /// [`Error::InvalidPath`]: crate::Error::InvalidPath
    /// [`Error::Io`]: crate::Error::Io
    pub fn list_loaded(archive: &Archive, options: &UnpackOptions) -> Result<PathBuf> {
        let list_path = list_file_for(archive.path(), &options.list_extension);
        if same_extension(&list_path, archive.path()) {
            return Err(Error::InvalidPath(format!(
                "list-file {} would overwrite its archive",
                list_path.display()
            )));
        }
        write_list_file(&list_path, &archive.dump_list_file())?;
        Ok(list_path)
    }

    /// Unpack everything and write the list-file
    ///
    /// Empty entries get a zero-length placeholder file so the unpacked
    /// folder and list-file pack again as they are.
    ///
    /// # Errors
    /// Returns the first load, extraction or write error. The list-file is
    /// not written if unpacking fails.
    pub fn complex<P: AsRef<Path>>(archive_path: P, options: &UnpackOptions) -> Result<ComplexSummary> {
        let mut reader = Self::open(archive_path, options)?;
        Self::complex_loaded(&mut reader, options, &|_| {})
    }

    /// Complex run on an open session
    ///
    /// # Errors
    /// See [`FstOperations::complex`].
    pub fn complex_loaded<R: Read + Seek>(
        reader: &mut FstReader<R>,
        options: &UnpackOptions,
        progress: ProgressCallback,
    ) -> Result<ComplexSummary> {
        let unpack = Self::unpack_loaded(reader, options, progress)?;
        Self::write_placeholders(reader.archive(), &unpack.output_dir)?;
        let list_path = Self::list_loaded(reader.archive(), options)?;
        Ok(ComplexSummary { unpack, list_path })
    }

    /// Create a zero-length file for every empty entry not already on disk
    fn write_placeholders(archive: &Archive, output_dir: &Path) -> Result<()> {
        for entry in archive.entries().iter().filter(|e| e.is_empty()) {
            let path = output_dir.join(to_fs_path(&entry.path)?);
            if path.exists() {
                continue;
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            File::create(&path)?;
            tracing::debug!("Placeholder for empty entry {} -> {}", entry.index, path.display());
        }
        Ok(())
    }

    /// Pack the files named by a list-file into a new archive
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] for a missing list-file or source file,
    /// [`Error::CorruptListFile`] for a malformed line, or a write error.
    /// No output file is left behind on failure.
    ///
    /// [`Error::NotFound`]: crate::Error::NotFound
    /// [`Error::CorruptListFile`]: crate::Error::CorruptListFile
    pub fn pack<P: AsRef<Path>, Q: AsRef<Path>>(
        list_path: P,
        output_path: Q,
        options: &PackOptions,
    ) -> Result<Archive> {
        Self::pack_with_progress(list_path, output_path, options, &|_| {})
    }

    /// Pack with a progress callback
    ///
    /// # Errors
    /// See [`FstOperations::pack`].
    pub fn pack_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
        list_path: P,
        output_path: Q,
        options: &PackOptions,
        progress: ProgressCallback,
    ) -> Result<Archive> {
        let list_path = list_path.as_ref();
        let list = read_list_file(list_path)?;
        let source_root = options
            .source_root
            .clone()
            .unwrap_or_else(|| source_root_for(list_path));

        tracing::info!(
            "Packing {} entries from {} (root {})",
            list.len(),
            list_path.display(),
            source_root.display()
        );

        FstWriter::new(list, source_root)
            .with_compression_level(options.compression_level)
            .write_with_progress(output_path, Some(progress))
    }

    fn output_dir(archive: &Archive, options: &UnpackOptions) -> PathBuf {
        options
            .output_dir
            .clone()
            .unwrap_or_else(|| unpack_dir_for(archive.path()))
    }
}

/// Sibling paths whose extensions match up to ASCII case
fn same_extension(a: &Path, b: &Path) -> bool {
    match (a.extension(), b.extension()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn sample_tree(root: &Path) -> PathBuf {
        let src = root.join("GAME");
        std::fs::create_dir_all(src.join("art")).unwrap();
        std::fs::write(src.join("readme.txt"), b"hello archive").unwrap();
        std::fs::write(src.join("art/tiles.bin"), vec![3u8; 2048]).unwrap();

        let list = root.join("GAME.list");
        std::fs::write(&list, "0    u  readme.txt\n1    c  art/tiles.bin\n").unwrap();
        list
    }

    #[test]
    fn test_pack_resolves_sibling_source_folder() {
        let dir = tempfile::tempdir().unwrap();
        let list = sample_tree(dir.path());
        let archive = FstOperations::pack(&list, dir.path().join("NEW.FST"), &PackOptions::new())
            .unwrap();
        assert_eq!(archive.amount_entries(), 2);
        assert_eq!(archive.entries()[1].uncompressed_size, 2048);
    }

    #[test]
    fn test_complex_then_repack_layout() {
        let dir = tempfile::tempdir().unwrap();
        let list = sample_tree(dir.path());
        let fst = dir.path().join("out").join("COPY.FST");
        FstOperations::pack(&list, &fst, &PackOptions::new()).unwrap();

        let summary = FstOperations::complex(&fst, &UnpackOptions::new()).unwrap();
        assert_eq!(summary.unpack.output_dir, dir.path().join("out").join("COPY"));
        assert_eq!(summary.unpack.extracted, 2);
        assert_eq!(summary.list_path, dir.path().join("out").join("COPY.list"));
        assert_eq!(
            std::fs::read(summary.unpack.output_dir.join("art").join("tiles.bin")).unwrap(),
            vec![3u8; 2048]
        );

        // The unpacked folder and list-file pack again without extra options
        let again = FstOperations::pack(
            &summary.list_path,
            dir.path().join("AGAIN.FST"),
            &PackOptions::new(),
        )
        .unwrap();
        assert_eq!(again.entries().len(), 2);
    }

    #[test]
    fn test_list_never_replaces_archive() {
        let dir = tempfile::tempdir().unwrap();
        let list = sample_tree(dir.path());
        let fst = dir.path().join("DATA.list");
        FstOperations::pack(&list, &fst, &PackOptions::new()).unwrap();
        let before = std::fs::read(&fst).unwrap();

        let err = FstOperations::list(&fst, &UnpackOptions::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
        assert_eq!(std::fs::read(&fst).unwrap(), before);

        let upper = dir.path().join("X.FST");
        FstOperations::pack(&list, &upper, &PackOptions::new()).unwrap();
        let options = UnpackOptions::new().with_list_extension("fst");
        let err = FstOperations::complex(&upper, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
        assert_eq!(FstOperations::show(&upper).unwrap().amount_entries(), 2);
    }

    #[test]
    fn test_extract_respects_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let list = sample_tree(dir.path());
        let fst = dir.path().join("X.FST");
        FstOperations::pack(&list, &fst, &PackOptions::new()).unwrap();

        let options = UnpackOptions::new().with_output_dir(dir.path().join("dest"));
        FstOperations::extract(&fst, 0, &options).unwrap();

        let keep = options.clone().with_overwrite(false);
        let err = FstOperations::extract(&fst, 0, &keep).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);

        let err = FstOperations::extract(&fst, 9, &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
    }
}
