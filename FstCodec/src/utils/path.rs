//! Path utilities
//!
//! Archive-internal paths are stored `/`-separated and relative. These helpers
//! convert between that form and platform paths, and derive the default
//! on-disk layout around an archive (unpack folder, list-file).

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Suffix used for the unpack folder when the archive has no extension
const UNPACK_DIR_SUFFIX: &str = "_unpacked";

/// Return the extension of the last path component, or an empty string.
///
/// Both `/` and `\` count as separators, so `"dir.v2/file"` has no extension.
pub fn extension_of(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) => &name[dot + 1..],
        None => "",
    }
}

/// Normalize a path into the `/`-separated relative form stored in archives.
///
/// Backslashes are treated as separators and `.` components are dropped.
///
/// # Errors
/// Returns [`Error::InvalidPath`] if the path is empty, absolute, carries a
/// drive prefix, contains a `..` component, or starts or ends with
/// whitespace (which a list-file line cannot hold).
pub fn normalize_archive_path(path: &str) -> Result<String> {
    let sanitized = path.replace('\\', "/");
    if sanitized.starts_with('/') {
        return Err(Error::InvalidPath(format!("'{path}' is absolute")));
    }

    let mut parts: Vec<&str> = Vec::new();
    for part in sanitized.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                return Err(Error::InvalidPath(format!(
                    "'{path}' leaves its root folder"
                )));
            }
            p if p.len() >= 2 && p.as_bytes()[1] == b':' && parts.is_empty() => {
                return Err(Error::InvalidPath(format!("'{path}' has a drive prefix")));
            }
            p => parts.push(p),
        }
    }

    if parts.is_empty() {
        return Err(Error::InvalidPath(format!("'{path}' is empty")));
    }
    let joined = parts.join("/");
    if joined.trim() != joined {
        return Err(Error::InvalidPath(format!(
            "'{path}' starts or ends with whitespace"
        )));
    }
    Ok(joined)
}

/// Convert a platform path (relative to some root) into archive form.
///
/// # Errors
/// Returns [`Error::InvalidPath`] for non-UTF-8, absolute or escaping paths.
pub fn from_fs_path(path: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    Error::InvalidPath(format!("'{}' is not valid UTF-8", path.display()))
                })?;
                parts.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::InvalidPath(format!(
                    "'{}' must be relative without parent traversal",
                    path.display()
                )));
            }
        }
    }
    normalize_archive_path(&parts.join("/"))
}

/// Convert an archive path into a platform path relative to an extraction root.
///
/// # Errors
/// Returns [`Error::InvalidPath`] if the archive path does not normalize.
pub fn to_fs_path(archive_path: &str) -> Result<PathBuf> {
    let normalized = normalize_archive_path(archive_path)?;
    Ok(normalized.split('/').collect())
}

/// Default unpack folder for an archive: the archive path without extension.
///
/// `data/EXAMPLE.FST` unpacks into `data/EXAMPLE/`. An archive without an
/// extension unpacks into `<name>_unpacked/` so the folder never collides
/// with the archive itself.
pub fn unpack_dir_for(archive: &Path) -> PathBuf {
    if archive.extension().is_some() {
        archive.with_extension("")
    } else {
        let mut name = archive.file_name().unwrap_or_default().to_os_string();
        name.push(UNPACK_DIR_SUFFIX);
        archive.with_file_name(name)
    }
}

/// Default list-file path for an archive: a sibling with the given extension.
pub fn list_file_for(archive: &Path, extension: &str) -> PathBuf {
    archive.with_extension(extension)
}

/// Folder that list-file paths are resolved against when packing.
///
/// This is the sibling folder named after the list-file stem (the layout
/// produced by unpacking and listing the same archive) when it exists,
/// otherwise the folder holding the list-file.
pub fn source_root_for(list_file: &Path) -> PathBuf {
    let sibling = list_file.with_extension("");
    if sibling != list_file && sibling.is_dir() {
        return sibling;
    }
    list_file
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.txt"), "txt");
        assert_eq!(extension_of("sound/boom.WAV"), "WAV");
        assert_eq!(extension_of("dir.v2/file"), "");
        assert_eq!(extension_of("dir.v2\\file.tga"), "tga");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn test_normalize_archive_path() {
        assert_eq!(normalize_archive_path("a.txt").unwrap(), "a.txt");
        assert_eq!(
            normalize_archive_path("data\\missions\\m1.abl").unwrap(),
            "data/missions/m1.abl"
        );
        assert_eq!(normalize_archive_path("./x//y/./z").unwrap(), "x/y/z");
        assert_eq!(
            normalize_archive_path("my maps/level 1.abl").unwrap(),
            "my maps/level 1.abl"
        );
    }

    #[test]
    fn test_normalize_rejects_unsafe_paths() {
        for bad in [
            "",
            "/etc/passwd",
            "\\abs",
            "../up",
            "a/../../b",
            "C:\\x",
            ".",
            "/",
            " a.txt",
            "a.txt ",
            "./ lead/x",
        ] {
            assert!(normalize_archive_path(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_fs_path_roundtrip() {
        let fs = to_fs_path("art/mechs/atlas.tga").unwrap();
        assert_eq!(fs, Path::new("art").join("mechs").join("atlas.tga"));
        assert_eq!(from_fs_path(&fs).unwrap(), "art/mechs/atlas.tga");
    }

    #[test]
    fn test_layout_helpers() {
        assert_eq!(
            unpack_dir_for(Path::new("data/EXAMPLE.FST")),
            Path::new("data/EXAMPLE")
        );
        assert_eq!(
            unpack_dir_for(Path::new("data/EXAMPLE")),
            Path::new("data/EXAMPLE_unpacked")
        );
        assert_eq!(
            list_file_for(Path::new("data/EXAMPLE.FST"), "list"),
            Path::new("data/EXAMPLE.list")
        );
    }

    #[test]
    fn test_source_root_prefers_sibling_folder() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("EXAMPLE.list");
        assert_eq!(source_root_for(&list), dir.path());

        std::fs::create_dir(dir.path().join("EXAMPLE")).unwrap();
        assert_eq!(source_root_for(&list), dir.path().join("EXAMPLE"));
    }
}
