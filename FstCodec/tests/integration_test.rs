use std::path::{Path, PathBuf};

use fstcodec::fst::{ENTRY_SIZE, HEADER_SIZE, PATH_LENGTH};
use fstcodec::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

/// Deterministic filler that compresses well
fn text_bytes(len: usize) -> Vec<u8> {
    b"MechCommander ".iter().copied().cycle().take(len).collect()
}

fn write_sources(root: &Path, files: &[(&str, Vec<u8>)]) {
    for (path, data) in files {
        let full = root.join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, data).unwrap();
    }
}

fn write_list(path: &Path, lines: &[(ListFlag, &str)]) {
    let mut list = ListFile::new();
    for (flag, entry) in lines {
        list.push(*flag, *entry);
    }
    write_list_file(path, &list).unwrap();
}

/// Archive with a.txt (uncompressed, 10 bytes), b.bin (compressed, 100 bytes)
/// and c.dat patched to the empty flag.
fn scenario_archive(root: &Path) -> (PathBuf, Vec<u8>, Vec<u8>) {
    let a = b"0123456789".to_vec();
    let b = text_bytes(100);
    let src = root.join("SRC");
    write_sources(
        &src,
        &[("a.txt", a.clone()), ("b.bin", b.clone()), ("c.dat", Vec::new())],
    );
    write_list(
        &root.join("SRC.list"),
        &[
            (ListFlag::Uncompressed, "a.txt"),
            (ListFlag::Compressed, "b.bin"),
            (ListFlag::Uncompressed, "c.dat"),
        ],
    );

    let fst = root.join("SCENARIO.FST");
    FstOperations::pack(root.join("SRC.list"), &fst, &PackOptions::new()).unwrap();

    let mut bytes = std::fs::read(&fst).unwrap();
    let flag_at = HEADER_SIZE + 2 * ENTRY_SIZE + PATH_LENGTH + 12;
    bytes[flag_at] = CompressFlag::Empty.to_code();
    std::fs::write(&fst, bytes).unwrap();

    (fst, a, b)
}

#[test]
fn test_scenario_extract_all_skips_empty_entry() {
    let dir = tempdir().unwrap();
    let (fst, a, b) = scenario_archive(dir.path());

    let archive = FstOperations::show(&fst).unwrap();
    assert_eq!(archive.amount_entries(), 3);
    assert_eq!(archive.entries()[1].flag, CompressFlag::Compressed);
    assert!(archive.entries()[1].compressed_size < 100);
    assert_eq!(archive.entries()[2].flag, CompressFlag::Empty);

    let out = dir.path().join("out");
    let summary =
        FstOperations::unpack(&fst, &UnpackOptions::new().with_output_dir(&out)).unwrap();
    assert_eq!(summary.extracted, 2);
    assert_eq!(summary.skipped_empty, 1);
    assert_eq!(std::fs::read(out.join("a.txt")).unwrap(), a);
    assert_eq!(std::fs::read(out.join("b.bin")).unwrap(), b);
    assert!(!out.join("c.dat").exists());
}

#[test]
fn test_complex_output_repacks_with_empty_entry() {
    let dir = tempdir().unwrap();
    let (fst, a, b) = scenario_archive(dir.path());

    let summary = FstOperations::complex(&fst, &UnpackOptions::new()).unwrap();
    assert_eq!(summary.unpack.extracted, 2);
    let placeholder = summary.unpack.output_dir.join("c.dat");
    assert_eq!(std::fs::metadata(&placeholder).unwrap().len(), 0);

    let repacked = dir.path().join("REPACKED.FST");
    let archive = FstOperations::pack(&summary.list_path, &repacked, &PackOptions::new()).unwrap();
    let entries = archive.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].path, "c.dat");
    assert_eq!(entries[2].flag, CompressFlag::Uncompressed);
    assert_eq!(entries[2].uncompressed_size, 0);

    let mut reader = FstReader::open(&repacked).unwrap();
    assert_eq!(reader.read_entry(0).unwrap(), a);
    assert_eq!(reader.read_entry(1).unwrap(), b);
}

#[test]
fn test_scenario_empty_entry_is_unsupported() {
    let dir = tempdir().unwrap();
    let (fst, _, _) = scenario_archive(dir.path());

    let mut reader = FstReader::open(&fst).unwrap();
    let err = reader.read_entry(2).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedEntry);
    assert_eq!(err.index(), Some(2));
}

#[test]
fn test_scenario_index_out_of_range() {
    let dir = tempdir().unwrap();
    let (fst, _, _) = scenario_archive(dir.path());

    let err = FstOperations::extract(&fst, 5, &UnpackOptions::new()).unwrap_err();
    assert!(matches!(err, Error::IndexOutOfRange { index: 5, count: 3, .. }));
}

#[test]
fn test_scenario_malformed_list_creates_no_archive() {
    let dir = tempdir().unwrap();
    write_sources(dir.path(), &[("a.txt", b"a".to_vec()), ("b.txt", b"b".to_vec())]);
    let list = dir.path().join("BAD.list");
    std::fs::write(&list, "0    u  a.txt\n1    x  b.txt\n").unwrap();

    let out = dir.path().join("BAD.FST");
    let err = FstOperations::pack(&list, &out, &PackOptions::new()).unwrap_err();
    assert!(matches!(err, Error::CorruptListFile { line: 2, .. }));
    assert!(!out.exists());
}

#[test]
fn test_round_trip_through_list_file() {
    let dir = tempdir().unwrap();
    let files = [
        ("maps/m1.abl", text_bytes(5000)),
        ("art/mech.tga", (0..=255u8).cycle().take(3000).collect()),
        ("readme.txt", b"hi".to_vec()),
        ("empty.bin", Vec::new()),
    ];
    write_sources(&dir.path().join("GAME"), &files);
    let lines = [
        (ListFlag::Compressed, "maps/m1.abl"),
        (ListFlag::Uncompressed, "art/mech.tga"),
        (ListFlag::Compressed, "readme.txt"),
        (ListFlag::Compressed, "empty.bin"),
    ];
    let list_path = dir.path().join("GAME.list");
    write_list(&list_path, &lines);

    let fst = dir.path().join("GAME.FST");
    FstOperations::pack(&list_path, &fst, &PackOptions::new()).unwrap();

    let out = dir.path().join("unpacked");
    let summary =
        FstOperations::unpack(&fst, &UnpackOptions::new().with_output_dir(&out)).unwrap();
    assert_eq!(summary.extracted, files.len());
    for (path, data) in &files {
        assert_eq!(&std::fs::read(out.join(path)).unwrap(), data, "{path}");
    }

    let dumped = FstOperations::show(&fst).unwrap().dump_list_file();
    assert_eq!(
        dumped.serialize(),
        std::fs::read_to_string(&list_path).unwrap()
    );
}

#[test]
fn test_directory_order_follows_list_order() {
    let dir = tempdir().unwrap();
    let names = ["z.txt", "a.txt", "m/k.txt", "b.txt"];
    let files: Vec<_> = names
        .iter()
        .map(|n| (*n, n.as_bytes().to_vec()))
        .collect();
    write_sources(dir.path(), &files);
    let lines: Vec<_> = names.iter().map(|n| (ListFlag::Uncompressed, *n)).collect();
    let list = dir.path().join("order.list");
    write_list(&list, &lines);

    let archive = FstOperations::pack(&list, dir.path().join("order.fst"), &PackOptions::new())
        .unwrap();
    let paths: Vec<_> = archive.entries().iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, names);

    let loaded = FstOperations::show(dir.path().join("order.fst")).unwrap();
    assert_eq!(loaded.entries(), archive.entries());
}

#[test]
fn test_offsets_are_contiguous() {
    let dir = tempdir().unwrap();
    let files = [
        ("one", text_bytes(700)),
        ("two", Vec::new()),
        ("three", text_bytes(31)),
        ("four", vec![1, 2, 3]),
    ];
    write_sources(dir.path(), &files);
    write_list(
        &dir.path().join("c.list"),
        &[
            (ListFlag::Compressed, "one"),
            (ListFlag::Uncompressed, "two"),
            (ListFlag::Compressed, "three"),
            (ListFlag::Uncompressed, "four"),
        ],
    );

    let fst = dir.path().join("c.fst");
    FstOperations::pack(dir.path().join("c.list"), &fst, &PackOptions::new()).unwrap();
    let archive = FstOperations::show(&fst).unwrap();
    let entries = archive.entries();

    assert_eq!(
        u64::from(entries[0].data_offset),
        fstcodec::fst::payload_start(entries.len())
    );
    for pair in entries.windows(2) {
        assert_eq!(
            pair[1].data_offset,
            pair[0].data_offset + pair[0].stored_size()
        );
    }
    let last = &entries[entries.len() - 1];
    assert_eq!(last.data_offset + last.stored_size(), archive.file_size());
    assert_eq!(
        u64::from(archive.file_size()),
        std::fs::metadata(&fst).unwrap().len()
    );
}

#[test]
fn test_empty_list_packs_header_only_archive() {
    let dir = tempdir().unwrap();
    let list = dir.path().join("none.list");
    std::fs::write(&list, "").unwrap();

    let fst = dir.path().join("none.fst");
    let archive = FstOperations::pack(&list, &fst, &PackOptions::new()).unwrap();
    assert_eq!(archive.amount_entries(), 0);
    assert_eq!(archive.file_size() as usize, HEADER_SIZE);
    assert_eq!(FstOperations::show(&fst).unwrap().amount_entries(), 0);
}

#[test]
fn test_missing_source_file_names_path() {
    let dir = tempdir().unwrap();
    write_sources(dir.path(), &[("here.txt", b"x".to_vec())]);
    write_list(
        &dir.path().join("m.list"),
        &[
            (ListFlag::Uncompressed, "here.txt"),
            (ListFlag::Uncompressed, "gone.txt"),
        ],
    );

    let out = dir.path().join("m.fst");
    let err = FstOperations::pack(dir.path().join("m.list"), &out, &PackOptions::new())
        .unwrap_err();
    match err {
        Error::NotFound { path, .. } => assert!(path.ends_with("gone.txt")),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn test_truncated_archive_is_rejected() {
    let dir = tempdir().unwrap();
    let (fst, _, _) = scenario_archive(dir.path());
    let bytes = std::fs::read(&fst).unwrap();
    std::fs::write(&fst, &bytes[..bytes.len() - 5]).unwrap();

    let err = FstOperations::show(&fst).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptHeader);
}

#[test]
fn test_list_writes_sibling_list_file() {
    let dir = tempdir().unwrap();
    let (fst, _, _) = scenario_archive(dir.path());

    let list_path = FstOperations::list(&fst, &UnpackOptions::new()).unwrap();
    assert_eq!(list_path, dir.path().join("SCENARIO.list"));
    assert_eq!(
        std::fs::read_to_string(list_path).unwrap(),
        "0    u  a.txt\n1    c  b.bin\n2    u  c.dat\n"
    );
}
