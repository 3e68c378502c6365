//! CLI commands: one function per operating mode

use std::fs::File;
use std::path::Path;

use super::display;
use super::invocation::{Action, Request, SessionOptions};
use super::progress::{self, DISK, PACKAGE};
use crate::archive::{FstOperations, PackOptions, UnpackOptions};
use crate::config::FstConfig;
use crate::error::{Error, Result};
use crate::fst::FstReader;

/// Run the requested mode, printing tables unless info output is suppressed
pub fn execute(request: &Request, config: &FstConfig) -> Result<()> {
    let unpack = UnpackOptions::from_config(config);
    let session = request.session;
    let input = request.input.as_path();

    match &request.action {
        Action::Show => show(input),
        Action::Unpack => unpack_all(input, &unpack, session),
        Action::Extract { index } => extract(input, *index, &unpack, session),
        Action::List => list(input, &unpack, session),
        Action::Pack { output } => pack(input, output, &PackOptions::from_config(config), session),
        Action::Complex => complex(input, &unpack, session),
    }
}

/// Load the archive and print its head, or just its path when info is off
fn open_and_describe(
    archive: &Path,
    options: &UnpackOptions,
    session: SessionOptions,
) -> Result<FstReader<File>> {
    let reader = FstOperations::open(archive, options)?;
    if session.ignore_info {
        print!("{}", display::archive_path_line(reader.archive()));
    } else {
        print!("{}", display::archive_table(reader.archive()));
    }
    Ok(reader)
}

fn show(archive: &Path) -> Result<()> {
    let archive = FstOperations::show(archive)?;
    print!("{}", display::archive_table(&archive));
    Ok(())
}

fn unpack_all(archive: &Path, options: &UnpackOptions, session: SessionOptions) -> Result<()> {
    let mut reader = open_and_describe(archive, options, session)?;
    let pb = progress::phase_bar(reader.archive().amount_entries(), PACKAGE, session.ignore_info);
    let summary = FstOperations::unpack_loaded(&mut reader, options, &|p| progress::update(&pb, p));
    pb.finish_and_clear();
    let summary = summary?;

    tracing::info!(
        "Unpacked {} files ({} empty skipped) into {}",
        summary.extracted,
        summary.skipped_empty,
        summary.output_dir.display()
    );
    Ok(())
}

fn extract(
    archive: &Path,
    index: usize,
    options: &UnpackOptions,
    session: SessionOptions,
) -> Result<()> {
    let mut reader = FstOperations::open(archive, options)?;
    let entry = reader.archive().entry(index)?;
    if entry.is_empty() {
        return Err(Error::unsupported_entry(index));
    }

    if session.ignore_info {
        print!("{}", display::archive_path_line(reader.archive()));
    } else {
        print!(
            "{}{}",
            display::archive_head(reader.archive()),
            display::entry_row(entry)
        );
    }

    FstOperations::extract_loaded(&mut reader, index, options)?;
    Ok(())
}

fn list(archive: &Path, options: &UnpackOptions, session: SessionOptions) -> Result<()> {
    let reader = open_and_describe(archive, options, session)?;
    FstOperations::list_loaded(reader.archive(), options)?;
    Ok(())
}

fn pack(list: &Path, output: &Path, options: &PackOptions, session: SessionOptions) -> Result<()> {
    let pb = progress::phase_bar(0, DISK, session.ignore_info);
    let archive =
        FstOperations::pack_with_progress(list, output, options, &|p| progress::update(&pb, p));
    pb.finish_and_clear();
    let archive = archive?;

    if session.ignore_info {
        print!("{}", display::list_path_line(list));
    } else {
        print!("{}", display::pack_summary(list, &archive));
    }
    Ok(())
}

fn complex(archive: &Path, options: &UnpackOptions, session: SessionOptions) -> Result<()> {
    let mut reader = open_and_describe(archive, options, session)?;
    let pb = progress::phase_bar(reader.archive().amount_entries(), PACKAGE, session.ignore_info);
    let summary =
        FstOperations::complex_loaded(&mut reader, options, &|p| progress::update(&pb, p));
    pb.finish_and_clear();
    let summary = summary?;

    tracing::info!(
        "Unpacked {} files into {} and listed them in {}",
        summary.unpack.extracted,
        summary.unpack.output_dir.display(),
        summary.list_path.display()
    );
    Ok(())
}
