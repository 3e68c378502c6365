//! Console text: help, directory tables and the closing result block

use std::fmt::Write as _;
use std::path::Path;

use super::ResultCode;
use crate::error::Error;
use crate::fst::{Archive, CompressFlag, Entry};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Column titles of the entry table
pub const ENTRY_TABLE_TITLE: &str = "Indx Extn DataOffset   (hex)        Uncomp.Size  (hex)        CompressSize (hex)        CompressFlag       Path";

/// Column titles of the pack summary
pub const PACK_TABLE_TITLE: &str = "Indx CF File path";

const MODES_TABLE: &str = "\
* Operating modes:
Command        Symbol Mods Parameters                  Result
Show info      s       p   <Source arc.>               The program will show all contents of archive.
Unpack all     u      api  <Source arc.>               Unpack contents of archive into a separate folder.
Extract single e      api  <Source arc.> <EntryNumber> Single extraction of a file from archive.
create List    l      api  <Source arc.>               Listing contents of archive in a list-file.
Pack           p      api  <Source list> <Target arc.> Packing files into a new archive by list-file.
Complex        c      api  <Source arc.>               Complex unpacking of archive simultaneously with creation of
                                                       list-file (Unpack all + create List).
";

fn banner() -> String {
    format!(
        "FSTFILE    (version {VERSION})\n\n\
         FstFile is console utility for working with MechCommander game archives -- FST, DPK formats.\n"
    )
}

/// Help printed when the tool runs without arguments
pub fn short_help() -> String {
    format!(
        "{}\n\
         * Syntax:\n\
         FstFile <command+modificator> <first parameter> <second parameter>\n\n\
         {MODES_TABLE}\n\
         * Display modifiers:\n\
         Modifier       Symbol Result\n\
         ignore All     a      This modifier uses the following two at the same time.\n\
         ignore Pause   p      Pause at end of the program will be ignored.\n\
         ignore Info    i      All information output while the program is running will be skipped.\n\n\
         To view full help, use '-h' command.\n",
        banner()
    )
}

/// Help printed for `-h`
pub fn full_help() -> String {
    format!(
        "{}\
The program supports: archive viewing, selective extraction, full archive unpacking, creation of a list of contents,
and packing into archive by list-file.

* Syntax:
Commands select the operating mode and modifiers change what is displayed. The command letter and the modifier
letter are written together after a single dash, without spaces. A file can be shown by passing its path as the
only parameter.

FstFile <command+modificator> <first parameter> <second parameter>

{MODES_TABLE}
* Display modifiers:
Modifier       Symbol Result
ignore All     a      Both modifiers below at the same time.
ignore Pause   p      The program exits right after the task instead of waiting for a key press. Useful for
                      batch runs.
ignore Info    i      Tables are not printed; only the exit message (and errors) are shown. Has no effect
                      in 'Show info' mode.

Without modifiers all information available for the mode is shown and the program waits for a key press
before exiting. The pause is also skipped when the output is not a terminal.

Command and modifier letters are case-insensitive. Running the utility without parameters displays short
help. A wrong number, order or kind of arguments is reported as an argument parsing error.

* Files:
Unpacking EXAMPLE.FST writes into the folder EXAMPLE next to it, and listing writes EXAMPLE.list. Packing
EXAMPLE.list resolves its paths against the folder EXAMPLE when it exists, otherwise against the folder
holding the list-file. Settings are read from the file named by FSTFILE_CONFIG, else from fstfile.toml in
the working directory.

* Examples:
FstFile -s EXAMPLE.FST              Display all information about the archive and wait for a key press.
FstFile -ui EXAMPLE.FST             Unpack the archive without printing its table of contents.
FstFile -ep EXAMPLE.FST 0           Extract the first entry (numbering starts from zero) and exit at once.
FstFile -p EXAMPLE.LIST TARGET.FST  Pack the files named in EXAMPLE.LIST into the new archive TARGET.FST.
FstFile -ca EXAMPLE.FST             Unpack the archive and create its list-file, with no output and no pause.
",
        banner()
    )
}

/// Human-readable size suffix, empty below one kilobyte
fn size_suffix(size: u32) -> String {
    let kbytes = f64::from(size) / 1024.0;
    let mbytes = kbytes / 1024.0;
    if mbytes > 1.0 {
        format!("{mbytes:.2} MB")
    } else if kbytes > 1.0 {
        format!("{kbytes:.2} KB")
    } else {
        String::new()
    }
}

fn path_line(label: &str, path: &Path) -> String {
    let shown = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    format!("{label:<15}: {}\n", shown.display())
}

fn count_and_size_lines(entries: usize, file_size: u32) -> String {
    let size_line = format!(
        "FileSize       : {file_size:<16}0x{file_size:<16x}{}",
        size_suffix(file_size)
    );
    format!(
        "AmountEntries  : {entries:<16}0x{entries:x}\n{}\n",
        size_line.trim_end()
    )
}

/// One-line archive location, used when tables are suppressed
pub fn archive_path_line(archive: &Archive) -> String {
    path_line("ArchivePath", archive.path())
}

/// Archive head: path, entry count, size and the entry table title
pub fn archive_head(archive: &Archive) -> String {
    format!(
        "{}{}\n{ENTRY_TABLE_TITLE}\n",
        archive_path_line(archive),
        count_and_size_lines(archive.amount_entries(), archive.file_size()),
    )
}

fn decimal_and_hex(value: u32) -> String {
    format!("{value:<13}0x{value:<11x}")
}

/// One row of the entry table
pub fn entry_row(entry: &Entry) -> String {
    let absent = format!("{:<26}", "-");
    let uncompressed = if entry.uncompressed_size == 0 {
        absent.clone()
    } else {
        decimal_and_hex(entry.uncompressed_size)
    };
    let compressed = match entry.flag {
        CompressFlag::Compressed => decimal_and_hex(entry.compressed_size),
        CompressFlag::Uncompressed | CompressFlag::Empty => absent,
    };
    let flag = format!("{} - {}", entry.flag.letter(), entry.flag.as_str());

    format!(
        "{:<5}{:<3}  {}{uncompressed}{compressed}{flag:<19}{}\n",
        entry.index,
        entry.extension(),
        decimal_and_hex(entry.data_offset),
        entry.path
    )
}

/// Head plus every entry row
pub fn archive_table(archive: &Archive) -> String {
    let mut out = archive_head(archive);
    for entry in archive.entries() {
        out.push_str(&entry_row(entry));
    }
    out
}

/// One-line list-file location, used when the pack summary is suppressed
pub fn list_path_line(list_path: &Path) -> String {
    path_line("ListPath", list_path)
}

/// Summary printed after packing
pub fn pack_summary(list_path: &Path, archive: &Archive) -> String {
    let mut out = list_path_line(list_path);
    out.push_str(&archive_path_line(archive));
    out.push_str(&count_and_size_lines(
        archive.amount_entries(),
        archive.file_size(),
    ));
    out.push('\n');
    out.push_str(PACK_TABLE_TITLE);
    out.push('\n');
    out.push_str(&archive.dump_list_file().serialize());
    out
}

/// Closing line with the numeric result
pub fn result_line(code: ResultCode) -> String {
    format!(
        "\nProcess is over. Result: {}    ({})\n",
        code.as_i32(),
        code.description()
    )
}

/// Diagnostic block printed for processing errors
pub fn diagnostic(err: &Error) -> String {
    let kind = err.kind();
    let mut out = String::new();
    let _ = writeln!(out, "Error Kind : {kind}");
    let _ = writeln!(out, "Error Type : {}", kind.category());
    let _ = writeln!(out, "Description: {}", kind.description());
    if let Some(index) = err.index() {
        let _ = writeln!(out, "Error Index: {index}");
    }
    if let Some(location) = err.location() {
        let _ = writeln!(out, "Module     : {}", location.file());
        let _ = writeln!(out, "Line       : {}", location.line());
    }
    let _ = writeln!(out, "Additional : {err}");
    out
}
