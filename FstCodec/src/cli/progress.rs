//! CLI progress display utilities

use console::Emoji;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::fst::{FstPhase, FstProgress};

/// Package - for extraction operations
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
/// Floppy disk - for packing operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");

/// Progress bar style for determinate progress
///
/// Format: `📦 Extracting files [████████░░░░░░░░] 50/100`
///
/// # Panics
/// Panics if the template string is invalid (this is a compile-time constant).
#[must_use]
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix}{msg} [{bar:40.cyan/blue}] {pos}/{len}")
        .expect("valid template")
        .progress_chars("█▓░")
}

/// Create a progress bar on stderr, hidden when `quiet` is set
#[must_use]
pub fn phase_bar(total: usize, emoji: Emoji<'_, '_>, quiet: bool) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    if quiet {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.set_style(bar_style());
    pb.set_prefix(emoji.to_string());
    pb
}

/// Feed an archive progress update into a bar
pub fn update(pb: &ProgressBar, progress: &FstProgress) {
    match progress.phase {
        FstPhase::Complete => pb.finish_and_clear(),
        phase => {
            pb.set_length(progress.total as u64);
            pb.set_position(progress.current as u64);
            pb.set_message(phase.as_str());
        }
    }
}

