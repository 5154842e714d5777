//! Locating the journal the game is currently writing.

use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
    time::SystemTime,
};

use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;

static JOURNAL_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Journal\.(\d{12}|\d{4}-\d{2}-\d{2}T\d{6})\.\d{2}\.log$")
        .expect("journal name pattern is valid")
});

/// Whether `name` follows the journal naming convention, in either the
/// compact or the ISO-like timestamp form.
pub fn is_journal_name(name: &str) -> bool {
    JOURNAL_NAME.is_match(name)
}

/// The most recently modified journal directly inside `dir`.
///
/// Equal modification times are broken by file name, which embeds the
/// session start time.
pub fn latest_journal(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_str().is_some_and(is_journal_name))
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((modified, entry.into_path()))
        })
        .max_by(|(left_time, left), (right_time, right)| compare(left_time, left, right_time, right))
        .map(|(_, path)| path)
}

fn compare(left_time: &SystemTime, left: &Path, right_time: &SystemTime, right: &Path) -> Ordering {
    left_time
        .cmp(right_time)
        .then_with(|| left.file_name().cmp(&right.file_name()))
}
