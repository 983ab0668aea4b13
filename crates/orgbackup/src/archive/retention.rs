//! Retention: keep the N most recently modified archives of a stable key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::NaiveDate;

use super::error::ArchiveError;
use super::namer::{ARCHIVE_EXTENSION, DATE_FORMAT, StableKey};
use crate::events::{BackupEvent, EventCallback, emit};

/// List the archives of `key` in `category_dir`, oldest first.
///
/// Only files named exactly `<key>-<YYYY-MM-DD>.tar.bz2` match, so a key
/// that is a prefix of another (`web-1` and `web-1-5`) never captures the
/// other key's archives. Ordering is by modification time, then file name.
/// A missing category directory yields an empty list.
pub fn list_archives(category_dir: &Path, key: &StableKey) -> Result<Vec<PathBuf>, ArchiveError> {
    let entries = match fs::read_dir(category_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ArchiveError::io("read directory", category_dir, e)),
    };

    let mut archives: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ArchiveError::io("read directory", category_dir, e))?;
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !matches_key(file_name, key) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| ArchiveError::io("stat", &path, e))?;
        archives.push((modified, path));
    }

    archives.sort();
    Ok(archives.into_iter().map(|(_, path)| path).collect())
}

/// Delete all but the `retain` most recently modified archives of `key`.
///
/// Returns the deleted paths, oldest first. Having fewer than `retain`
/// archives is not an error and deletes nothing. Each deletion is reported
/// as a [`BackupEvent::Pruned`].
pub fn prune(
    category_dir: &Path,
    key: &StableKey,
    retain: usize,
    on_event: Option<&EventCallback>,
) -> Result<Vec<PathBuf>, ArchiveError> {
    let archives = list_archives(category_dir, key)?;
    let excess = archives.len().saturating_sub(retain);

    let mut deleted = Vec::with_capacity(excess);
    for path in archives.into_iter().take(excess) {
        fs::remove_file(&path).map_err(|e| ArchiveError::io("remove", &path, e))?;
        tracing::debug!(path = %path.display(), "Removed archive");
        emit(on_event, BackupEvent::Pruned { path: path.clone() });
        deleted.push(path);
    }

    Ok(deleted)
}

fn matches_key(file_name: &str, key: &StableKey) -> bool {
    file_name
        .strip_prefix(key.as_str())
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|rest| rest.strip_suffix(ARCHIVE_EXTENSION))
        .is_some_and(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok())
}
