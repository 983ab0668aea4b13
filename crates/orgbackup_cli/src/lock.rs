//! Single-writer lock on the destination directory.

use std::fs::{self, File, OpenOptions, TryLockError};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Lock file name inside `destdir`.
pub const LOCK_FILE: &str = ".orgbackup.lock";

#[derive(Debug, Error)]
pub enum LockError {
    #[error("another orgbackup session is running ({} is locked)", .0.display())]
    Busy(PathBuf),

    #[error("failed to lock {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Exclusive advisory lock held for the whole session.
///
/// Released when dropped, and by the OS if the process dies.
#[derive(Debug)]
pub struct RunLock {
    _file: File,
    path: PathBuf,
}

impl RunLock {
    /// Lock `destdir`, creating it if needed. Never blocks.
    pub fn acquire(destdir: &Path) -> Result<Self, LockError> {
        let path = destdir.join(LOCK_FILE);
        let io_error = |source| LockError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(destdir).map_err(io_error)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(io_error)?;

        match file.try_lock() {
            Ok(()) => Ok(Self { _file: file, path }),
            Err(TryLockError::WouldBlock) => Err(LockError::Busy(path)),
            Err(TryLockError::Error(source)) => Err(io_error(source)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
