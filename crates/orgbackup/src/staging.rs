//! Per-attempt staging directories.

use std::fs;
use std::io;
use std::path::Path;

use tempfile::{Builder, TempDir};

/// Prefix of every staging directory created under `destdir`.
pub const STAGING_PREFIX: &str = ".staging-";

/// An exclusively owned, uniquely named working directory under `destdir`.
///
/// Created fresh for every job attempt and removed when the attempt ends.
/// [`StagingDir::release`] removes it and reports failures; dropping an
/// unreleased `StagingDir` (early return, `?`, panic unwinding) removes it on
/// a best-effort basis, so each acquisition is released exactly once.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// Create a new empty staging directory under `destdir`.
    ///
    /// `destdir` is created if missing. Unique naming is delegated to the
    /// platform's temporary-file primitives, so concurrent and earlier
    /// staging directories never collide.
    pub fn acquire(destdir: &Path) -> io::Result<Self> {
        fs::create_dir_all(destdir)?;
        let dir = Builder::new().prefix(STAGING_PREFIX).tempdir_in(destdir)?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Recursively remove the staging directory.
    pub fn release(self) -> io::Result<()> {
        self.dir.close()
    }
}
