use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors from writing, listing, or deleting archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Filesystem error on a specific path.
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archive already exists; archives are never overwritten.
    #[error("archive already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}

impl ArchiveError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
