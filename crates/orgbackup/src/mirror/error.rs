use std::io;

use thiserror::Error;

/// Errors from mirroring a repository.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The remote repository does not exist (for a wiki: enabled but empty).
    #[error("repository not found: {remote}")]
    NotFound { remote: String },

    /// The mirror command ran and failed.
    #[error("mirroring {remote} failed ({status}): {stderr}")]
    Failed {
        remote: String,
        status: String,
        stderr: String,
    },

    /// The mirror command could not be started.
    #[error("failed to run git: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },

    /// The remote URL could not be built.
    #[error("invalid remote URL: {message}")]
    InvalidUrl { message: String },
}

impl MirrorError {
    /// Whether the remote does not exist.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
