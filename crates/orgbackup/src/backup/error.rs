use std::io;

use thiserror::Error;

use super::types::JobPhase;
use crate::archive::ArchiveError;
use crate::export::ExportError;
use crate::mirror::MirrorError;
use crate::platform::PlatformError;

/// Errors that end one attempt of a backup unit.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("failed to create staging directory: {0}")]
    Staging(#[source] io::Error),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("backup session cancelled")]
    Cancelled,
}

impl BackupError {
    /// The phase this error ends an attempt in.
    pub fn phase(&self) -> JobPhase {
        match self {
            Self::Cancelled => JobPhase::Check,
            Self::Staging(_) => JobPhase::Stage,
            Self::Export(_) | Self::Mirror(_) | Self::Platform(_) => JobPhase::Execute,
            Self::Archive(_) | Self::Task(_) => JobPhase::Package,
        }
    }

    /// Whether a new attempt may succeed.
    ///
    /// Everything except cancellation is treated as transient: the upstream
    /// failures seen in practice (timeouts, 5xx, rate limits, interrupted
    /// clones) do not classify reliably.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}
