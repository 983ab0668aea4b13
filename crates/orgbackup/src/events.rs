//! Lifecycle events reported during a backup session.
//!
//! The library never writes to the log directly for lifecycle events.
//! Components emit [`BackupEvent`]s through an explicitly passed
//! [`EventCallback`]; the caller decides how to record them (the CLI maps
//! them onto `tracing` records sent to the system log).

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::backup::{JobPhase, SessionSummary};
use crate::platform::Visibility;

/// Events emitted while a backup session runs.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum BackupEvent {
    /// A session started.
    SessionStarted {
        /// Organization being backed up.
        organization: String,
        /// Date stamped on every archive of this session.
        date: NaiveDate,
    },

    /// The archive for a unit already exists for the session date.
    ArchiveExists {
        /// Unit label (e.g. `members`, `public repository widgets-42`).
        unit: String,
        /// The existing archive.
        path: PathBuf,
    },

    /// A staging directory was acquired for one attempt.
    Staged {
        /// Unit label.
        unit: String,
        /// The staging directory.
        path: PathBuf,
    },

    /// The wiki is enabled but has no content; not an error.
    WikiEmpty {
        /// Repository name.
        repo: String,
    },

    /// A unit's archive was written and is now durable.
    ArchiveCommitted {
        /// Unit label.
        unit: String,
        /// The new archive.
        path: PathBuf,
    },

    /// An old archive was deleted by the retention policy.
    Pruned {
        /// The deleted archive.
        path: PathBuf,
    },

    /// Pruning old archives failed; the new archive is unaffected.
    PruneFailed {
        /// Unit label.
        unit: String,
        /// Error message.
        error: String,
    },

    /// A staging directory could not be removed.
    StagingReleaseFailed {
        /// The staging directory left behind.
        path: PathBuf,
        /// Error message.
        error: String,
    },

    /// One attempt of a retried unit failed; the unit will be retried.
    AttemptFailed {
        /// Unit label.
        unit: String,
        /// Phase in which the attempt failed.
        phase: JobPhase,
        /// Attempt number (1-indexed).
        attempt: usize,
        /// Error message.
        error: String,
        /// Delay before the next attempt.
        retry_in: Duration,
    },

    /// A unit failed and will not be retried.
    UnitFailed {
        /// Unit label.
        unit: String,
        /// Phase in which the unit failed.
        phase: JobPhase,
        /// Error message.
        error: String,
    },

    /// Repositories of one visibility class were listed.
    RepositoriesListed {
        /// Visibility class.
        visibility: Visibility,
        /// Number of repositories.
        count: usize,
    },

    /// Listing repositories of one visibility class failed; the class is skipped.
    ListingFailed {
        /// Visibility class.
        visibility: Visibility,
        /// Error message.
        error: String,
    },

    /// Cancellation was observed; no further units are started.
    Cancelled,

    /// The session finished (completely or after cancellation).
    SessionCompleted {
        /// Aggregate counts.
        summary: SessionSummary,
    },
}

/// Callback receiving backup events.
pub type EventCallback = Box<dyn Fn(BackupEvent) + Send + Sync>;

/// Emit an event if a callback is provided.
///
/// Avoids repetitive `if let Some(cb) = ...` patterns at every call site.
#[inline]
pub fn emit(on_event: Option<&EventCallback>, event: BackupEvent) {
    if let Some(cb) = on_event {
        cb(event);
    }
}
