//! Units of work and session bookkeeping.

use std::fmt;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::archive::{Category, StableKey};
use crate::platform::{RepoRecord, Visibility};
use crate::retry::RetryPolicy;

/// One independently archived piece of the organization.
#[derive(Debug, Clone)]
pub enum BackupUnit {
    /// The organization's member profiles.
    Members,
    /// The organization's team rosters.
    Teams,
    /// One repository with its metadata.
    Repository {
        visibility: Visibility,
        repo: RepoRecord,
    },
}

impl BackupUnit {
    pub fn repository(visibility: Visibility, repo: RepoRecord) -> Self {
        Self::Repository { visibility, repo }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Members => Category::Members,
            Self::Teams => Category::Teams,
            Self::Repository { visibility, .. } => Category::for_visibility(*visibility),
        }
    }

    pub fn stable_key(&self) -> StableKey {
        match self {
            Self::Members => StableKey::members(),
            Self::Teams => StableKey::teams(),
            Self::Repository { repo, .. } => StableKey::repository(&repo.name, repo.id),
        }
    }

    /// Whether failed attempts of this unit are retried.
    pub fn is_retried(&self) -> bool {
        matches!(self, Self::Repository { .. })
    }
}

impl fmt::Display for BackupUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Members => f.write_str("members"),
            Self::Teams => f.write_str("teams"),
            Self::Repository { visibility, repo } => {
                write!(f, "{visibility} repository {}-{}", repo.name, repo.id)
            }
        }
    }
}

/// Phase of a unit's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Check,
    Stage,
    Execute,
    Package,
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Check => "check",
            Self::Stage => "stage",
            Self::Execute => "execute",
            Self::Package => "package",
        };
        f.write_str(name)
    }
}

/// Terminal state of one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    /// The archive for the session date already existed.
    Skipped(PathBuf),
    /// A new archive was written.
    Committed(PathBuf),
    /// The unit failed; the message of the last error.
    Failed(String),
    /// The session was cancelled before the unit completed.
    Cancelled,
}

/// Aggregate result of a backup session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Public repositories archived in this session.
    pub public: usize,
    /// Private repositories archived in this session.
    pub private: usize,
    /// Units whose archive already existed.
    pub skipped: usize,
    /// Units that failed.
    pub failed: usize,
    /// Visibility classes whose repository listing failed.
    pub listings_failed: usize,
    /// Whether the session stopped early because it was cancelled.
    pub cancelled: bool,
}

impl SessionSummary {
    /// Record the outcome of a unit.
    pub fn record(&mut self, unit: &BackupUnit, outcome: &UnitOutcome) {
        match (unit, outcome) {
            (BackupUnit::Repository { visibility, .. }, UnitOutcome::Committed(_)) => {
                match visibility {
                    Visibility::Public => self.public += 1,
                    Visibility::Private => self.private += 1,
                }
            }
            (_, UnitOutcome::Committed(_)) => {}
            (_, UnitOutcome::Skipped(_)) => self.skipped += 1,
            (_, UnitOutcome::Failed(_)) => self.failed += 1,
            (_, UnitOutcome::Cancelled) => self.cancelled = true,
        }
    }

    /// Whether every unit of the organization was attempted.
    ///
    /// False when the session was cancelled or a repository listing failed.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.listings_failed == 0
    }
}

/// Options for a backup session.
#[derive(Debug, Clone)]
pub struct BackupOptions {
    /// Root of the archive tree.
    pub destdir: PathBuf,
    /// Organization to back up.
    pub organization: String,
    /// Date stamped on every archive; fixed for the whole session.
    pub date: NaiveDate,
    /// Archives to keep per stable key. `None` disables pruning.
    pub retention: Option<usize>,
    /// Retry policy for repository units.
    pub retry: RetryPolicy,
}

impl BackupOptions {
    /// Options dated today (local time), without pruning, with the default retry policy.
    pub fn new(destdir: impl Into<PathBuf>, organization: impl Into<String>) -> Self {
        Self {
            destdir: destdir.into(),
            organization: organization.into(),
            date: Local::now().date_naive(),
            retention: None,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    #[must_use]
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.retention = Some(retention);
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
