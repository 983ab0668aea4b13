//! Operational log: tracing setup and the backup event reporter.

use std::time::Instant;

use orgbackup::{BackupEvent, EventCallback, SessionSummary};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LogTarget;

/// Identifier under which records appear in the system log.
pub const SYSLOG_IDENTIFIER: &str = "orgbackup";

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "orgbackup=info,orgbackup_cli=info";

/// Install the global tracing subscriber.
///
/// `Syslog` logs to the journal (forwarded to syslog) and falls back to
/// stderr when no journal is reachable.
pub fn init(target: LogTarget) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(DEFAULT_FILTER),
    };
    let registry = tracing_subscriber::registry().with(env_filter);

    let journald_error = match target {
        LogTarget::Syslog => match tracing_journald::layer() {
            Ok(layer) => {
                registry
                    .with(layer.with_syslog_identifier(SYSLOG_IDENTIFIER.to_string()))
                    .init();
                return;
            }
            Err(e) => Some(e),
        },
        LogTarget::Stderr => None,
    };

    registry
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    if let Some(e) = journald_error {
        tracing::warn!(error = %e, "System journal unavailable, logging to stderr");
    }
}

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, event: BackupEvent) {
        match event {
            BackupEvent::SessionStarted { organization, date } => {
                tracing::info!(organization = %organization, date = %date, "Backup session started");
            }

            BackupEvent::ArchiveExists { unit, path } => {
                tracing::info!(unit = %unit, path = %path.display(), "Archive already exists, skipping");
            }

            BackupEvent::Staged { unit, path } => {
                tracing::debug!(unit = %unit, path = %path.display(), "Staging");
            }

            BackupEvent::WikiEmpty { repo } => {
                tracing::debug!(repo = %repo, "Wiki enabled but empty");
            }

            BackupEvent::ArchiveCommitted { unit, path } => {
                tracing::info!(unit = %unit, path = %path.display(), "Archive written");
            }

            BackupEvent::Pruned { path } => {
                tracing::info!(path = %path.display(), "Removed old archive");
            }

            BackupEvent::PruneFailed { unit, error } => {
                tracing::warn!(unit = %unit, error = %error, "Failed to prune old archives");
            }

            BackupEvent::StagingReleaseFailed { path, error } => {
                tracing::warn!(path = %path.display(), error = %error, "Failed to remove staging directory");
            }

            BackupEvent::AttemptFailed {
                unit,
                phase,
                attempt,
                error,
                retry_in,
            } => {
                tracing::warn!(
                    unit = %unit,
                    phase = %phase,
                    attempt,
                    error = %error,
                    retry_in_secs = retry_in.as_secs_f64(),
                    "Backup attempt failed, retrying"
                );
            }

            BackupEvent::UnitFailed { unit, phase, error } => {
                tracing::error!(unit = %unit, phase = %phase, error = %error, "Backup failed");
            }

            BackupEvent::RepositoriesListed { visibility, count } => {
                tracing::info!(visibility = %visibility, count, "Listed repositories");
            }

            BackupEvent::ListingFailed { visibility, error } => {
                tracing::error!(visibility = %visibility, error = %error, "Failed to list repositories");
            }

            BackupEvent::Cancelled => {
                tracing::warn!("Shutdown requested, no further units will be started");
            }

            BackupEvent::SessionCompleted { summary } => {
                tracing::debug!(
                    public = summary.public,
                    private = summary.private,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    listings_failed = summary.listings_failed,
                    cancelled = summary.cancelled,
                    "Session finished"
                );
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// The log of one backup session, opened at start and closed exactly once.
///
/// Closing writes the summary line that `orgbackup-check` looks for.
pub struct SessionLog {
    organization: String,
    started: Instant,
    closed: bool,
}

impl SessionLog {
    pub fn open(organization: &str) -> Self {
        tracing::info!(organization = %organization, "Opening session log");
        Self {
            organization: organization.to_string(),
            started: Instant::now(),
            closed: false,
        }
    }

    /// Event callback feeding this log.
    pub fn callback(&self) -> EventCallback {
        let reporter = LoggingReporter::new();
        Box::new(move |event| reporter.handle(event))
    }

    pub fn close(mut self, summary: &SessionSummary) {
        self.closed = true;
        let elapsed_secs = self.started.elapsed().as_secs();

        if summary.cancelled {
            tracing::warn!(
                organization = %self.organization,
                elapsed_secs,
                "session was interrupted, {} public and {} private repositories backed up",
                summary.public,
                summary.private
            );
            return;
        }

        if summary.listings_failed > 0 {
            tracing::error!(
                organization = %self.organization,
                listings_failed = summary.listings_failed,
                elapsed_secs,
                "{}",
                incomplete_line(summary)
            );
            return;
        }

        if summary.failed > 0 {
            tracing::warn!(
                organization = %self.organization,
                failed = summary.failed,
                "{} units could not be backed up",
                summary.failed
            );
        }
        tracing::info!(
            organization = %self.organization,
            skipped = summary.skipped,
            elapsed_secs,
            "{}",
            summary_line(summary)
        );
    }
}

impl Drop for SessionLog {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!(organization = %self.organization, "Session log closed without a summary");
        }
    }
}

/// The line marking a completed session in the system log.
pub fn summary_line(summary: &SessionSummary) -> String {
    format!(
        "session is now completed, {} public and {} private repositories backed up",
        summary.public, summary.private
    )
}

/// The line closing a session that could not list every repository.
///
/// It must never contain the completed marker.
pub fn incomplete_line(summary: &SessionSummary) -> String {
    format!(
        "session is incomplete, {} repository listings failed, {} public and {} private repositories backed up",
        summary.listings_failed, summary.public, summary.private
    )
}
