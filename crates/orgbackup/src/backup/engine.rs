//! The backup session orchestrator.
//!
//! A session walks the units of one organization strictly in order: members,
//! teams, public repositories, private repositories. Each unit runs the
//! state machine `CHECK -> STAGE -> EXECUTE -> PACKAGE -> COMMIT -> CLEANUP`.
//! Repository units are wrapped in the session's [`RetryPolicy`]; every retry
//! starts over from `CHECK` with a fresh staging directory.
//!
//! [`RetryPolicy`]: crate::retry::RetryPolicy

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use backon::Retryable;

use super::error::BackupError;
use super::types::{BackupOptions, BackupUnit, JobPhase, SessionSummary, UnitOutcome};
use crate::archive::{ArchiveNamer, ArchivePath, StableKey, pack_directory, prune};
use crate::cancel::CancellationToken;
use crate::events::{BackupEvent, EventCallback, emit};
use crate::export;
use crate::mirror::{Mirror, WikiOutcome, fetch_repository};
use crate::platform::{PlatformSource, RepoRecord, Visibility, short_error_message};
use crate::staging::StagingDir;

/// Runs backup sessions for one organization.
pub struct Orchestrator<S, M> {
    source: S,
    mirror: M,
    namer: ArchiveNamer,
    options: BackupOptions,
    cancel: CancellationToken,
}

impl<S: PlatformSource, M: Mirror> Orchestrator<S, M> {
    pub fn new(source: S, mirror: M, options: BackupOptions) -> Self {
        Self {
            source,
            mirror,
            namer: ArchiveNamer::new(&options.destdir),
            options,
            cancel: CancellationToken::new(),
        }
    }

    /// Observe `cancel` between units, at every `CHECK`, and before every retry.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn options(&self) -> &BackupOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    /// Run a full session and return its summary.
    ///
    /// Per-unit failures never abort the session; they are reported through
    /// `on_event` and counted in the summary. A cancelled session returns
    /// what completed before cancellation was observed.
    pub async fn run(&self, on_event: Option<&EventCallback>) -> SessionSummary {
        emit(
            on_event,
            BackupEvent::SessionStarted {
                organization: self.options.organization.clone(),
                date: self.options.date,
            },
        );

        let mut summary = SessionSummary::default();
        self.run_units(&mut summary, on_event).await;

        if summary.cancelled {
            emit(on_event, BackupEvent::Cancelled);
        }
        emit(
            on_event,
            BackupEvent::SessionCompleted {
                summary: summary.clone(),
            },
        );
        summary
    }

    async fn run_units(&self, summary: &mut SessionSummary, on_event: Option<&EventCallback>) {
        for unit in [BackupUnit::Members, BackupUnit::Teams] {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                return;
            }
            let outcome = self.run_unit(&unit, on_event).await;
            summary.record(&unit, &outcome);
        }

        for visibility in Visibility::ALL {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                return;
            }
            for repo in self.list_repositories(visibility, summary, on_event).await {
                if self.cancel.is_cancelled() {
                    summary.cancelled = true;
                    return;
                }
                let unit = BackupUnit::repository(visibility, repo);
                let outcome = self.run_unit(&unit, on_event).await;
                summary.record(&unit, &outcome);
            }
        }
    }

    /// List one visibility class. A failed listing skips the class and is
    /// counted in the summary.
    async fn list_repositories(
        &self,
        visibility: Visibility,
        summary: &mut SessionSummary,
        on_event: Option<&EventCallback>,
    ) -> Vec<RepoRecord> {
        let records = match self
            .source
            .list_repos(&self.options.organization, visibility)
            .await
        {
            Ok(records) => records,
            Err(e) => {
                emit(
                    on_event,
                    BackupEvent::ListingFailed {
                        visibility,
                        error: short_error_message(&e),
                    },
                );
                summary.listings_failed += 1;
                return Vec::new();
            }
        };

        let mut repos = Vec::with_capacity(records.len());
        for record in records {
            match RepoRecord::from_record(record) {
                Ok(repo) => repos.push(repo),
                Err(e) => {
                    emit(
                        on_event,
                        BackupEvent::UnitFailed {
                            unit: format!("{visibility} repository"),
                            phase: JobPhase::Check,
                            error: e.to_string(),
                        },
                    );
                    summary.failed += 1;
                }
            }
        }

        emit(
            on_event,
            BackupEvent::RepositoriesListed {
                visibility,
                count: repos.len(),
            },
        );
        repos
    }

    /// Run one unit to a terminal outcome, retrying repository units.
    pub async fn run_unit(
        &self,
        unit: &BackupUnit,
        on_event: Option<&EventCallback>,
    ) -> UnitOutcome {
        let label = unit.to_string();

        let result = if unit.is_retried() {
            let attempts = AtomicUsize::new(0);
            (|| {
                attempts.fetch_add(1, Ordering::SeqCst);
                self.attempt(unit, on_event)
            })
            .retry(self.options.retry.clone().into_backoff())
            .when(|e: &BackupError| e.is_retryable() && !self.cancel.is_cancelled())
            .notify(|e: &BackupError, retry_in: Duration| {
                emit(
                    on_event,
                    BackupEvent::AttemptFailed {
                        unit: label.clone(),
                        phase: e.phase(),
                        attempt: attempts.load(Ordering::SeqCst),
                        error: short_error_message(e),
                        retry_in,
                    },
                );
            })
            .await
        } else {
            self.attempt(unit, on_event).await
        };

        match result {
            Ok(outcome) => outcome,
            Err(BackupError::Cancelled) => UnitOutcome::Cancelled,
            Err(e) => {
                let error = short_error_message(&e);
                emit(
                    on_event,
                    BackupEvent::UnitFailed {
                        unit: label,
                        phase: e.phase(),
                        error: error.clone(),
                    },
                );
                UnitOutcome::Failed(error)
            }
        }
    }

    /// One pass through the unit state machine.
    async fn attempt(
        &self,
        unit: &BackupUnit,
        on_event: Option<&EventCallback>,
    ) -> Result<UnitOutcome, BackupError> {
        // CHECK
        if self.cancel.is_cancelled() {
            return Err(BackupError::Cancelled);
        }
        let key = unit.stable_key();
        let archive = self.namer.path(unit.category(), &key, self.options.date);
        if archive.exists() {
            emit(
                on_event,
                BackupEvent::ArchiveExists {
                    unit: unit.to_string(),
                    path: archive.path().to_path_buf(),
                },
            );
            return Ok(UnitOutcome::Skipped(archive.path().to_path_buf()));
        }

        // STAGE
        let staging = StagingDir::acquire(self.namer.destdir()).map_err(BackupError::Staging)?;
        emit(
            on_event,
            BackupEvent::Staged {
                unit: unit.to_string(),
                path: staging.path().to_path_buf(),
            },
        );

        // EXECUTE, PACKAGE
        let result = match self.execute(unit, staging.path(), on_event).await {
            Ok(()) => package(staging.path(), &key, archive.path()).await,
            Err(e) => Err(e),
        };

        // COMMIT
        if result.is_ok() {
            self.commit(unit, &key, &archive, on_event);
        }

        // CLEANUP
        release(staging, on_event);

        result.map(|()| UnitOutcome::Committed(archive.path().to_path_buf()))
    }

    async fn execute(
        &self,
        unit: &BackupUnit,
        dir: &Path,
        on_event: Option<&EventCallback>,
    ) -> Result<(), BackupError> {
        let org = self.options.organization.as_str();

        match unit {
            BackupUnit::Members => {
                let count = export::export_members(&self.source, org, dir).await?;
                tracing::debug!(count, "Exported members");
            }
            BackupUnit::Teams => {
                let count = export::export_teams(&self.source, org, dir).await?;
                tracing::debug!(count, "Exported teams");
            }
            BackupUnit::Repository { repo, .. } => {
                let fetched = fetch_repository(&self.mirror, org, repo, dir).await?;
                if fetched.wiki == WikiOutcome::Empty {
                    emit(
                        on_event,
                        BackupEvent::WikiEmpty {
                            repo: repo.name.clone(),
                        },
                    );
                }

                export::export_repo_details(repo, dir).await?;
                export::export_collaborators(&self.source, org, &repo.name, dir).await?;
                export::export_pulls(&self.source, org, &repo.name, dir).await?;
                if repo.has_issues {
                    export::export_issues(&self.source, org, &repo.name, dir).await?;
                }
            }
        }

        Ok(())
    }

    /// The archive is durable; apply retention. Pruning never fails the unit.
    fn commit(
        &self,
        unit: &BackupUnit,
        key: &StableKey,
        archive: &ArchivePath,
        on_event: Option<&EventCallback>,
    ) {
        emit(
            on_event,
            BackupEvent::ArchiveCommitted {
                unit: unit.to_string(),
                path: archive.path().to_path_buf(),
            },
        );

        let Some(retain) = self.options.retention else {
            return;
        };
        if let Err(e) = prune(archive.category_dir(), key, retain, on_event) {
            emit(
                on_event,
                BackupEvent::PruneFailed {
                    unit: unit.to_string(),
                    error: e.to_string(),
                },
            );
        }
    }
}

/// Pack a staging directory on the blocking pool.
async fn package(staging: &Path, key: &StableKey, dest: &Path) -> Result<(), BackupError> {
    let source = staging.to_path_buf();
    let root_name = key.to_string();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || pack_directory(&source, &root_name, &dest))
        .await
        .map_err(|e| BackupError::Task(e.to_string()))??;
    Ok(())
}

fn release(staging: StagingDir, on_event: Option<&EventCallback>) {
    let path = staging.path().to_path_buf();
    if let Err(e) = staging.release() {
        emit(
            on_event,
            BackupEvent::StagingReleaseFailed {
                path,
                error: e.to_string(),
            },
        );
    }
}
