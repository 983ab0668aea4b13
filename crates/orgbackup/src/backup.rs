//! Backup job orchestration.
//!
//! This module sequences the archive namer, staging area, exporters,
//! repository fetcher, packer, and retention pruner into a backup session.
//!
//! # Module Structure
//!
//! - [`types`] - Units of work, session options and summary
//! - [`error`] - `BackupError` and its phase classification
//! - [`engine`] - The [`Orchestrator`] running a session
//!
//! # Example
//!
//! ```ignore
//! use orgbackup::backup::{BackupOptions, Orchestrator};
//! use orgbackup::retry::RetryPolicy;
//!
//! let options = BackupOptions::new("/srv/backup", "my-org")
//!     .with_retention(7)
//!     .with_retry(RetryPolicy::default().with_max_attempts(10));
//! let summary = Orchestrator::new(source, mirror, options)
//!     .run(Some(&callback))
//!     .await;
//! ```

pub mod engine;
mod error;
mod types;

pub use engine::Orchestrator;
pub use error::BackupError;
pub use types::{BackupOptions, BackupUnit, JobPhase, SessionSummary, UnitOutcome};
