//! orgbackup - dated snapshot archives of a hosted code organization.
//!
//! This library backs up an organization's members, teams, and repositories
//! (code, wiki, and metadata) into immutable `.tar.bz2` archives, one per
//! unit per day, and prunes old archives according to a retention count.
//!
//! # Features
//!
//! - `github` - Enables the [`github::GitHubClient`] platform source built on
//!   `octocrab`. Enabled by default.
//!
//! # Example
//!
//! ```ignore
//! use orgbackup::backup::{BackupOptions, Orchestrator};
//! use orgbackup::github::GitHubClient;
//! use orgbackup::mirror::GitMirror;
//!
//! let source = GitHubClient::new(&token, None)?;
//! let mirror = GitMirror::new("https://github.com", &username, &token)?;
//! let options = BackupOptions::new("/srv/backup", "my-org");
//!
//! let summary = Orchestrator::new(source, mirror, options).run(None).await;
//! println!("{} public, {} private", summary.public, summary.private);
//! ```

pub mod archive;
pub mod backup;
pub mod cancel;
pub mod events;
pub mod export;
pub mod mirror;
pub mod platform;
pub mod retry;
pub mod staging;

#[cfg(feature = "github")]
pub mod github;

pub use archive::{ArchiveNamer, ArchivePath, Category, StableKey};
pub use backup::{BackupError, BackupOptions, BackupUnit, Orchestrator, SessionSummary};
pub use cancel::CancellationToken;
pub use events::{BackupEvent, EventCallback, emit};
pub use mirror::{GitMirror, Mirror, MirrorError};
pub use platform::{PlatformError, PlatformSource, Record, RepoRecord, Visibility};
pub use retry::RetryPolicy;
