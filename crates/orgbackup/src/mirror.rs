//! Repository mirroring.
//!
//! - [`Mirror`] - the side-effecting "mirror a remote into a directory" operation
//! - [`GitMirror`] - implementation driving `git clone --mirror`
//! - [`fetch_repository`] - mirrors a repository's code and, when enabled, its wiki

mod error;
mod fetch;
mod git;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;

pub use error::MirrorError;
pub use fetch::{FetchResult, WikiOutcome, fetch_repository};
pub use git::{DEFAULT_GIT_URL, GitMirror};

/// Which part of a repository to mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepoPart {
    /// The repository's code (all refs and history).
    Code,
    /// The repository's wiki, hosted as a separate git repository.
    Wiki,
}

/// A remote repository to mirror.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MirrorSource<'a> {
    pub org: &'a str,
    pub repo: &'a str,
    pub part: RepoPart,
}

impl<'a> MirrorSource<'a> {
    pub fn code(org: &'a str, repo: &'a str) -> Self {
        Self {
            org,
            repo,
            part: RepoPart::Code,
        }
    }

    pub fn wiki(org: &'a str, repo: &'a str) -> Self {
        Self {
            org,
            repo,
            part: RepoPart::Wiki,
        }
    }
}

impl fmt::Display for MirrorSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.part {
            RepoPart::Code => write!(f, "{}/{}", self.org, self.repo),
            RepoPart::Wiki => write!(f, "{}/{}.wiki", self.org, self.repo),
        }
    }
}

/// Mirror a remote repository into a local directory.
///
/// Implementations hold whatever credentials they need and must never
/// include them in returned errors.
#[async_trait]
pub trait Mirror: Send + Sync {
    /// Create a full mirror (all refs, all history) of `source` at `target`.
    ///
    /// `target` must not exist yet.
    async fn mirror(&self, source: &MirrorSource<'_>, target: &Path) -> Result<(), MirrorError>;
}
