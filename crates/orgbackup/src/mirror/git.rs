use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use url::Url;

use super::{Mirror, MirrorError, MirrorSource, RepoPart};

/// Default host for repository mirrors.
pub const DEFAULT_GIT_URL: &str = "https://github.com";

/// Mirrors repositories with `git clone --mirror` over HTTPS.
///
/// Credentials are embedded in the remote URL passed to git and scrubbed
/// from every error this type returns.
#[derive(Clone)]
pub struct GitMirror {
    base: Url,
    username: String,
    password: String,
    git: PathBuf,
}

impl std::fmt::Debug for GitMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitMirror")
            .field("base", &self.base.as_str())
            .field("username", &self.username)
            .field("git", &self.git)
            .finish_non_exhaustive()
    }
}

impl GitMirror {
    /// Create a mirror for repositories hosted under `base_url`.
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self, MirrorError> {
        let mut base = Url::parse(base_url).map_err(|e| MirrorError::InvalidUrl {
            message: format!("{base_url}: {e}"),
        })?;
        if base.cannot_be_a_base() {
            return Err(MirrorError::InvalidUrl {
                message: format!("{base_url}: not a base URL"),
            });
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            base,
            username: username.to_string(),
            password: password.to_string(),
            git: PathBuf::from("git"),
        })
    }

    /// Use a specific git executable instead of `git` from `PATH`.
    #[must_use]
    pub fn with_git(mut self, git: impl Into<PathBuf>) -> Self {
        self.git = git.into();
        self
    }

    /// Remote URL without credentials, safe to log.
    pub fn display_url(&self, source: &MirrorSource<'_>) -> Result<Url, MirrorError> {
        let suffix = match source.part {
            RepoPart::Code => "",
            RepoPart::Wiki => ".wiki",
        };
        self.base
            .join(&format!("{}/{}{}.git", source.org, source.repo, suffix))
            .map_err(|e| MirrorError::InvalidUrl {
                message: format!("{source}: {e}"),
            })
    }

    /// Remote URL with credentials, passed to git only.
    fn remote_url(&self, source: &MirrorSource<'_>) -> Result<Url, MirrorError> {
        let mut url = self.display_url(source)?;
        if url.has_host() && !self.username.is_empty() {
            url.set_username(&self.username)
                .and_then(|()| url.set_password(Some(&self.password)))
                .map_err(|()| MirrorError::InvalidUrl {
                    message: format!("{source}: cannot carry credentials"),
                })?;
        }
        Ok(url)
    }

    /// Remove credentials from text produced by git.
    fn redact(&self, text: &str, remote: &Url, display: &Url) -> String {
        let mut text = text.replace(remote.as_str(), display.as_str());
        if !self.password.is_empty() {
            text = text.replace(&self.password, "***");
        }
        text
    }
}

/// Whether git's stderr says the remote repository does not exist.
///
/// Hosts answer a request for a wiki that was never written to the same way
/// as for a missing repository.
pub(crate) fn is_not_found(stderr: &str) -> bool {
    let stderr = stderr.to_ascii_lowercase();
    stderr.contains("repository not found")
        || (stderr.contains("repository '") && stderr.contains("' not found"))
        || stderr.contains("does not appear to be a git repository")
}

#[async_trait]
impl Mirror for GitMirror {
    async fn mirror(&self, source: &MirrorSource<'_>, target: &Path) -> Result<(), MirrorError> {
        let display_url = self.display_url(source)?;
        let remote = self.remote_url(source)?;

        tracing::debug!(remote = %display_url, target = %target.display(), "Mirroring");

        let output = Command::new(&self.git)
            .args(["clone", "--mirror", "--quiet"])
            .arg(remote.as_str())
            .arg(target)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| MirrorError::Spawn { source })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = self.redact(
            String::from_utf8_lossy(&output.stderr).trim(),
            &remote,
            &display_url,
        );
        if is_not_found(&stderr) {
            return Err(MirrorError::NotFound {
                remote: display_url.to_string(),
            });
        }

        Err(MirrorError::Failed {
            remote: display_url.to_string(),
            status: output.status.to_string(),
            stderr,
        })
    }
}
