//! Configuration file support for orgbackup.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. Environment variables (`ORGBACKUP_USERNAME`, `ORGBACKUP_PASSWORD`,
//!    `ORGBACKUP_ORGANIZATION`, `ORGBACKUP_DESTDIR`, `ORGBACKUP_RETENTION`)
//! 2. The INI file given with `-c`
//! 3. Built-in defaults
//!
//! Comments must sit on their own line; text after a value is part of it.
//!
//! Example config file:
//! ```ini
//! [github-backup]
//! username = backup-bot
//! ; personal access token
//! password = ghp_example
//! organization = my-org
//! destdir = /srv/backup/github
//! ; optional, no pruning when absent
//! retention = 7
//! ; optional
//! retry_delay_secs = 5
//! ; optional, unbounded when absent
//! max_attempts = 20
//! ; optional, for GitHub Enterprise
//! api_url = https://ghe.example.com/api/v3
//! git_url = https://ghe.example.com
//! ; syslog or stderr
//! log = syslog
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config as ConfigBuilder, File, FileFormat, Source};
use orgbackup::RetryPolicy;
use orgbackup::mirror::DEFAULT_GIT_URL;
use serde::Deserialize;
use thiserror::Error;

/// INI section holding every setting.
pub const SECTION: &str = "github-backup";

/// Environment variables overriding file settings.
const ENV_OVERRIDES: [(&str, &str); 5] = [
    ("ORGBACKUP_USERNAME", "username"),
    ("ORGBACKUP_PASSWORD", "password"),
    ("ORGBACKUP_ORGANIZATION", "organization"),
    ("ORGBACKUP_DESTDIR", "destdir"),
    ("ORGBACKUP_RETENTION", "retention"),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("missing required setting `{0}` in [github-backup]")]
    Missing(&'static str),

    #[error("invalid setting `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Where log records go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// The system journal, falling back to stderr when unavailable.
    #[default]
    Syslog,
    Stderr,
}

/// Raw file contents.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    #[serde(rename = "github-backup")]
    backup: RawSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSection {
    username: Option<String>,
    password: Option<String>,
    organization: Option<String>,
    destdir: Option<PathBuf>,
    retention: Option<usize>,
    retry_delay_secs: Option<u64>,
    max_attempts: Option<usize>,
    api_url: Option<String>,
    git_url: Option<String>,
    log: Option<LogTarget>,
}

/// Validated settings for one backup session.
#[derive(Clone)]
pub struct Settings {
    pub username: String,
    /// API token; also used as the git password.
    pub password: String,
    pub organization: String,
    pub destdir: PathBuf,
    pub retention: Option<usize>,
    pub retry: RetryPolicy,
    pub api_url: Option<String>,
    pub git_url: String,
    pub log: LogTarget,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("username", &self.username)
            .field("password", &"***")
            .field("organization", &self.organization)
            .field("destdir", &self.destdir)
            .field("retention", &self.retention)
            .field("retry", &self.retry)
            .field("api_url", &self.api_url)
            .field("git_url", &self.git_url)
            .field("log", &self.log)
            .finish()
    }
}

impl Settings {
    /// Load settings from an INI file plus environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::from(path).format(FileFormat::Ini).required(true);
        Self::from_source(file, |name| std::env::var(name).ok())
    }

    fn from_source<S>(source: S, env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let mut builder = ConfigBuilder::builder().add_source(source);
        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(format!("{SECTION}.{key}"), env(var))?;
        }

        let raw: RawConfig = builder.build()?.try_deserialize()?;
        raw.backup.validate()
    }
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn at_least_one(value: Option<usize>, key: &'static str) -> Result<Option<usize>, ConfigError> {
    match value {
        Some(0) => Err(ConfigError::Invalid {
            key,
            message: "must be at least 1".to_string(),
        }),
        other => Ok(other),
    }
}

impl RawSection {
    fn validate(self) -> Result<Settings, ConfigError> {
        let username = required(self.username, "username")?;
        let password = required(self.password, "password")?;
        let organization = required(self.organization, "organization")?;
        let destdir = self
            .destdir
            .filter(|d| !d.as_os_str().is_empty())
            .ok_or(ConfigError::Missing("destdir"))?;
        let retention = at_least_one(self.retention, "retention")?;
        let max_attempts = at_least_one(self.max_attempts, "max_attempts")?;

        let mut retry = match self.retry_delay_secs {
            Some(secs) => RetryPolicy::fixed(Duration::from_secs(secs)),
            None => RetryPolicy::default(),
        };
        if let Some(max_attempts) = max_attempts {
            retry = retry.with_max_attempts(max_attempts);
        }

        Ok(Settings {
            username,
            password,
            organization,
            destdir,
            retention,
            retry,
            api_url: self.api_url.filter(|u| !u.trim().is_empty()),
            git_url: self
                .git_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GIT_URL.to_string()),
            log: self.log.unwrap_or_default(),
        })
    }
}
