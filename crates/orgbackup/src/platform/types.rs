use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::errors::{PlatformError, Result};

/// An opaque platform record (user, team, repository, issue, comment...).
///
/// Records are archived verbatim; the backup core only inspects the few
/// fields it needs (`login`, `name`, `slug`, `id`, `number`, `has_wiki`,
/// `has_issues`).
pub type Record = Map<String, Value>;

/// Repository visibility classes backed up separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Both visibility classes, in backup order.
    pub const ALL: [Visibility; 2] = [Visibility::Public, Visibility::Private];

    /// The value used by the platform's repository listing filter.
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A repository record together with the fields the backup core acts on.
#[derive(Debug, Clone)]
pub struct RepoRecord {
    /// Repository name.
    pub name: String,
    /// Platform-specific numeric ID (stable across renames).
    pub id: u64,
    /// Whether the repository has a wiki enabled.
    pub has_wiki: bool,
    /// Whether the repository has issue tracking enabled.
    pub has_issues: bool,
    /// The full record as returned by the platform.
    pub record: Record,
}

impl RepoRecord {
    /// Extract the fields the backup core needs from a raw repository record.
    ///
    /// Missing capability flags are treated as disabled; a missing name or id
    /// is an error because the archive cannot be named without them.
    pub fn from_record(record: Record) -> Result<Self> {
        let name = record
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| PlatformError::invalid_record("repository", "name"))?
            .to_string();
        let id = record
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| PlatformError::invalid_record("repository", "id"))?;
        let flag = |key: &str| record.get(key).and_then(Value::as_bool).unwrap_or(false);
        let has_wiki = flag("has_wiki");
        let has_issues = flag("has_issues");

        Ok(Self {
            name,
            id,
            has_wiki,
            has_issues,
            record,
        })
    }
}

/// Read-only access to an organization on a code hosting platform.
///
/// Implementors should:
/// - Handle pagination internally and return complete lists
/// - Return records in the platform's iteration order
/// - Convert platform-specific errors to [`PlatformError`]
#[async_trait]
pub trait PlatformSource: Send + Sync {
    /// List the organization's members.
    async fn list_members(&self, org: &str) -> Result<Vec<Record>>;

    /// Fetch a user's full profile.
    async fn get_user(&self, login: &str) -> Result<Record>;

    /// List the organization's teams.
    async fn list_teams(&self, org: &str) -> Result<Vec<Record>>;

    /// List the members of a team, identified by its slug.
    async fn list_team_members(&self, org: &str, team_slug: &str) -> Result<Vec<Record>>;

    /// List the organization's repositories of one visibility class.
    async fn list_repos(&self, org: &str, visibility: Visibility) -> Result<Vec<Record>>;

    /// List the teams with access to a repository.
    async fn list_repo_teams(&self, org: &str, repo: &str) -> Result<Vec<Record>>;

    /// List all issues (open and closed) of a repository.
    async fn list_issues(&self, org: &str, repo: &str) -> Result<Vec<Record>>;

    /// List the comments on one issue.
    async fn list_issue_comments(&self, org: &str, repo: &str, number: u64) -> Result<Vec<Record>>;

    /// List all pull requests (open and closed) of a repository.
    async fn list_pulls(&self, org: &str, repo: &str) -> Result<Vec<Record>>;

    /// List the review comments on one pull request.
    async fn list_pull_comments(&self, org: &str, repo: &str, number: u64) -> Result<Vec<Record>>;
}
