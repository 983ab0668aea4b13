//! GitHub API client creation and paginated listing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde_json::Value;

use super::error::GitHubError;
use crate::platform::{self, PlatformError, PlatformSource, Record, Visibility};

/// Page size for list endpoints (the API maximum).
pub const PER_PAGE: usize = 100;

/// Create an authenticated Octocrab instance.
///
/// `api_url` selects a GitHub Enterprise API root; `None` uses api.github.com.
pub fn create_client(token: &str, api_url: Option<&str>) -> Result<Octocrab, GitHubError> {
    let mut builder = Octocrab::builder().personal_token(token.to_string());
    if let Some(api_url) = api_url {
        builder = builder
            .base_uri(api_url)
            .map_err(|_| GitHubError::InvalidUrl(api_url.to_string()))?;
    }
    builder.build().map_err(GitHubError::Api)
}

/// Check rate limit and return error if exceeded.
pub async fn check_rate_limit(client: &Octocrab) -> Result<(), GitHubError> {
    let rate_limit = client.ratelimit().get().await?;
    let core = &rate_limit.resources.core;

    if core.remaining == 0 {
        let reset_at = DateTime::from_timestamp(core.reset as i64, 0).unwrap_or_else(Utc::now);
        return Err(GitHubError::RateLimited { reset_at });
    }

    Ok(())
}

/// Append pagination parameters to a route that may already have a query.
pub fn page_route(route: &str, page: u32) -> String {
    let separator = if route.contains('?') { '&' } else { '?' };
    format!("{route}{separator}per_page={PER_PAGE}&page={page}")
}

/// GitHub API client implementing the [`PlatformSource`] trait.
///
/// Records are fetched as raw JSON objects so that archives contain every
/// field the API returns, not just the ones modelled by `octocrab`.
#[derive(Clone)]
pub struct GitHubClient {
    inner: Arc<Octocrab>,
}

impl GitHubClient {
    /// Create a new GitHub client from an authentication token.
    pub fn new(token: &str, api_url: Option<&str>) -> Result<Self, GitHubError> {
        Ok(Self::from_octocrab(create_client(token, api_url)?))
    }

    /// Create a GitHub client from an existing Octocrab instance.
    pub fn from_octocrab(client: Octocrab) -> Self {
        Self {
            inner: Arc::new(client),
        }
    }

    /// Get a reference to the inner Octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.inner
    }

    /// Fetch a single object.
    async fn get_record(&self, route: &str) -> Result<Record, GitHubError> {
        let record: Record = self.inner.get(route, None::<&()>).await?;
        Ok(record)
    }

    /// Fetch every page of a list endpoint.
    ///
    /// Handles rate limiting by checking remaining quota before the first
    /// request. A short page marks the end of the listing.
    async fn list_all(&self, route: &str) -> Result<Vec<Record>, GitHubError> {
        // Some GitHub Enterprise instances disable rate limiting entirely and
        // answer 404 here; only an exhausted quota stops the listing.
        if let Err(e @ GitHubError::RateLimited { .. }) = check_rate_limit(&self.inner).await {
            return Err(e);
        }

        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let items: Vec<Value> = self.inner.get(page_route(route, page), None::<&()>).await?;
            let count = items.len();

            all.extend(items.into_iter().filter_map(|item| match item {
                Value::Object(record) => Some(record),
                _ => None,
            }));

            tracing::debug!(route, page, count, total_so_far = all.len(), "Fetched page");

            if count < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(all)
    }
}

#[async_trait]
impl PlatformSource for GitHubClient {
    async fn list_members(&self, org: &str) -> platform::Result<Vec<Record>> {
        self.list_all(&format!("/orgs/{org}/members"))
            .await
            .map_err(PlatformError::from)
    }

    async fn get_user(&self, login: &str) -> platform::Result<Record> {
        self.get_record(&format!("/users/{login}"))
            .await
            .map_err(PlatformError::from)
    }

    async fn list_teams(&self, org: &str) -> platform::Result<Vec<Record>> {
        self.list_all(&format!("/orgs/{org}/teams"))
            .await
            .map_err(PlatformError::from)
    }

    async fn list_team_members(&self, org: &str, team_slug: &str) -> platform::Result<Vec<Record>> {
        self.list_all(&format!("/orgs/{org}/teams/{team_slug}/members"))
            .await
            .map_err(PlatformError::from)
    }

    async fn list_repos(&self, org: &str, visibility: Visibility) -> platform::Result<Vec<Record>> {
        self.list_all(&format!("/orgs/{org}/repos?type={visibility}"))
            .await
            .map_err(PlatformError::from)
    }

    async fn list_repo_teams(&self, org: &str, repo: &str) -> platform::Result<Vec<Record>> {
        self.list_all(&format!("/repos/{org}/{repo}/teams"))
            .await
            .map_err(PlatformError::from)
    }

    async fn list_issues(&self, org: &str, repo: &str) -> platform::Result<Vec<Record>> {
        self.list_all(&format!("/repos/{org}/{repo}/issues?state=all"))
            .await
            .map_err(PlatformError::from)
    }

    async fn list_issue_comments(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> platform::Result<Vec<Record>> {
        self.list_all(&format!("/repos/{org}/{repo}/issues/{number}/comments"))
            .await
            .map_err(PlatformError::from)
    }

    async fn list_pulls(&self, org: &str, repo: &str) -> platform::Result<Vec<Record>> {
        self.list_all(&format!("/repos/{org}/{repo}/pulls?state=all"))
            .await
            .map_err(PlatformError::from)
    }

    async fn list_pull_comments(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> platform::Result<Vec<Record>> {
        self.list_all(&format!("/repos/{org}/{repo}/pulls/{number}/comments"))
            .await
            .map_err(PlatformError::from)
    }
}
