//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::platform::PlatformError;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// HTTP status of an API error, if the API answered at all.
fn status_of(e: &octocrab::Error) -> Option<u16> {
    match e {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

impl From<GitHubError> for PlatformError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::RateLimited { reset_at } => {
                PlatformError::rate_limited(format!("resets at {reset_at}"))
            }
            GitHubError::Api(e) => match status_of(&e) {
                Some(401) => PlatformError::AuthRequired,
                Some(403 | 429) => PlatformError::rate_limited(e.to_string()),
                Some(404) => PlatformError::not_found(e.to_string()),
                _ => PlatformError::api(e.to_string()),
            },
            GitHubError::InvalidUrl(url) => PlatformError::api(format!("invalid API URL: {url}")),
        }
    }
}
