//! GitHub implementation of [`PlatformSource`](crate::platform::PlatformSource).
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`client`] - Client creation, pagination, and the `PlatformSource` impl
//!
//! # Example
//!
//! ```ignore
//! use orgbackup::github::GitHubClient;
//! use orgbackup::platform::{PlatformSource, Visibility};
//!
//! let client = GitHubClient::new(&token, None)?;
//! let repos = client.list_repos("my-org", Visibility::Private).await?;
//! ```

mod client;
mod error;

pub use client::{GitHubClient, PER_PAGE, check_rate_limit, create_client, page_route};
pub use error::GitHubError;
