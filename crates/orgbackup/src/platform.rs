//! Platform-agnostic access to a code hosting organization.
//!
//! The backup core only needs a read-only view of the organization: its
//! members, teams, repositories, and per-repository issues, pull requests,
//! and comments. [`PlatformSource`] describes that view; records are passed
//! through verbatim as [`Record`]s so that archives contain exactly what the
//! platform returned.
//!
//! # Example
//!
//! ```ignore
//! use orgbackup::platform::{PlatformSource, Visibility};
//!
//! async fn count<S: PlatformSource>(source: &S) -> Result<usize, PlatformError> {
//!     Ok(source.list_repos("my-org", Visibility::Public).await?.len())
//! }
//! ```

mod errors;
mod types;

pub use errors::{PlatformError, Result, short_error_message};
pub use types::{PlatformSource, Record, RepoRecord, Visibility};
