//! Archive naming, packaging, and retention.
//!
//! Every durable artifact lives at
//! `destdir/<category-dir>/<stable-key>-<YYYY-MM-DD>.tar.bz2`:
//!
//! - [`namer`] derives that path deterministically and tests for existence
//! - [`pack`] writes an archive atomically from a staging directory
//! - [`retention`] keeps the most recent archives of a stable key

mod error;
pub mod namer;
pub mod pack;
pub mod retention;

pub use error::ArchiveError;
pub use namer::{ARCHIVE_EXTENSION, ArchiveNamer, ArchivePath, Category, StableKey};
pub use pack::pack_directory;
pub use retention::{list_archives, prune};
