//! Deterministic archive paths.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::platform::Visibility;

/// File extension of every archive.
pub const ARCHIVE_EXTENSION: &str = ".tar.bz2";

/// Date format embedded in archive names.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Archive categories, each stored in its own directory under `destdir`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Members,
    Teams,
    PublicRepos,
    PrivateRepos,
}

impl Category {
    /// Directory name under `destdir`.
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Members => "members",
            Category::Teams => "teams",
            Category::PublicRepos => "public-repos",
            Category::PrivateRepos => "private-repos",
        }
    }

    /// The repository category for a visibility class.
    pub fn for_visibility(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Public => Category::PublicRepos,
            Visibility::Private => Category::PrivateRepos,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Identity string used for archive naming and retention grouping.
///
/// `members` and `teams` for the roster units, `<name>-<id>` for a
/// repository so that a renamed repository keeps a distinct history.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StableKey(String);

impl StableKey {
    pub fn members() -> Self {
        Self("members".to_string())
    }

    pub fn teams() -> Self {
        Self("teams".to_string())
    }

    pub fn repository(name: &str, id: u64) -> Self {
        Self(format!("{name}-{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location of one archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchivePath {
    category_dir: PathBuf,
    path: PathBuf,
}

impl ArchivePath {
    /// Full path of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding every archive of this category.
    pub fn category_dir(&self) -> &Path {
        &self.category_dir
    }

    /// Whether the archive is already on disk.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Derives archive paths under a destination directory.
#[derive(Clone, Debug)]
pub struct ArchiveNamer {
    destdir: PathBuf,
}

impl ArchiveNamer {
    pub fn new(destdir: impl Into<PathBuf>) -> Self {
        Self {
            destdir: destdir.into(),
        }
    }

    pub fn destdir(&self) -> &Path {
        &self.destdir
    }

    /// Directory of a category under `destdir`.
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.destdir.join(category.dir_name())
    }

    /// Archive path for a unit on a given day.
    pub fn path(&self, category: Category, key: &StableKey, date: NaiveDate) -> ArchivePath {
        let category_dir = self.category_dir(category);
        let file_name = archive_file_name(key, date);
        ArchivePath {
            path: category_dir.join(file_name),
            category_dir,
        }
    }

    /// Whether the archive for a unit on a given day already exists.
    pub fn exists(&self, category: Category, key: &StableKey, date: NaiveDate) -> bool {
        self.path(category, key, date).exists()
    }
}

/// `<stable-key>-<YYYY-MM-DD>.tar.bz2`
pub(crate) fn archive_file_name(key: &StableKey, date: NaiveDate) -> String {
    format!("{}-{}{}", key, date.format(DATE_FORMAT), ARCHIVE_EXTENSION)
}
