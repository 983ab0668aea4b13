//! Atomic `.tar.bz2` packaging of a staging directory.

use std::fs;
use std::io::Write;
use std::path::Path;

use bzip2::Compression;
use bzip2::write::BzEncoder;
use tempfile::Builder;

use super::error::ArchiveError;

/// Pack `source` into a bzip2-compressed tarball at `dest`.
///
/// Entries are stored under `root_name/`, so an extracted archive is
/// self-describing. The tarball is written to a hidden temporary file next to
/// `dest`, synced, then renamed into place without clobbering: `dest` only
/// ever appears complete, and an existing archive is never replaced. On any
/// failure the temporary file is removed.
pub fn pack_directory(source: &Path, root_name: &str, dest: &Path) -> Result<(), ArchiveError> {
    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| ArchiveError::io("create directory", parent, e))?;

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let partial = Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".partial")
        .tempfile_in(parent)
        .map_err(|e| ArchiveError::io("create temporary archive in", parent, e))?;

    let encoder = BzEncoder::new(partial, Compression::best());
    let mut tar = tar::Builder::new(encoder);
    tar.follow_symlinks(false);
    tar.append_dir_all(root_name, source)
        .map_err(|e| ArchiveError::io("archive", source, e))?;

    let encoder = tar
        .into_inner()
        .map_err(|e| ArchiveError::io("finish tarball", dest, e))?;
    let mut partial = encoder
        .finish()
        .map_err(|e| ArchiveError::io("compress", dest, e))?;
    partial
        .flush()
        .and_then(|()| partial.as_file().sync_all())
        .map_err(|e| ArchiveError::io("sync", partial.path().to_path_buf(), e))?;

    partial.persist_noclobber(dest).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            ArchiveError::AlreadyExists(dest.to_path_buf())
        } else {
            ArchiveError::io("rename archive to", dest, e.error)
        }
    })?;

    Ok(())
}
