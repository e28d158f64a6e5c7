//! Ephemeral staging area for archive inputs.
//!
//! Every packaging operation copies its inputs into a private temporary
//! directory before serializing them. The directory is held by a
//! [`tempfile::TempDir`] guard, so it is removed when the [`StagingArea`] is
//! dropped, whichever way the operation ends.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;
use tracing::debug;
use walkdir::WalkDir;

use crate::ArchiveConfig;
use crate::ArchiveError;
use crate::Result;

/// A uniquely named temporary directory holding one named root.
///
/// Inputs staged into the area land under [`StagingArea::root`]:
/// directories merge their contents into the root, files are copied next to
/// them, and a later input replaces an earlier entry of the same name.
///
/// # Examples
///
/// ```no_run
/// use arcpack_core::ArchiveConfig;
/// use arcpack_core::staging::StagingArea;
/// use std::path::Path;
///
/// let staging = StagingArea::create("bundle", &ArchiveConfig::default())?;
/// staging.stage(Path::new("/srv/site"))?;
/// staging.stage(Path::new("/etc/motd"))?;
/// println!("staged under {}", staging.root().display());
/// staging.close()?;
/// # Ok::<(), arcpack_core::ArchiveError>(())
/// ```
#[derive(Debug)]
pub struct StagingArea {
    dir: TempDir,
    canonical_dir: PathBuf,
    root: PathBuf,
}

impl StagingArea {
    /// Creates the temporary directory and the `root_name` subdirectory.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Staging`] if either directory cannot be
    /// created.
    pub fn create(root_name: &str, config: &ArchiveConfig) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&config.staging_prefix);

        let dir = match &config.staging_parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(staging_error)?;

        // Guard is live from here on: any early return removes `dir`.
        let canonical_dir = fs::canonicalize(dir.path()).map_err(staging_error)?;
        let root = dir.path().join(root_name);
        fs::create_dir(&root).map_err(staging_error)?;

        debug!(staging = %dir.path().display(), "created staging area");

        Ok(Self {
            dir,
            canonical_dir,
            root,
        })
    }

    /// Path of the temporary directory itself.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the named root that the archive is built from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Recursively copies `source` into the staged root.
    ///
    /// A directory contributes its contents; a file is copied under its own
    /// name. Symbolic links are followed. Existing entries with the same
    /// relative path are replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Staging`] on any I/O failure, or with
    /// [`io::ErrorKind::InvalidInput`] when `source` or anything below it is
    /// neither a regular file nor a directory (FIFOs, sockets, devices).
    pub fn stage(&self, source: &Path) -> Result<()> {
        debug!(source = %source.display(), "staging input");

        let metadata = fs::metadata(source).map_err(staging_error)?;
        if metadata.is_dir() {
            self.stage_directory(source)
        } else if !metadata.is_file() {
            Err(staging_error(unsupported_entry(source)))
        } else {
            let name = source.file_name().ok_or_else(|| {
                staging_error(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("cannot determine file name of '{}'", source.display()),
                ))
            })?;
            replace_with_file(source, &self.root.join(name)).map_err(staging_error)
        }
    }

    fn stage_directory(&self, source: &Path) -> Result<()> {
        let source = fs::canonicalize(source).map_err(staging_error)?;

        let walker = WalkDir::new(&source)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            // Never copy the staging area into itself.
            .filter_entry(|e| !e.path().starts_with(&self.canonical_dir));

        for entry in walker {
            let entry = entry.map_err(|e| staging_error(io::Error::from(e)))?;
            let relative = entry
                .path()
                .strip_prefix(&source)
                .map_err(|e| staging_error(io::Error::other(e)))?;
            let target = self.root.join(relative);

            let file_type = entry.file_type();
            if file_type.is_dir() {
                replace_with_directory(&target).map_err(staging_error)?;
            } else if file_type.is_file() {
                replace_with_file(entry.path(), &target).map_err(staging_error)?;
            } else {
                // Opening a FIFO for reading blocks until a writer shows up.
                return Err(staging_error(unsupported_entry(entry.path())));
            }
        }

        Ok(())
    }

    /// Removes the staging area, reporting any failure.
    ///
    /// Dropping the area also removes it, but silently.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Staging`] if the directory tree cannot be
    /// removed.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(staging_error)?;
        debug!(staging = %path.display(), "removed staging area");
        Ok(())
    }
}

/// Makes `target` a directory, replacing a staged file of the same name.
fn replace_with_directory(target: &Path) -> io::Result<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => fs::remove_file(target)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::create_dir_all(target)
}

/// Copies `source` to `target`, replacing whatever was staged there.
fn replace_with_file(source: &Path, target: &Path) -> io::Result<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(target)?,
        Ok(_) => fs::remove_file(target)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(source, target)?;
    Ok(())
}

fn unsupported_entry(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("'{}' is not a regular file or directory", path.display()),
    )
}

fn staging_error(source: io::Error) -> ArchiveError {
    ArchiveError::Staging { source }
}
