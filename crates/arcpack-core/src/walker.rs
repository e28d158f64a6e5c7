//! Enumeration of a staged tree into archive entries.
//!
//! Entries are produced in a stable order (parents before children, siblings
//! sorted by name) with paths relative to the staged root. Both archive
//! builders consume the same list, so they agree on content and order.

use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::ArchiveError;
use crate::Result;

/// Type of a staged entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

/// A staged filesystem entry ready to be written to an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    /// Full filesystem path to the entry.
    pub path: PathBuf,

    /// Path to use in the archive, relative to the staged root.
    pub archive_path: PathBuf,

    /// File or directory.
    pub entry_type: EntryType,

    /// Size in bytes (0 for directories).
    pub size: u64,
}

/// Collects every entry below `root`, hidden ones included.
///
/// The root itself is not part of the result. Symbolic links are followed,
/// matching how the staging area copies its inputs.
///
/// # Examples
///
/// ```no_run
/// use arcpack_core::walker::collect_entries;
/// use std::path::Path;
///
/// let entries = collect_entries(Path::new("/tmp/staging/bundle"))?;
/// for entry in &entries {
///     println!("{}", entry.archive_path.display());
/// }
/// # Ok::<(), arcpack_core::ArchiveError>(())
/// ```
///
/// # Errors
///
/// Returns [`ArchiveError::Staging`] if the tree cannot be read.
pub fn collect_entries(root: &Path) -> Result<Vec<StagedEntry>> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ArchiveError::Staging {
            source: std::io::Error::from(e),
        })?;

        let metadata = entry.metadata().map_err(|e| ArchiveError::Staging {
            source: std::io::Error::other(format!(
                "cannot read metadata for {}: {e}",
                entry.path().display()
            )),
        })?;

        let archive_path = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| ArchiveError::Staging {
                source: std::io::Error::other(e),
            })?
            .to_path_buf();

        let (entry_type, size) = if metadata.is_dir() {
            (EntryType::Directory, 0)
        } else {
            (EntryType::File, metadata.len())
        };

        entries.push(StagedEntry {
            path: entry.path().to_path_buf(),
            archive_path,
            entry_type,
            size,
        });
    }

    Ok(entries)
}

/// Drops earlier entries whose archive path reappears later in the list.
///
/// Each builder applies this to whatever slice it is handed; a walk of one
/// staged tree never yields the same path twice.
///
/// The surviving entry keeps the position of the first occurrence, so
/// directory entries still precede their children.
#[must_use]
pub fn dedup_last_wins(entries: Vec<StagedEntry>) -> Vec<StagedEntry> {
    let mut slots: HashMap<PathBuf, usize> = HashMap::with_capacity(entries.len());
    let mut result: Vec<StagedEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        if let Some(&idx) = slots.get(&entry.archive_path) {
            result[idx] = entry;
        } else {
            slots.insert(entry.archive_path.clone(), result.len());
            result.push(entry);
        }
    }

    result
}

/// Normalizes an archive path to forward-slash form.
///
/// # Errors
///
/// Returns an error if the path is not valid UTF-8.
pub fn archive_name(path: &Path) -> std::io::Result<String> {
    let name = path.to_str().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("path is not valid UTF-8: {}", path.display()),
        )
    })?;

    #[cfg(windows)]
    let name = name.replace('\\', "/");

    #[cfg(not(windows))]
    let name = name.to_string();

    Ok(name)
}
