//! Archive serialization.
//!
//! One [`ArchiveBuilder`] implementation exists per [`ArchiveFormat`]; the
//! pipeline picks one through [`build_archive`] and never looks at format
//! details itself.

pub mod tar;
pub mod zip;

use std::path::Path;
use std::time::Duration;

pub use self::tar::TarGzBuilder;
pub use self::zip::ZipBuilder;

use crate::ArchiveConfig;
use crate::ArchiveFormat;
use crate::Result;
use crate::walker::StagedEntry;

/// Writes a list of staged entries into an archive file.
pub trait ArchiveBuilder {
    /// Serializes `entries` into a new archive at `destination`.
    ///
    /// When several entries share an archive path, the last one wins.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ArchiveError::Build`] on any I/O or encoding
    /// failure. The destination file must then be considered invalid.
    fn build(&self, entries: &[StagedEntry], destination: &Path) -> Result<BuildReport>;

    /// The format this builder writes.
    fn format(&self) -> ArchiveFormat;
}

/// Builds an archive in the requested format.
///
/// # Errors
///
/// Returns [`crate::ArchiveError::Build`] if serialization fails.
pub fn build_archive(
    format: ArchiveFormat,
    entries: &[StagedEntry],
    destination: &Path,
    config: &ArchiveConfig,
) -> Result<BuildReport> {
    match format {
        ArchiveFormat::TarGz => TarGzBuilder::new(config).build(entries, destination),
        ArchiveFormat::Zip => ZipBuilder::new(config).build(entries, destination),
    }
}

/// Statistics about a finished archive.
///
/// # Examples
///
/// ```
/// use arcpack_core::BuildReport;
///
/// let mut report = BuildReport::default();
/// report.bytes_written = 1024;
/// report.bytes_compressed = 256;
///
/// assert_eq!(report.compression_ratio(), 4.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Number of files written.
    pub files_added: usize,

    /// Number of directory entries written.
    pub directories_added: usize,

    /// Total uncompressed file bytes.
    pub bytes_written: u64,

    /// Size of the finished archive file.
    pub bytes_compressed: u64,

    /// Time spent serializing.
    pub duration: Duration,
}

impl BuildReport {
    /// Ratio of uncompressed to archive bytes, `0.0` for an empty archive.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 {
            0.0
        } else {
            self.bytes_written as f64 / self.bytes_compressed as f64
        }
    }

    /// Total entries written.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.directories_added
    }
}
