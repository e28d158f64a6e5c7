//! Gzip-compressed TAR archive writer.

use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::Builder;
use tar::Header;
use tracing::debug;

use super::ArchiveBuilder;
use super::BuildReport;
use crate::ArchiveConfig;
use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::Result;
use crate::walker::EntryType;
use crate::walker::StagedEntry;
use crate::walker::dedup_last_wins;

/// Writes `.tar.gz` archives.
///
/// # Examples
///
/// ```no_run
/// use arcpack_core::ArchiveConfig;
/// use arcpack_core::builder::ArchiveBuilder;
/// use arcpack_core::builder::TarGzBuilder;
/// use arcpack_core::walker::collect_entries;
/// use std::path::Path;
///
/// let config = ArchiveConfig::default();
/// let entries = collect_entries(Path::new("/tmp/staging/site"))?;
/// let report = TarGzBuilder::new(&config).build(&entries, Path::new("/tmp/site.tar.gz"))?;
/// println!("Added {} files", report.files_added);
/// # Ok::<(), arcpack_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TarGzBuilder<'a> {
    config: &'a ArchiveConfig,
}

impl<'a> TarGzBuilder<'a> {
    /// Creates a builder using `config` for compression and permissions.
    #[must_use]
    pub const fn new(config: &'a ArchiveConfig) -> Self {
        Self { config }
    }

    fn write(&self, entries: &[StagedEntry], destination: &Path) -> io::Result<BuildReport> {
        let start = Instant::now();
        let mut report = BuildReport::default();

        let file = File::create(destination)?;
        let encoder = GzEncoder::new(file, compression_level(self.config.compression_level));
        let mut builder = Builder::new(encoder);

        for entry in entries {
            match entry.entry_type {
                EntryType::Directory => {
                    self.append_directory(&mut builder, entry)?;
                    report.directories_added += 1;
                }
                EntryType::File => {
                    report.bytes_written += self.append_file(&mut builder, entry)?;
                    report.files_added += 1;
                }
            }
        }

        // Tar trailer first, then the gzip footer.
        let encoder = builder.into_inner()?;
        let mut file = encoder.finish()?;
        file.flush()?;

        report.bytes_compressed = file.metadata()?.len();
        report.duration = start.elapsed();
        Ok(report)
    }

    fn append_directory<W: Write>(
        &self,
        builder: &mut Builder<W>,
        entry: &StagedEntry,
    ) -> io::Result<()> {
        let mut header = Header::new_gnu();
        header.set_entry_type(tar::EntryType::Directory);
        header.set_size(0);
        header.set_mode(0o755);
        if self.config.preserve_permissions {
            set_permissions(&mut header, &std::fs::metadata(&entry.path)?);
        }

        builder.append_data(&mut header, &entry.archive_path, io::empty())
    }

    fn append_file<W: Write>(
        &self,
        builder: &mut Builder<W>,
        entry: &StagedEntry,
    ) -> io::Result<u64> {
        let mut file = File::open(&entry.path)?;
        let metadata = file.metadata()?;
        let size = metadata.len();

        let mut header = Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(size);
        header.set_mode(0o644);
        if self.config.preserve_permissions {
            set_permissions(&mut header, &metadata);
        }

        builder.append_data(&mut header, &entry.archive_path, &mut file)?;
        debug!(entry = %entry.archive_path.display(), size, "added tar entry");
        Ok(size)
    }
}

impl ArchiveBuilder for TarGzBuilder<'_> {
    fn build(&self, entries: &[StagedEntry], destination: &Path) -> Result<BuildReport> {
        let entries = dedup_last_wins(entries.to_vec());
        self.write(&entries, destination)
            .map_err(|source| ArchiveError::Build {
                format: ArchiveFormat::TarGz,
                source,
            })
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::TarGz
    }
}

/// Copies mode, owner and modification time into a TAR header.
#[cfg(unix)]
fn set_permissions(header: &mut Header, metadata: &std::fs::Metadata) {
    use std::os::unix::fs::MetadataExt;
    header.set_mode(metadata.mode() & 0o7777);
    header.set_uid(u64::from(metadata.uid()));
    header.set_gid(u64::from(metadata.gid()));
    // mtime can be negative for dates before epoch, clamp to 0
    #[allow(clippy::cast_sign_loss)]
    let mtime = metadata.mtime().max(0) as u64;
    header.set_mtime(mtime);
}

#[cfg(not(unix))]
fn set_permissions(header: &mut Header, metadata: &std::fs::Metadata) {
    if metadata.permissions().readonly() {
        header.set_mode(0o444);
    }
    if let Ok(modified) = metadata.modified()
        && let Ok(duration) = modified.duration_since(std::time::UNIX_EPOCH)
    {
        header.set_mtime(duration.as_secs());
    }
}

/// Converts compression level (1-9) to flate2 compression level.
fn compression_level(level: Option<u8>) -> Compression {
    match level {
        None => Compression::default(),
        Some(n) => Compression::new(u32::from(n.clamp(1, 9))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::walker::collect_entries;
    use flate2::read::GzDecoder;
    use std::collections::BTreeMap;
    use std::fs;
    use std::io::Read;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn read_tar_gz(path: &Path) -> BTreeMap<String, Option<Vec<u8>>> {
        let mut archive = tar::Archive::new(GzDecoder::new(File::open(path).unwrap()));
        let mut contents = BTreeMap::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = entry
                .path()
                .unwrap()
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string();
            if entry.header().entry_type().is_dir() {
                contents.insert(name, None);
            } else {
                let mut data = Vec::new();
                entry.read_to_end(&mut data).unwrap();
                contents.insert(name, Some(data));
            }
        }
        contents
    }

    #[test]
    fn test_tar_gz_contains_relative_entries() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("file1.txt"), "content1").unwrap();
        fs::create_dir(src.path().join("subdir")).unwrap();
        fs::write(src.path().join("subdir/file2.txt"), "content2").unwrap();

        let out = TempDir::new().unwrap();
        let dest = out.path().join("out.tar.gz");
        let config = ArchiveConfig::default();
        let entries = collect_entries(src.path()).unwrap();

        let report = TarGzBuilder::new(&config).build(&entries, &dest).unwrap();
        assert_eq!(report.files_added, 2);
        assert_eq!(report.directories_added, 1);
        assert_eq!(report.bytes_written, 16);

        let contents = read_tar_gz(&dest);
        assert_eq!(contents.len(), 3);
        assert_eq!(contents["file1.txt"].as_deref(), Some(&b"content1"[..]));
        assert_eq!(contents["subdir"], None);
        assert_eq!(
            contents["subdir/file2.txt"].as_deref(),
            Some(&b"content2"[..])
        );
    }

    #[test]
    fn test_tar_gz_empty_entries_is_valid_archive() {
        let out = TempDir::new().unwrap();
        let dest = out.path().join("empty.tar.gz");
        let config = ArchiveConfig::default();

        let report = TarGzBuilder::new(&config).build(&[], &dest).unwrap();
        assert_eq!(report.total_entries(), 0);
        assert!(read_tar_gz(&dest).is_empty());
    }

    #[test]
    fn test_tar_gz_duplicate_paths_last_wins() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("old.txt"), "old").unwrap();
        fs::write(src.path().join("new.txt"), "new").unwrap();

        let entries = vec![
            StagedEntry {
                path: src.path().join("old.txt"),
                archive_path: PathBuf::from("same.txt"),
                entry_type: EntryType::File,
                size: 3,
            },
            StagedEntry {
                path: src.path().join("new.txt"),
                archive_path: PathBuf::from("same.txt"),
                entry_type: EntryType::File,
                size: 3,
            },
        ];

        let out = TempDir::new().unwrap();
        let dest = out.path().join("dup.tar.gz");
        let config = ArchiveConfig::default();
        let report = TarGzBuilder::new(&config).build(&entries, &dest).unwrap();

        assert_eq!(report.files_added, 1);
        let contents = read_tar_gz(&dest);
        assert_eq!(contents["same.txt"].as_deref(), Some(&b"new"[..]));
    }

    #[test]
    fn test_tar_gz_missing_source_is_build_error() {
        let out = TempDir::new().unwrap();
        let entries = vec![StagedEntry {
            path: out.path().join("vanished.txt"),
            archive_path: PathBuf::from("vanished.txt"),
            entry_type: EntryType::File,
            size: 0,
        }];

        let config = ArchiveConfig::default();
        let err = TarGzBuilder::new(&config)
            .build(&entries, &out.path().join("x.tar.gz"))
            .unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::Build {
                format: ArchiveFormat::TarGz,
                ..
            }
        ));
    }

    #[test]
    fn test_tar_gz_unwritable_destination() {
        let out = TempDir::new().unwrap();
        let config = ArchiveConfig::default();
        let err = TarGzBuilder::new(&config)
            .build(&[], &out.path().join("missing-dir/x.tar.gz"))
            .unwrap_err();
        assert!(err.is_plugin());
        assert!(err.to_string().contains("NotFound"));
    }

    #[cfg(unix)]
    #[test]
    fn test_tar_gz_preserves_mode() {
        use std::os::unix::fs::PermissionsExt;

        let src = TempDir::new().unwrap();
        let script = src.path().join("run.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let out = TempDir::new().unwrap();
        let dest = out.path().join("modes.tar.gz");
        let config = ArchiveConfig::default();
        let entries = collect_entries(src.path()).unwrap();
        TarGzBuilder::new(&config).build(&entries, &dest).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&dest).unwrap()));
        let entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(entry.header().mode().unwrap() & 0o777, 0o755);
    }

    #[test]
    fn test_compression_level() {
        assert_eq!(compression_level(None), Compression::default());
        assert_eq!(compression_level(Some(1)), Compression::fast());
        assert_eq!(compression_level(Some(9)), Compression::best());
        assert_eq!(compression_level(Some(6)), Compression::new(6));
    }
}
