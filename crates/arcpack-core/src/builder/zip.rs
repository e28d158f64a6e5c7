//! ZIP archive writer.

use std::fs::File;
use std::io;
use std::io::Seek;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::ArchiveBuilder;
use super::BuildReport;
use crate::ArchiveConfig;
use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::Result;
use crate::walker::EntryType;
use crate::walker::StagedEntry;
use crate::walker::archive_name;
use crate::walker::dedup_last_wins;

/// Writes `.zip` archives.
///
/// ZIP has no in-place replacement, so entries sharing a name are resolved
/// before writing: the last one is kept.
#[derive(Debug, Clone, Copy)]
pub struct ZipBuilder<'a> {
    config: &'a ArchiveConfig,
}

impl<'a> ZipBuilder<'a> {
    /// Creates a builder using `config` for compression and permissions.
    #[must_use]
    pub const fn new(config: &'a ArchiveConfig) -> Self {
        Self { config }
    }

    fn options(&self) -> SimpleFileOptions {
        let level = self.config.compression_level.unwrap_or(6);
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(level)))
    }

    fn write(&self, entries: &[StagedEntry], destination: &Path) -> io::Result<BuildReport> {
        let start = Instant::now();
        let mut report = BuildReport::default();

        let file = File::create(destination)?;
        let mut zip = ZipWriter::new(file);
        let options = self.options();

        for entry in entries {
            let name = archive_name(&entry.archive_path)?;

            match entry.entry_type {
                EntryType::Directory => {
                    // ZIP requires explicit directory entries with trailing /
                    zip.add_directory(format!("{name}/"), options)
                        .map_err(|e| io::Error::other(format!("failed to add directory: {e}")))?;
                    report.directories_added += 1;
                }
                EntryType::File => {
                    report.bytes_written += self.append_file(&mut zip, entry, &name, options)?;
                    report.files_added += 1;
                }
            }
        }

        let mut file = zip
            .finish()
            .map_err(|e| io::Error::other(format!("failed to finish ZIP archive: {e}")))?;
        file.flush()?;

        report.bytes_compressed = file.metadata()?.len();
        report.duration = start.elapsed();
        Ok(report)
    }

    fn append_file<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        entry: &StagedEntry,
        name: &str,
        options: SimpleFileOptions,
    ) -> io::Result<u64> {
        let mut file = File::open(&entry.path)?;
        let options = options.large_file(needs_zip64(entry.size));

        let options = if self.config.preserve_permissions {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                options.unix_permissions(file.metadata()?.permissions().mode())
            }
            #[cfg(not(unix))]
            {
                options
            }
        } else {
            options.unix_permissions(0o644)
        };

        zip.start_file(name, options)
            .map_err(|e| io::Error::other(format!("failed to start file in ZIP: {e}")))?;
        let size = io::copy(&mut file, zip)?;

        debug!(entry = name, size, "added zip entry");
        Ok(size)
    }
}

/// Entries at or past the 32-bit size limit need ZIP64 extra fields.
fn needs_zip64(size: u64) -> bool {
    size >= u64::from(u32::MAX)
}

impl ArchiveBuilder for ZipBuilder<'_> {
    fn build(&self, entries: &[StagedEntry], destination: &Path) -> Result<BuildReport> {
        let entries = dedup_last_wins(entries.to_vec());
        self.write(&entries, destination)
            .map_err(|source| ArchiveError::Build {
                format: ArchiveFormat::Zip,
                source,
            })
    }

    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::walker::collect_entries;
    use std::fs;
    use std::io::Read;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn read_zip(path: &Path) -> Vec<(String, Vec<u8>)> {
        let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut contents = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            contents.push((entry.name().to_string(), data));
        }
        contents
    }

    #[test]
    fn test_zip_contains_relative_entries() {
        let src = TempDir::new().unwrap();
        fs::create_dir(src.path().join("dir1")).unwrap();
        fs::create_dir(src.path().join("dir1/dir2")).unwrap();
        fs::write(src.path().join("dir1/dir2/file.txt"), "content").unwrap();
        fs::write(src.path().join("top.txt"), "top").unwrap();

        let out = TempDir::new().unwrap();
        let dest = out.path().join("out.zip");
        let config = ArchiveConfig::default();
        let entries = collect_entries(src.path()).unwrap();

        let report = ZipBuilder::new(&config).build(&entries, &dest).unwrap();
        assert_eq!(report.files_added, 2);
        assert_eq!(report.directories_added, 2);

        let contents = read_zip(&dest);
        let names: Vec<_> = contents.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["dir1/", "dir1/dir2/", "dir1/dir2/file.txt", "top.txt"]
        );
        assert_eq!(contents[2].1, b"content");
        assert_eq!(contents[3].1, b"top");
    }

    #[test]
    fn test_zip_duplicate_paths_are_replaced() {
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
        let dest = out.path().join("dup.zip");
        let config = ArchiveConfig::default();
        let report = ZipBuilder::new(&config).build(&entries, &dest).unwrap();

        assert_eq!(report.files_added, 1);
        assert_eq!(read_zip(&dest), vec![("same.txt".to_string(), b"new".to_vec())]);
    }

    #[test]
    fn test_zip_compression_levels() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("test.txt"), "a".repeat(10_000)).unwrap();
        let entries = collect_entries(src.path()).unwrap();
        let out = TempDir::new().unwrap();

        for level in [1, 6, 9] {
            let dest = out.path().join(format!("output_{level}.zip"));
            let config = ArchiveConfig::default().with_compression_level(level);
            let report = ZipBuilder::new(&config).build(&entries, &dest).unwrap();
            assert_eq!(report.files_added, 1);
            assert!(report.bytes_compressed < 10_000);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_zip_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let src = TempDir::new().unwrap();
        let file_path = src.path().join("test.txt");
        fs::write(&file_path, "content").unwrap();
        fs::set_permissions(&file_path, fs::Permissions::from_mode(0o755)).unwrap();

        let out = TempDir::new().unwrap();
        let dest = out.path().join("perm.zip");
        let config = ArchiveConfig::default();
        let entries = collect_entries(src.path()).unwrap();
        ZipBuilder::new(&config).build(&entries, &dest).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let entry = archive.by_name("test.txt").unwrap();
        assert_eq!(entry.unix_mode().unwrap() & 0o777, 0o755);
    }

    #[test]
    fn test_zip64_threshold() {
        assert!(!needs_zip64(0));
        assert!(!needs_zip64(u64::from(u32::MAX) - 1));
        assert!(needs_zip64(u64::from(u32::MAX)));
        assert!(needs_zip64(5 * 1024 * 1024 * 1024));
    }

    #[test]
    #[ignore = "compresses a 4 GiB sparse file"]
    fn test_zip_stores_file_over_4gib() {
        let src = TempDir::new().unwrap();
        let big = src.path().join("big.img");
        let size = u64::from(u32::MAX) + 1024;
        File::create(&big).unwrap().set_len(size).unwrap();

        let out = TempDir::new().unwrap();
        let dest = out.path().join("big.zip");
        let config = ArchiveConfig::default().with_compression_level(1);
        let entries = collect_entries(src.path()).unwrap();
        let report = ZipBuilder::new(&config).build(&entries, &dest).unwrap();
        assert_eq!(report.bytes_written, size);

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        assert_eq!(archive.by_name("big.img").unwrap().size(), size);
    }

    #[test]
    fn test_zip_unwritable_destination() {
        let out = TempDir::new().unwrap();
        let config = ArchiveConfig::default();
        let err = ZipBuilder::new(&config)
            .build(&[], &out.path().join("missing-dir/x.zip"))
            .unwrap_err();
        assert!(matches!(
            err,
            ArchiveError::Build {
                format: ArchiveFormat::Zip,
                ..
            }
        ));
    }
}
