//! MD5 sidecar publication.
//!
//! The digest is computed by streaming the archive through a fixed-size
//! buffer, so memory use does not grow with archive size.

use std::ffi::OsString;
use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::Result;

/// Buffer size for digest reads (64KB).
const DIGEST_BUFFER_SIZE: usize = 64 * 1024;

/// Extension appended to the archive path to name its sidecar.
pub const SIDECAR_EXTENSION: &str = "md5";

/// A published checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    /// 32 lowercase hex characters.
    pub digest: String,
    /// Path of the sidecar file holding `digest`.
    pub sidecar: PathBuf,
}

/// Computes the MD5 of a file as 32 lowercase hex characters.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened or read.
pub fn md5_hex(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut context = md5::Context::new();
    let mut buffer = vec![0u8; DIGEST_BUFFER_SIZE];

    loop {
        let bytes_read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        context.consume(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", context.compute()))
}

/// Returns the sidecar path for an archive: `<archive>.md5`.
///
/// # Examples
///
/// ```
/// use arcpack_core::checksum::sidecar_path;
/// use std::path::Path;
///
/// assert_eq!(
///     sidecar_path(Path::new("/out/bundle.tar.gz")),
///     Path::new("/out/bundle.tar.gz.md5")
/// );
/// ```
#[must_use]
pub fn sidecar_path(archive: &Path) -> PathBuf {
    let mut name = OsString::from(archive.as_os_str());
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

/// Computes the archive digest and writes it to `<archive>.md5`.
///
/// The sidecar holds only the hex digest, without a trailing newline.
///
/// # Errors
///
/// Returns [`ArchiveError::Checksum`] if reading the archive or writing the
/// sidecar fails.
pub fn write_checksum(archive: &Path) -> Result<Checksum> {
    let digest = md5_hex(archive).map_err(|source| ArchiveError::Checksum { source })?;
    let sidecar = sidecar_path(archive);
    fs::write(&sidecar, &digest).map_err(|source| ArchiveError::Checksum { source })?;

    Ok(Checksum { digest, sidecar })
}
