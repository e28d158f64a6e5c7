//! Supported output archive formats.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// Archive container written by the packaging pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// Gzip-compressed tar archive.
    #[default]
    TarGz,
    /// ZIP archive.
    Zip,
}

impl ArchiveFormat {
    /// Every supported format, in request-name order.
    pub const ALL: [Self; 2] = [Self::Zip, Self::TarGz];

    /// Name used for this format in requests (`"targz"` or `"zip"`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TarGz => "targz",
            Self::Zip => "zip",
        }
    }

    /// File extension appended to the archive base name, without the dot.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcpack_core::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::TarGz.extension(), "tar.gz");
    /// assert_eq!(ArchiveFormat::Zip.extension(), "zip");
    /// ```
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }

    /// Returns the archive file name for a base name, e.g. `bundle.tar.gz`.
    #[must_use]
    pub fn file_name(self, base: &str) -> String {
        format!("{base}.{}", self.extension())
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a format name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFormat(pub String);

impl fmt::Display for UnknownFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type '{}' not one of zip or targz", self.0)
    }
}

impl std::error::Error for UnknownFormat {}

impl FromStr for ArchiveFormat {
    type Err = UnknownFormat;

    /// Parses a request-level format name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "targz" => Ok(Self::TarGz),
            "zip" => Ok(Self::Zip),
            _ => Err(UnknownFormat(s.to_ascii_lowercase())),
        }
    }
}
