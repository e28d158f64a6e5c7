//! Configuration for archive packaging operations.

use crate::ArchiveError;
use crate::Result;
use std::path::PathBuf;

/// Default prefix for staging directory names.
pub const DEFAULT_STAGING_PREFIX: &str = "arcpack-";

/// Configuration for archive packaging operations.
///
/// Controls compression, permission handling and where the ephemeral staging
/// area is allocated. Request fields (inputs, destination, name, format) are
/// not part of the configuration; see [`crate::RawRequest`].
///
/// # Examples
///
/// ```
/// use arcpack_core::ArchiveConfig;
///
/// let config = ArchiveConfig::default()
///     .with_compression_level(9)
///     .with_preserve_permissions(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Compression level (1-9).
    ///
    /// `None` uses the format default.
    ///
    /// Default: `Some(6)`.
    pub compression_level: Option<u8>,

    /// Copy unix mode and modification time into archive entry headers.
    ///
    /// Default: `true`.
    pub preserve_permissions: bool,

    /// Directory in which staging areas are created.
    ///
    /// `None` uses the system temporary directory.
    ///
    /// Default: `None`.
    pub staging_parent: Option<PathBuf>,

    /// Prefix of staging directory names.
    ///
    /// Default: `"arcpack-"`.
    pub staging_prefix: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            compression_level: Some(6),
            preserve_permissions: true,
            staging_parent: None,
            staging_prefix: DEFAULT_STAGING_PREFIX.to_string(),
        }
    }
}

impl ArchiveConfig {
    /// Creates a new `ArchiveConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Sets whether unix permissions are stored in entry headers.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Sets the directory staging areas are created in.
    #[must_use]
    pub fn with_staging_parent(mut self, parent: impl Into<PathBuf>) -> Self {
        self.staging_parent = Some(parent.into());
        self
    }

    /// Sets the staging directory name prefix.
    #[must_use]
    pub fn with_staging_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.staging_prefix = prefix.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is outside 1-9 or the
    /// staging parent is set but is not an existing directory.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(ArchiveError::InvalidConfig {
                reason: format!("compression level must be 1-9, got {level}"),
            });
        }

        if let Some(parent) = &self.staging_parent
            && !parent.is_dir()
        {
            return Err(ArchiveError::InvalidConfig {
                reason: format!("staging directory '{}' does not exist", parent.display()),
            });
        }

        Ok(())
    }
}
