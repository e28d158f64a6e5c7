//! Error types for archive packaging operations.

use std::fmt;

use thiserror::Error;

use crate::format::ArchiveFormat;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Ordered list of request violations, one message per violated constraint.
///
/// Validation never stops at the first failure, so this always holds every
/// problem found in a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    /// Creates an empty error list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a violation message.
    pub fn push(&mut self, msg: impl Into<String>) {
        self.0.push(msg.into());
    }

    /// Returns `true` if no violation was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the messages in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns the messages as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl From<Vec<String>> for ValidationErrors {
    fn from(errors: Vec<String>) -> Self {
        Self(errors)
    }
}

/// Pipeline stage in which a plugin error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Copying inputs into the staging area.
    Staging,
    /// Serializing the staged tree into the archive.
    Building,
    /// Computing and publishing the checksum sidecar.
    Checksumming,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Staging => "staging",
            Self::Building => "building",
            Self::Checksumming => "checksumming",
        };
        f.write_str(name)
    }
}

/// Coarse error classification reported to the invoking harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid request, detected before any work started.
    Configuration,
    /// Execution-time failure while staging, building or checksumming.
    Plugin,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "configuration",
            Self::Plugin => "plugin",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while packaging an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The request violated one or more input constraints.
    #[error("Configuration errors: {0}")]
    Configuration(ValidationErrors),

    /// Engine configuration is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration was rejected.
        reason: String,
    },

    /// Copying inputs into the staging area failed.
    #[error("failed to stage inputs: {source} ({kind:?})", kind = .source.kind())]
    Staging {
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Writing the archive failed.
    #[error("failed to archive in {format} format: {source} ({kind:?})", kind = .source.kind())]
    Build {
        /// Format that was being written.
        format: ArchiveFormat,
        /// Underlying I/O or archive-library failure.
        #[source]
        source: std::io::Error,
    },

    /// Computing or writing the checksum sidecar failed.
    #[error("failed to create md5: {source} ({kind:?})", kind = .source.kind())]
    Checksum {
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    /// Returns the harness-level classification of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcpack_core::ArchiveError;
    /// use arcpack_core::ErrorKind;
    ///
    /// let err = ArchiveError::Checksum {
    ///     source: std::io::Error::other("disk full"),
    /// };
    /// assert_eq!(err.kind(), ErrorKind::Plugin);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::InvalidConfig { .. } => ErrorKind::Configuration,
            Self::Staging { .. } | Self::Build { .. } | Self::Checksum { .. } => ErrorKind::Plugin,
        }
    }

    /// Returns `true` for pre-execution configuration errors.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration)
    }

    /// Returns `true` for execution-time plugin errors.
    #[must_use]
    pub const fn is_plugin(&self) -> bool {
        matches!(self.kind(), ErrorKind::Plugin)
    }

    /// Returns the pipeline stage a plugin error came from.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Staging { .. } => Some(Stage::Staging),
            Self::Build { .. } => Some(Stage::Building),
            Self::Checksum { .. } => Some(Stage::Checksumming),
            Self::Configuration(_) | Self::InvalidConfig { .. } => None,
        }
    }

    /// Returns the collected request violations, if this is a
    /// configuration error.
    #[must_use]
    pub const fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Configuration(errors) => Some(errors),
            _ => None,
        }
    }
}
