//! Request parsing and validation.
//!
//! The invoking harness hands over loosely typed fields: `path` may be a
//! single path, a string holding a JSON array of paths, or a real list. This
//! module resolves that ambiguity once and checks every input constraint,
//! collecting all violations instead of stopping at the first one.

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::Result;
use crate::error::ValidationErrors;

/// The `path` request field as delivered by the harness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathInput {
    /// A single path, or a string encoding a JSON array of paths.
    Text(String),
    /// An already structured list of paths.
    List(Vec<String>),
}

/// A `path` field after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPaths {
    /// One literal path.
    Single(String),
    /// A list of paths, possibly empty.
    Multiple(Vec<String>),
}

impl PathInput {
    /// Resolves the field into literal paths.
    ///
    /// Text that parses as a JSON array of strings becomes a list; anything
    /// else is taken as one literal path. This never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcpack_core::request::PathInput;
    /// use arcpack_core::request::ResolvedPaths;
    ///
    /// let input = PathInput::Text(r#"["/srv/a", "/srv/b"]"#.to_string());
    /// assert_eq!(
    ///     input.resolve(),
    ///     ResolvedPaths::Multiple(vec!["/srv/a".into(), "/srv/b".into()])
    /// );
    ///
    /// let input = PathInput::Text("/srv/[draft]".to_string());
    /// assert_eq!(input.resolve(), ResolvedPaths::Single("/srv/[draft]".into()));
    /// ```
    #[must_use]
    pub fn resolve(&self) -> ResolvedPaths {
        match self {
            Self::Text(text) => serde_json::from_str::<Vec<String>>(text)
                .map_or_else(|_| ResolvedPaths::Single(text.clone()), ResolvedPaths::Multiple),
            Self::List(paths) => ResolvedPaths::Multiple(paths.clone()),
        }
    }
}

impl ResolvedPaths {
    /// Returns `true` when there is nothing to archive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(path) => path.is_empty(),
            Self::Multiple(paths) => paths.is_empty(),
        }
    }

    /// Returns the resolved paths in order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Single(path) => std::slice::from_ref(path),
            Self::Multiple(paths) => paths,
        }
    }
}

impl From<String> for PathInput {
    fn from(path: String) -> Self {
        Self::Text(path)
    }
}

impl From<&str> for PathInput {
    fn from(path: &str) -> Self {
        Self::Text(path.to_string())
    }
}

impl From<Vec<String>> for PathInput {
    fn from(paths: Vec<String>) -> Self {
        Self::List(paths)
    }
}

/// Untyped request fields as supplied by the harness.
///
/// Every field is optional. Missing text fields behave like empty strings and
/// a missing `type` means `targz`.
///
/// # Examples
///
/// ```
/// use arcpack_core::RawRequest;
///
/// let raw: RawRequest = serde_json::from_str(
///     r#"{"path": "/var/log/app", "destination": "/tmp", "filename": "logs", "type": "ZIP"}"#,
/// )?;
/// assert_eq!(raw.filename.as_deref(), Some("logs"));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRequest {
    /// Input files or directories.
    pub path: Option<PathInput>,
    /// Directory the archive is written to.
    pub destination: Option<String>,
    /// Archive base name, also the name of the staged root.
    pub filename: Option<String>,
    /// Format name, `zip` or `targz` in any case.
    #[serde(rename = "type")]
    pub format: Option<String>,
}

impl RawRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `path` field.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathInput>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the `destination` field.
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Sets the `filename` field.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the `type` field.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Validates the request into an [`ArchiveRequest`].
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Configuration`] listing every violated
    /// constraint.
    pub fn validate(&self) -> Result<ArchiveRequest> {
        validate(self)
    }
}

/// A validated packaging request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    /// Inputs in the order they are staged.
    pub paths: Vec<PathBuf>,
    /// Absolute destination directory.
    pub destination: PathBuf,
    /// Archive base name and staged root name.
    pub filename: String,
    /// Output format.
    pub format: ArchiveFormat,
}

impl ArchiveRequest {
    /// Path of the archive this request produces.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcpack_core::ArchiveFormat;
    /// use arcpack_core::ArchiveRequest;
    /// use std::path::PathBuf;
    ///
    /// let request = ArchiveRequest {
    ///     paths: vec![PathBuf::from("/srv/site")],
    ///     destination: PathBuf::from("/tmp/out"),
    ///     filename: "site".into(),
    ///     format: ArchiveFormat::Zip,
    /// };
    /// assert_eq!(request.archive_path(), PathBuf::from("/tmp/out/site.zip"));
    /// ```
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.destination.join(self.format.file_name(&self.filename))
    }
}

/// Validates raw request fields.
///
/// Checks, in order: every input path exists, at least one input is given,
/// the destination is an existing directory, the file name is a non-empty
/// plain name, and the format is recognized.
///
/// # Errors
///
/// Returns [`ArchiveError::Configuration`] holding one message per violation.
pub fn validate(raw: &RawRequest) -> Result<ArchiveRequest> {
    let mut errors = ValidationErrors::new();

    let resolved = raw
        .path
        .as_ref()
        .map_or_else(|| ResolvedPaths::Single(String::new()), PathInput::resolve);

    match &resolved {
        ResolvedPaths::Multiple(paths) => {
            for path in paths.iter().filter(|p| !Path::new(p).exists()) {
                errors.push(format!("path[] '{path}' No such file or directory"));
            }
        }
        ResolvedPaths::Single(path) => {
            if !Path::new(path).exists() {
                errors.push(format!("path '{path}' No such file or directory"));
            }
        }
    }

    if resolved.is_empty() {
        errors.push("path must be a single file/dir or a list of files/dirs");
    }

    let destination = raw.destination.as_deref().unwrap_or_default();
    if !Path::new(destination).is_dir() {
        errors.push(format!("destination: '{destination}' No such directory"));
    }

    let filename = raw.filename.as_deref().unwrap_or_default();
    if filename.is_empty() {
        errors.push("filename not specified");
    } else if !is_plain_name(filename) {
        errors.push(format!("filename '{filename}' must not contain a path"));
    }

    let format = match raw.format.as_deref().unwrap_or("targz").parse::<ArchiveFormat>() {
        Ok(format) => Some(format),
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    };

    match format {
        Some(format) if errors.is_empty() => Ok(ArchiveRequest {
            paths: resolved.as_slice().iter().map(PathBuf::from).collect(),
            destination: absolute(Path::new(destination)),
            filename: filename.to_string(),
            format,
        }),
        _ => Err(ArchiveError::Configuration(errors)),
    }
}

/// A file name usable both as a directory name and an archive base name.
fn is_plain_name(name: &str) -> bool {
    name != "." && name != ".." && !name.contains('/') && !name.contains('\0')
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
