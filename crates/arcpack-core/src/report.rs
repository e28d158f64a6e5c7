//! Packaging results and their harness representation.

use std::path::PathBuf;

use serde::Serialize;

use crate::BuildReport;

/// Outcome of a successful packaging operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveResult {
    /// Absolute path of the archive.
    #[serde(rename = "archiveFile")]
    pub archive_file: PathBuf,

    /// Path of the `.md5` sidecar next to the archive.
    #[serde(rename = "archiveMD5")]
    pub checksum_file: PathBuf,

    /// Hex digest stored in the sidecar.
    #[serde(skip)]
    pub md5: String,

    /// Statistics from the build step.
    #[serde(skip)]
    pub report: BuildReport,
}

impl ArchiveResult {
    /// Converts the result into the fields handed back to the harness.
    ///
    /// # Errors
    ///
    /// Returns an error if a path is not valid UTF-8.
    pub fn to_harness_outputs(&self) -> serde_json::Result<HarnessOutputs> {
        Ok(HarnessOutputs {
            fields: HarnessFields {
                archive: serde_json::to_string(self)?,
            },
            outputs: HarnessScalars {
                archive: self.archive_file.display().to_string(),
                md5: self.checksum_file.display().to_string(),
            },
        })
    }
}

/// Everything the harness receives after a successful run.
///
/// # Examples
///
/// ```
/// use arcpack_core::ArchiveResult;
/// use arcpack_core::BuildReport;
/// use std::path::PathBuf;
///
/// let result = ArchiveResult {
///     archive_file: PathBuf::from("/out/site.zip"),
///     checksum_file: PathBuf::from("/out/site.zip.md5"),
///     md5: "d41d8cd98f00b204e9800998ecf8427e".into(),
///     report: BuildReport::default(),
/// };
/// let outputs = result.to_harness_outputs()?;
/// assert_eq!(
///     outputs.fields.archive,
///     r#"{"archiveFile":"/out/site.zip","archiveMD5":"/out/site.zip.md5"}"#
/// );
/// assert_eq!(outputs.outputs.md5, "/out/site.zip.md5");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarnessOutputs {
    /// Structured result fields.
    pub fields: HarnessFields,
    /// Named scalar outputs.
    pub outputs: HarnessScalars,
}

/// The structured `archive` field, JSON encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarnessFields {
    /// `{"archiveFile": ..., "archiveMD5": ...}` as a JSON string.
    pub archive: String,
}

/// Scalar outputs mirroring the structured result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarnessScalars {
    /// Archive path.
    pub archive: String,
    /// Sidecar path.
    pub md5: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> ArchiveResult {
        ArchiveResult {
            archive_file: PathBuf::from("/tmp/out/bundle.tar.gz"),
            checksum_file: PathBuf::from("/tmp/out/bundle.tar.gz.md5"),
            md5: "0".repeat(32),
            report: BuildReport::default(),
        }
    }

    #[test]
    fn test_result_serializes_harness_names() {
        let json: serde_json::Value = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["archiveFile"], "/tmp/out/bundle.tar.gz");
        assert_eq!(json["archiveMD5"], "/tmp/out/bundle.tar.gz.md5");
        assert!(json.get("md5").is_none());
        assert!(json.get("report").is_none());
    }

    #[test]
    fn test_harness_outputs() {
        let outputs = sample().to_harness_outputs().unwrap();
        assert_eq!(outputs.outputs.archive, "/tmp/out/bundle.tar.gz");
        assert_eq!(outputs.outputs.md5, "/tmp/out/bundle.tar.gz.md5");

        let field: serde_json::Value = serde_json::from_str(&outputs.fields.archive).unwrap();
        assert_eq!(field["archiveFile"], "/tmp/out/bundle.tar.gz");
    }
}
