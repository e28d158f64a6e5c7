//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use arcpack_core::ArchiveResult;
use arcpack_core::HarnessOutputs;
use serde::Serialize;
use std::io;
use std::io::Write;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

/// Flat view of an [`ArchiveResult`] for `create`.
#[derive(Debug, Serialize)]
struct CreateOutput {
    archive_file: String,
    checksum_file: String,
    md5: String,
    files_added: usize,
    directories_added: usize,
    bytes_written: u64,
    bytes_compressed: u64,
    compression_ratio: f64,
    duration_ms: u128,
}

impl From<&ArchiveResult> for CreateOutput {
    fn from(result: &ArchiveResult) -> Self {
        let report = &result.report;
        Self {
            archive_file: result.archive_file.display().to_string(),
            checksum_file: result.checksum_file.display().to_string(),
            md5: result.md5.clone(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_ratio: report.compression_ratio(),
            duration_ms: report.duration.as_millis(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_archive_result(&self, result: &ArchiveResult) -> Result<()> {
        Self::output(&JsonOutput::success("create", CreateOutput::from(result)))
    }

    fn format_harness_outputs(&self, outputs: &HarnessOutputs) -> Result<()> {
        Self::output(&JsonOutput::success("run", outputs))
    }

    // Progress text would break the single JSON document on stdout.
    fn format_progress(&self, _message: &str) {}

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("error", format!("{error:#}"));
        let _ = Self::output(&output);
    }
}
