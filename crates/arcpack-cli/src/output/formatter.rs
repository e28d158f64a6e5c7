//! Output formatter trait for CLI results.

use anyhow::Result;
use arcpack_core::ArchiveResult;
use arcpack_core::HarnessOutputs;
use arcpack_core::OutputSink;
use serde::Serialize;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of `create`
    fn format_archive_result(&self, result: &ArchiveResult) -> Result<()>;

    /// Format the harness outputs of `run`
    fn format_harness_outputs(&self, outputs: &HarnessOutputs) -> Result<()>;

    /// Format a progress message from the packaging pipeline
    fn format_progress(&self, message: &str);

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);
}

/// Routes pipeline progress messages to a formatter.
pub struct FormatterSink<'a> {
    formatter: &'a dyn OutputFormatter,
}

impl<'a> FormatterSink<'a> {
    pub fn new(formatter: &'a dyn OutputFormatter) -> Self {
        Self { formatter }
    }
}

impl OutputSink for FormatterSink<'_> {
    fn write_output(&mut self, text: &str) {
        self.formatter.format_progress(text);
    }
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
