//! Run command: packages a JSON request document.
//!
//! The document is a JSON object with the harness request fields `path`,
//! `destination`, `filename` and `type`. On success the harness outputs are
//! printed to stdout.

use crate::cli::RunArgs;
use crate::error::add_archive_context;
use crate::output::FormatterSink;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use arcpack_core::Archiver;
use arcpack_core::RawRequest;
use std::fs;
use std::io;
use std::io::Read;
use std::path::Path;

pub fn execute(args: &RunArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let document = read_document(args.request.as_deref())?;
    let request: RawRequest =
        serde_json::from_str(&document).context("Request document is not a valid JSON object")?;
    tracing::debug!(?request, "parsed request document");

    let archiver = Archiver::new(args.engine.to_config());
    let mut sink = FormatterSink::new(formatter);
    let result = add_archive_context(archiver.archive(&request, &mut sink))?;

    let outputs = result
        .to_harness_outputs()
        .context("Failed to encode the archive result")?;
    formatter.format_harness_outputs(&outputs)
}

fn read_document(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read request document '{}'", path.display())),
        _ => {
            let mut document = String::new();
            io::stdin()
                .read_to_string(&mut document)
                .context("Failed to read request document from stdin")?;
            Ok(document)
        }
    }
}
