//! Create command implementation.

use crate::cli::CreateArgs;
use crate::error::add_archive_context;
use crate::output::FormatterSink;
use crate::output::OutputFormatter;
use anyhow::Result;
use arcpack_core::Archiver;
use arcpack_core::RawRequest;
use arcpack_core::request::PathInput;

pub fn execute(args: &CreateArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let request = RawRequest::new()
        .with_path(path_input(&args.paths))
        .with_destination(args.destination.as_str())
        .with_filename(args.filename.as_str())
        .with_format(args.format.as_str());

    let archiver = Archiver::new(args.engine.to_config());
    let mut sink = FormatterSink::new(formatter);
    let result = add_archive_context(archiver.archive(&request, &mut sink))?;

    formatter.format_archive_result(&result)
}

/// One argument is passed through as text so it may carry a JSON array of
/// paths; several arguments form a list.
fn path_input(paths: &[String]) -> PathInput {
    match paths {
        [single] => PathInput::Text(single.clone()),
        _ => PathInput::List(paths.to_vec()),
    }
}
