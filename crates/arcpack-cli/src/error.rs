//! Error conversion utilities for CLI.
//!
//! Converts arcpack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance. The original
//! `ArchiveError` stays reachable through `downcast_ref`, which is how the
//! exit code is chosen.

use anyhow::Result;
use arcpack_core::ArchiveError;
use arcpack_core::ErrorKind;

/// Exit code for an invalid request or engine setting.
pub const EXIT_CONFIGURATION: i32 = 2;

/// Exit code for any other failure.
pub const EXIT_FAILURE: i32 = 1;

/// Converts `ArchiveError` to a user-friendly anyhow error with context.
pub fn convert_archive_error(err: ArchiveError) -> anyhow::Error {
    let context = match &err {
        ArchiveError::Configuration(errors) => format!(
            "Invalid archive request ({} problem{})\n\
             HINT: Check that every PATH exists, --destination is a directory, \
             and --type is zip or targz.",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" }
        ),
        ArchiveError::InvalidConfig { .. } => "Invalid engine settings\n\
             HINT: --compression-level must be 1-9 and --staging-dir must be an existing directory."
            .to_string(),
        ArchiveError::Staging { .. } => "Failed to copy inputs into the staging area\n\
             HINT: Check that every input is readable and the temporary directory has free space."
            .to_string(),
        ArchiveError::Build { format, .. } => format!(
            "Failed to write the {format} archive\n\
             HINT: Check that the destination is writable and no directory has the archive's name."
        ),
        ArchiveError::Checksum { .. } => "Archive written, but its .md5 sidecar could not be \
             published\n\
             HINT: The archive may be incomplete; rerun once the destination is writable."
            .to_string(),
    };

    anyhow::Error::new(err).context(context)
}

/// Adds context to a result from arcpack-core.
pub fn add_archive_context<T>(result: Result<T, ArchiveError>) -> anyhow::Result<T> {
    result.map_err(convert_archive_error)
}

/// Picks the process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ArchiveError>().map(ArchiveError::kind) {
        Some(ErrorKind::Configuration) => EXIT_CONFIGURATION,
        Some(ErrorKind::Plugin) | None => EXIT_FAILURE,
    }
}
