//! Packaging pipeline.
//!
//! [`Archiver`] runs one request through validation, staging, archive
//! serialization and checksum publication. Failures before staging are
//! configuration errors; anything later is a plugin error. The staging area
//! never outlives the call.

use std::fmt;
use std::path::Path;

use tracing::info;
use tracing::warn;

use crate::ArchiveConfig;
use crate::ArchiveResult;
use crate::OutputSink;
use crate::RawRequest;
use crate::Result;
use crate::builder::build_archive;
use crate::checksum::write_checksum;
use crate::error::ErrorKind;
use crate::request::ArchiveRequest;
use crate::staging::StagingArea;
use crate::walker::collect_entries;

/// Pipeline position, reported through `tracing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Nothing started yet.
    Idle,
    /// Checking the request.
    Validating,
    /// Copying inputs into the staging area.
    Staging,
    /// Writing the archive.
    Building,
    /// Writing the `.md5` sidecar.
    Checksumming,
    /// Archive and sidecar are published.
    Done,
    /// The operation stopped with an error of the given kind.
    Failed(ErrorKind),
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Validating => f.write_str("validating"),
            Self::Staging => f.write_str("staging"),
            Self::Building => f.write_str("building"),
            Self::Checksumming => f.write_str("checksumming"),
            Self::Done => f.write_str("done"),
            Self::Failed(kind) => write!(f, "failed ({kind})"),
        }
    }
}

/// Runs packaging requests with a fixed engine configuration.
///
/// # Examples
///
/// ```no_run
/// use arcpack_core::Archiver;
/// use arcpack_core::RawRequest;
///
/// let request = RawRequest::new()
///     .with_path(r#"["/srv/site", "/etc/motd"]"#)
///     .with_destination("/tmp/out")
///     .with_filename("site")
///     .with_format("zip");
///
/// let mut messages: Vec<String> = Vec::new();
/// let result = Archiver::default().archive(&request, &mut messages)?;
/// println!("{} ({})", result.archive_file.display(), result.md5);
/// # Ok::<(), arcpack_core::ArchiveError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Archiver {
    config: ArchiveConfig,
}

impl Archiver {
    /// Creates an archiver using `config`.
    #[must_use]
    pub const fn new(config: ArchiveConfig) -> Self {
        Self { config }
    }

    /// The engine configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Validates `raw` and packages it.
    ///
    /// Progress messages go to `sink`: one before the archive is written and
    /// one after the sidecar is published.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ArchiveError::Configuration`] or
    /// [`crate::ArchiveError::InvalidConfig`] before any work is done, and a
    /// plugin error if staging, building or checksumming fails.
    pub fn archive(&self, raw: &RawRequest, sink: &mut dyn OutputSink) -> Result<ArchiveResult> {
        enter(State::Idle);
        enter(State::Validating);

        let request = self
            .config
            .validate()
            .and_then(|()| raw.validate())
            .inspect_err(|e| enter(State::Failed(e.kind())))?;

        self.archive_request(&request, sink)
    }

    /// Packages an already validated request.
    ///
    /// # Errors
    ///
    /// Returns a plugin error if staging, building or checksumming fails.
    /// The staging area is removed in every case.
    pub fn archive_request(
        &self,
        request: &ArchiveRequest,
        sink: &mut dyn OutputSink,
    ) -> Result<ArchiveResult> {
        enter(State::Staging);
        let staging = StagingArea::create(&request.filename, &self.config)
            .inspect_err(|e| enter(State::Failed(e.kind())))?;

        let result = self
            .run(&staging, request, sink)
            .inspect_err(|e| enter(State::Failed(e.kind())));

        let staging_path = staging.path().to_path_buf();
        if let Err(e) = staging.close() {
            warn!(staging = %staging_path.display(), error = %e, "failed to remove staging area");
        }

        result
    }

    fn run(
        &self,
        staging: &StagingArea,
        request: &ArchiveRequest,
        sink: &mut dyn OutputSink,
    ) -> Result<ArchiveResult> {
        for path in &request.paths {
            staging.stage(path)?;
        }
        let entries = collect_entries(staging.root())?;

        enter(State::Building);
        let archive = request.archive_path();
        sink.write_output(&format!("\nCreating '{}'", archive.display()));
        let report = build_archive(request.format, &entries, &archive, &self.config)?;

        enter(State::Checksumming);
        let checksum = write_checksum(&archive)?;

        sink.write_output(&success_message(&archive, &checksum.sidecar));
        enter(State::Done);
        info!(
            archive = %archive.display(),
            files = report.files_added,
            directories = report.directories_added,
            bytes = report.bytes_compressed,
            "archive created"
        );

        Ok(ArchiveResult {
            archive_file: archive,
            checksum_file: checksum.sidecar,
            md5: checksum.digest,
            report,
        })
    }
}

/// Validates and packages `raw` with the given configuration.
///
/// Shorthand for `Archiver::new(config.clone()).archive(raw, sink)`.
///
/// # Errors
///
/// See [`Archiver::archive`].
pub fn create_archive(
    raw: &RawRequest,
    config: &ArchiveConfig,
    sink: &mut dyn OutputSink,
) -> Result<ArchiveResult> {
    Archiver::new(config.clone()).archive(raw, sink)
}

fn enter(state: State) {
    info!(%state, "archiver state");
}

fn success_message(archive: &Path, sidecar: &Path) -> String {
    format!(
        "\nSuccessfully Created Archive\n  name: {}\n  md5:  {}",
        archive.display(),
        sidecar.display()
    )
}
