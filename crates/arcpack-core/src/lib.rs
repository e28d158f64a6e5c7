//! Archive packaging library.
//!
//! `arcpack-core` turns a loosely typed request (input paths, destination
//! directory, base name, format) into a `.tar.gz` or `.zip` archive plus an
//! `.md5` sidecar. Inputs are first copied into a private staging area, so
//! several files and directories merge into one tree before serialization,
//! and the staging area is always removed afterwards.
//!
//! # Examples
//!
//! ```no_run
//! use arcpack_core::ArchiveConfig;
//! use arcpack_core::NullSink;
//! use arcpack_core::RawRequest;
//! use arcpack_core::create_archive;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let request = RawRequest::new()
//!     .with_path("/srv/site")
//!     .with_destination("/tmp/out")
//!     .with_filename("site");
//!
//! let result = create_archive(&request, &ArchiveConfig::default(), &mut NullSink)?;
//! println!("{} {}", result.archive_file.display(), result.md5);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archiver;
pub mod builder;
pub mod checksum;
pub mod config;
pub mod error;
pub mod format;
pub mod output;
pub mod report;
pub mod request;
pub mod staging;
pub mod walker;

// Re-export main API types
pub use archiver::Archiver;
pub use archiver::create_archive;
pub use builder::BuildReport;
pub use config::ArchiveConfig;
pub use error::ArchiveError;
pub use error::ErrorKind;
pub use error::Result;
pub use error::Stage;
pub use error::ValidationErrors;
pub use format::ArchiveFormat;
pub use output::NullSink;
pub use output::OutputSink;
pub use report::ArchiveResult;
pub use report::HarnessOutputs;
pub use request::ArchiveRequest;
pub use request::RawRequest;
