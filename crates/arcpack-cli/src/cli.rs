//! CLI argument parsing using clap.

use arcpack_core::ArchiveConfig;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "arcpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Package files and directories into an archive
    Create(CreateArgs),
    /// Package a JSON request document and print the harness outputs
    Run(RunArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Files or directories to archive, merged in order
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,

    /// Directory the archive is written to
    #[arg(short, long, value_name = "DIR")]
    pub destination: String,

    /// Archive base name, without extension
    #[arg(short, long, value_name = "NAME")]
    pub filename: String,

    /// Archive format: zip or targz
    #[arg(short = 't', long = "type", value_name = "TYPE", default_value = "targz")]
    pub format: String,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Request document (JSON object); reads stdin when omitted or `-`
    #[arg(value_name = "REQUEST")]
    pub request: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(clap::Args, Debug)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Engine settings shared by the packaging commands.
#[derive(clap::Args, Debug)]
pub struct EngineArgs {
    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,

    /// Directory in which the temporary staging area is created
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Store default permissions instead of the source file modes
    #[arg(long)]
    pub no_preserve_permissions: bool,
}

impl EngineArgs {
    pub fn to_config(&self) -> ArchiveConfig {
        let mut config =
            ArchiveConfig::default().with_preserve_permissions(!self.no_preserve_permissions);
        if let Some(level) = self.compression_level {
            config = config.with_compression_level(level);
        }
        if let Some(dir) = &self.staging_dir {
            config = config.with_staging_parent(dir);
        }
        config
    }
}
