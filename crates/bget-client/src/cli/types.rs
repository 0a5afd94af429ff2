//! CLI types and struct definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use bget_core::constants::{DEFAULT_GATEWAY, GATEWAY_ENV};

/// Log output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CliLogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Structured JSON output.
    Json,
}

impl From<CliLogFormat> for bget_core::LogFormat {
    fn from(fmt: CliLogFormat) -> Self {
        match fmt {
            CliLogFormat::Text => bget_core::LogFormat::Text,
            CliLogFormat::Json => bget_core::LogFormat::Json,
        }
    }
}

/// Download files from a blobber network.
#[derive(Debug, Parser)]
#[command(name = "bget", version, about = "Download files from a blobber network")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Gateway endpoint used to resolve allocations
    #[arg(
        long = "gateway",
        value_name = "URL",
        env = GATEWAY_ENV,
        default_value = DEFAULT_GATEWAY,
        global = true
    )]
    pub gateway: String,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log to file instead of stderr
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(long = "log-format", default_value = "text", global = true)]
    pub log_format: CliLogFormat,
}

/// The command table.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download a file or its thumbnail from the blobbers
    Download(DownloadArgs),
}

/// Arguments for the download command.
#[derive(Debug, Parser)]
pub struct DownloadArgs {
    /// Allocation ID (required with --remotepath)
    #[arg(long, value_name = "ID")]
    pub allocation: Option<String>,

    /// Remote path of the file to download
    #[arg(long, value_name = "PATH")]
    pub remotepath: Option<String>,

    /// Local path to download the file to
    #[arg(long, value_name = "PATH")]
    pub localpath: PathBuf,

    /// Auth ticket for a file you do not own
    #[arg(long, value_name = "TICKET")]
    pub authticket: Option<String>,

    /// Lookup hash of the object, for directory-scoped auth tickets
    #[arg(long, value_name = "HASH")]
    pub lookuphash: Option<String>,

    /// Download only the thumbnail
    #[arg(short = 't', long)]
    pub thumbnail: bool,

    /// Suppress the progress bar
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}
