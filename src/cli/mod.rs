//! CLI argument parsing for vaultsift
//!
//! Global flags: --format, --quiet, --verbose, --log-level, --log-json,
//! --config-dir

pub mod args;
pub mod output;
pub mod parse;
pub mod paths;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{ProviderArgs, ReviewArgs};
pub use output::OutputFormat;

/// Vaultsift - review a vault of markdown notes with an LLM
#[derive(Parser, Debug)]
#[command(name = "vaultsift")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Debug-level logging to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (e.g. `debug`, `vaultsift_core=trace`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Directory holding config.toml
    #[arg(long, global = true, env = "VAULTSIFT_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Review notes interactively, resuming any unfinished session
    Review(ReviewArgs),

    /// Show progress of the saved session
    Status {
        /// Vault directory (defaults to the current directory)
        vault: Option<PathBuf>,
    },

    /// Discard the saved session
    Reset {
        /// Vault directory (defaults to the current directory)
        vault: Option<PathBuf>,
    },

    /// Check whether CANDIDATE preserves the content of ORIGINAL
    Check {
        /// The note as it is now
        original: PathBuf,

        /// The proposed replacement
        candidate: PathBuf,
    },

    /// Extract atomic concepts from one note into new linked notes
    Extract {
        /// Vault directory
        vault: PathBuf,

        /// Note path relative to the vault (e.g. `ideas/rust.md`)
        note: String,

        #[command(flatten)]
        provider: ProviderArgs,
    },
}
