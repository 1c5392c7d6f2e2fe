//! Command trait and context for dispatching commands

use std::time::Instant;

use crate::cli::{Cli, OutputFormat};
use vaultsift_core::config::GlobalConfig;
use vaultsift_core::error::{ExitCode, Result};

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, start: Instant) -> Self {
        Self { cli, start }
    }

    /// Load config.toml, honoring `--config-dir`
    pub fn load_config(&self) -> Result<GlobalConfig> {
        let config = GlobalConfig::load(self.cli.config_dir.as_deref())?;
        tracing::debug!(elapsed = ?self.start.elapsed(), "load_config");
        Ok(config)
    }

    pub fn is_json(&self) -> bool {
        self.cli.format == OutputFormat::Json
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<ExitCode>;
}

/// No subcommand given
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<ExitCode> {
        println!("vaultsift {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Review a vault of markdown notes with an LLM.");
        println!();
        println!("Run `vaultsift --help` for usage information.");
        Ok(ExitCode::Success)
    }
}
