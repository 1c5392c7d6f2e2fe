//! Command dispatch logic for vaultsift

use std::time::Instant;

use crate::cli::Cli;
use tracing::debug;
use vaultsift_core::error::{ExitCode, Result};

pub(crate) mod command;
mod commands;

use command::{Command, CommandContext, NoCommand};

pub fn run(cli: &Cli, start: Instant) -> Result<ExitCode> {
    let ctx = CommandContext::new(cli, start);

    debug!(elapsed = ?start.elapsed(), "dispatch");

    match &cli.command {
        None => NoCommand.execute(&ctx),
        Some(cmd) => cmd.execute(&ctx),
    }
}
