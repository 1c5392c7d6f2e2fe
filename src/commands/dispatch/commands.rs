//! Maps each subcommand to its implementation

use crate::cli::paths::resolve_vault_path;
use crate::cli::Commands;
use crate::commands::dispatch::command::{Command, CommandContext};
use crate::commands::{check, extract, reset, review, status};
use vaultsift_core::error::{ExitCode, Result};

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<ExitCode> {
        match self {
            Commands::Review(args) => review::execute(ctx, args),
            Commands::Status { vault } => status::execute(ctx, &resolve_vault_path(vault.clone())),
            Commands::Reset { vault } => reset::execute(ctx, &resolve_vault_path(vault.clone())),
            Commands::Check {
                original,
                candidate,
            } => check::execute(ctx, original, candidate),
            Commands::Extract {
                vault,
                note,
                provider,
            } => extract::execute(ctx, vault, note, provider),
        }
    }
}
