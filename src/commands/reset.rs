//! `vaultsift reset` - discard the saved session for a vault

use std::path::Path;

use vaultsift_core::checkpoint::CheckpointStore;
use vaultsift_core::error::{ExitCode, Result};
use vaultsift_core::vault::{FsVault, NoteStore};

use crate::commands::dispatch::command::CommandContext;

pub fn execute(ctx: &CommandContext, vault_path: &Path) -> Result<ExitCode> {
    let vault = FsVault::open(vault_path)?;
    let store = CheckpointStore::for_root(vault.root());
    let removed = store.remove()?;

    if ctx.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "vault": vault.root(),
                "removed": removed,
            })
        );
    } else if !ctx.cli.quiet {
        if removed {
            println!("Removed saved session for {}", vault.root().display());
        } else {
            println!("No saved session for {}", vault.root().display());
        }
    }

    Ok(ExitCode::Success)
}
