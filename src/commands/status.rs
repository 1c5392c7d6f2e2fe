//! `vaultsift status` - show progress of the saved session

use std::path::Path;

use chrono::{DateTime, Local, Utc};
use serde_json::json;
use vaultsift_core::checkpoint::{CheckpointStore, LoadOutcome, SessionCheckpoint};
use vaultsift_core::error::{ExitCode, Result};
use vaultsift_core::traversal::Controller;
use vaultsift_core::vault::{FsVault, NoteStore};

use crate::commands::dispatch::command::CommandContext;

/// Pending keys listed in human output before eliding the rest
const MAX_LISTED: usize = 20;

pub fn execute(ctx: &CommandContext, vault_path: &Path) -> Result<ExitCode> {
    let vault = FsVault::open(vault_path)?;
    let store = CheckpointStore::for_root(vault.root());

    let checkpoint = match store.load() {
        LoadOutcome::Loaded(cp) => cp,
        LoadOutcome::Missing => return report_none(ctx, &vault, None),
        LoadOutcome::Discarded(reason) => return report_none(ctx, &vault, Some(reason)),
    };

    let controller = Controller::new(vault.root());
    let (queue, scan) = controller.enumerate(&vault, &checkpoint)?;
    let pending = queue.pending();

    if ctx.is_json() {
        println!(
            "{}",
            json!({
                "vault": vault.root(),
                "session": true,
                "session_started": checkpoint.session_started,
                "last_updated": checkpoint.last_updated,
                "finalized": checkpoint.finalized.len(),
                "kept": checkpoint.kept.len(),
                "deleted": checkpoint.deleted.len(),
                "enhanced": checkpoint.enhanced.len(),
                "created": checkpoint.created.len(),
                "oversized": scan.oversized.len(),
                "pending": pending,
                "policy": checkpoint.policy,
            })
        );
        return Ok(ExitCode::Success);
    }

    print_human(ctx, &checkpoint, pending, scan.oversized.len());
    Ok(ExitCode::Success)
}

fn print_human(
    ctx: &CommandContext,
    checkpoint: &SessionCheckpoint,
    pending: &[String],
    oversized: usize,
) {
    println!(
        "Session started {} (last update {})",
        local_time(checkpoint.session_started),
        local_time(checkpoint.last_updated)
    );
    println!(
        "Reviewed: {}  kept {}  deleted {}  enhanced {}  created {}",
        checkpoint.finalized.len(),
        checkpoint.kept.len(),
        checkpoint.deleted.len(),
        checkpoint.enhanced.len(),
        checkpoint.created.len()
    );
    println!("Pending: {}", pending.len());
    if oversized > 0 {
        println!("Too large to review: {}", oversized);
    }

    if ctx.cli.quiet {
        return;
    }
    for key in pending.iter().take(MAX_LISTED) {
        println!("  {}", key);
    }
    if pending.len() > MAX_LISTED {
        println!("  ... and {} more", pending.len() - MAX_LISTED);
    }
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn report_none(ctx: &CommandContext, vault: &FsVault, discarded: Option<String>) -> Result<ExitCode> {
    if ctx.is_json() {
        println!(
            "{}",
            json!({
                "vault": vault.root(),
                "session": false,
                "discarded": discarded,
            })
        );
    } else {
        match discarded {
            Some(reason) => println!("Saved session is unusable and will be ignored: {}", reason),
            None => println!("No saved session for {}", vault.root().display()),
        }
    }
    Ok(ExitCode::Success)
}
