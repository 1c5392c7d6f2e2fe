//! `vaultsift extract` - turn one note's concepts into new notes

use std::path::Path;

use vaultsift_core::assess::{Assessor, GeminiClient, RetryPolicy};
use vaultsift_core::checkpoint::LoadOutcome;
use vaultsift_core::concepts;
use vaultsift_core::error::{ExitCode, Result};
use vaultsift_core::traversal::{Controller, Durability};
use vaultsift_core::vault::{FsVault, NoteStore};

use crate::cli::ProviderArgs;
use crate::commands::dispatch::command::CommandContext;

pub fn execute(
    ctx: &CommandContext,
    vault_path: &Path,
    key: &str,
    provider: &ProviderArgs,
) -> Result<ExitCode> {
    let config = ctx.load_config()?;
    let provider_config = provider.apply(config.provider);
    let vault = FsVault::open(vault_path)?;
    let note = vault.read(key)?;

    let client = GeminiClient::from_env(&provider_config, provider.api_key.as_deref())?;
    let assessor = Assessor::new(client, RetryPolicy::from_config(&provider_config));

    let drafts = assessor.extract_concepts(&note)?;
    let report = concepts::materialize(&vault, &note, &drafts)?;
    if !report.created.is_empty() {
        record_in_session(&vault, &report.created);
    }

    if ctx.is_json() {
        let skipped: Vec<_> = report
            .skipped
            .iter()
            .map(|(title, reason)| serde_json::json!({ "title": title, "reason": reason }))
            .collect();
        println!(
            "{}",
            serde_json::json!({
                "source": note.key(),
                "created": report.created,
                "skipped": skipped,
            })
        );
    } else if !ctx.cli.quiet {
        if drafts.is_empty() {
            println!("No concepts found in {}", note.key());
        }
        for created in &report.created {
            println!("created {}", created);
        }
        for (title, reason) in &report.skipped {
            println!("skipped {}: {}", title, reason);
        }
    }

    Ok(ExitCode::Success)
}

/// Track created notes in a saved review session, if the vault has one
fn record_in_session(vault: &FsVault, created: &[String]) {
    let mut controller = Controller::new(vault.root());
    let mut checkpoint = match controller.store().load() {
        LoadOutcome::Loaded(cp) => cp,
        LoadOutcome::Missing | LoadOutcome::Discarded(_) => return,
    };
    match controller.record_created(created, &mut checkpoint) {
        Durability::Saved => tracing::debug!(count = created.len(), "created notes added to session"),
        other => tracing::warn!(durability = ?other, "could not record created notes in session"),
    }
}
