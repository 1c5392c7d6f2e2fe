//! `vaultsift review` - interactive, resumable vault review

pub mod display;
pub mod keys;
pub mod session;

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vaultsift_core::assess::{Assessor, GeminiClient, RetryPolicy};
use vaultsift_core::error::{ExitCode, Result, VaultError};
use vaultsift_core::trace_time;
use vaultsift_core::traversal::{Controller, Durability, SessionStart, WorkQueue};
use vaultsift_core::vault::{FsVault, NoteStore, ScanReport};

use crate::cli::paths::resolve_vault_path;
use crate::cli::ReviewArgs;
use crate::commands::dispatch::command::CommandContext;
use keys::{LineKeys, TerminalKeys};
use session::ReviewSession;

pub fn execute(ctx: &CommandContext, args: &ReviewArgs) -> Result<ExitCode> {
    let config = ctx.load_config()?;
    let overrides = args.overrides()?;
    let provider_config = args.provider.apply(config.provider);
    let vault = FsVault::open(&resolve_vault_path(args.vault.clone()))?;

    // Fail on a missing key before touching the checkpoint
    let client = GeminiClient::from_env(&provider_config, args.provider.api_key.as_deref())?;
    tracing::debug!(url = client.url(), "provider ready");
    let interrupt = Arc::new(AtomicBool::new(false));
    let assessor = Assessor::new(client, RetryPolicy::from_config(&provider_config))
        .with_interrupt(Arc::clone(&interrupt));
    if !overrides.is_empty() {
        tracing::debug!(?overrides, "policy overrides from command line");
    }

    // Interactive text goes to stderr when stdout carries JSON
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let out: &mut dyn Write = if ctx.is_json() {
        &mut stderr
    } else {
        &mut stdout
    };

    let mut controller = Controller::new(vault.root());
    let start = controller.begin(vault.root(), config.policy, &overrides, args.fresh);
    let scan_start = std::time::Instant::now();
    let (queue, scan) = controller.enumerate(&vault, &start.checkpoint)?;
    trace_time!(scan_start, "enumerate");

    announce(out, &start, &queue, &scan, vault.root(), ctx.cli.quiet)?;

    let flag = Arc::clone(&interrupt);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }

    let summary = if io::stdin().is_terminal() {
        ReviewSession::new(
            &vault,
            &assessor,
            TerminalKeys::stdout(),
            out,
            controller,
            start.checkpoint,
            queue,
            interrupt,
        )
        .run()?
    } else {
        let stdin = io::stdin();
        ReviewSession::new(
            &vault,
            &assessor,
            LineKeys::new(stdin.lock()),
            out,
            controller,
            start.checkpoint,
            queue,
            interrupt,
        )
        .run()?
    };

    if ctx.is_json() {
        println!("{}", serde_json::to_string(&summary)?);
    } else if !ctx.cli.quiet {
        display::summary(out, &summary)?;
    }

    if summary.interrupted {
        return Err(VaultError::Interrupted);
    }
    Ok(ExitCode::Success)
}

/// Startup notices: discarded or unwritable checkpoint, resume point, scope
fn announce(
    out: &mut dyn Write,
    start: &SessionStart,
    queue: &WorkQueue,
    scan: &ScanReport,
    vault_root: &Path,
    quiet: bool,
) -> Result<()> {
    if let Some(reason) = &start.discarded {
        display::warning(out, &format!("ignoring saved session: {}", reason))?;
    }
    if let Durability::Degraded(reason) = &start.durability {
        display::warning(
            out,
            &format!("cannot save progress ({}); continuing without", reason),
        )?;
    }

    if quiet {
        return Ok(());
    }
    if start.resumed {
        writeln!(
            out,
            "Resuming session from {} ({} notes already reviewed)",
            start
                .checkpoint
                .session_started
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M"),
            start.checkpoint.finalized.len()
        )?;
    }
    writeln!(out, "{} notes to review in {}", queue.total(), vault_root.display())?;
    if !scan.oversized.is_empty() {
        writeln!(
            out,
            "Skipping {} notes larger than {} bytes",
            scan.oversized.len(),
            start.checkpoint.policy.max_note_bytes
        )?;
    }
    Ok(())
}
