//! `vaultsift check` - run the preservation guard on two files

use std::fs;
use std::path::Path;

use console::style;
use vaultsift_core::error::{ExitCode, Result, VaultError};
use vaultsift_core::guard;

use crate::commands::dispatch::command::CommandContext;

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| VaultError::io_operation("read", path.display(), e))
}

/// Exit 0 when the candidate is accepted, 1 when rejected
pub fn execute(ctx: &CommandContext, original: &Path, candidate: &Path) -> Result<ExitCode> {
    let config = ctx.load_config()?;
    let original_text = read(original)?;
    let candidate_text = read(candidate)?;

    let report = guard::check(&original_text, &candidate_text, &config.policy.guard);
    let accepted = report.accepted();
    tracing::debug!(decision = ?report.decision, accepted, "guard check");

    if ctx.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "accepted": accepted,
                "decision": report.decision,
                "line_match_ratio": report.line_match_ratio,
                "missing_markers": report.missing_markers,
            })
        );
    } else if !ctx.cli.quiet {
        let verdict = if accepted {
            style("accepted").green().bold()
        } else {
            style("rejected").red().bold()
        };
        println!("{}: {}", verdict, report.decision);
        println!(
            "line match: {:.0}% (minimum {:.0}%)",
            report.line_match_ratio * 100.0,
            config.policy.guard.min_line_match_ratio * 100.0
        );
        if !report.missing_markers.is_empty() {
            println!("missing markers:");
            for marker in &report.missing_markers {
                println!("  {}", marker);
            }
        }
    }

    Ok(if accepted {
        ExitCode::Success
    } else {
        ExitCode::Failure
    })
}
