//! Terminal rendering for the review loop

use std::io::{self, Write};

use console::style;
use vaultsift_core::assess::{Assessment, Verdict};
use vaultsift_core::concepts::Materialized;
use vaultsift_core::guard::GuardReport;
use vaultsift_core::note::Note;

use super::session::Summary;

const RULE: &str = "────────────────────────────────────────────────────────────";

pub fn header(out: &mut dyn Write, position: usize, total: usize, note: &Note) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).dim())?;
    writeln!(
        out,
        "{} {}  {}",
        style(format!("[{}/{}]", position, total)).cyan(),
        style(note.key()).bold(),
        style(format!("{} bytes", note.size())).dim()
    )?;
    writeln!(out, "{}", style(RULE).dim())
}

pub fn assessment(out: &mut dyn Write, assessment: &Assessment) -> io::Result<()> {
    let score = format!("{:.1}/10", assessment.score);
    let score = if assessment.failed {
        style(score).yellow()
    } else if assessment.score >= 7.0 {
        style(score).green()
    } else if assessment.score >= 4.0 {
        style(score).yellow()
    } else {
        style(score).red()
    };
    let verdict = match assessment.verdict {
        Verdict::Keep => style("KEEP").green().bold(),
        Verdict::Enhance => style("ENHANCE").yellow().bold(),
        Verdict::Remove => style("REMOVE").red().bold(),
    };
    writeln!(out, "Score: {}   Suggestion: {}", score, verdict)?;
    writeln!(out, "{}", assessment.rationale)
}

/// First `max_chars` characters of the body
pub fn preview(out: &mut dyn Write, body: &str, max_chars: usize) -> io::Result<()> {
    writeln!(out)?;
    let shown: String = body.chars().take(max_chars).collect();
    writeln!(out, "{}", shown.trim_end())?;
    if body.chars().count() > max_chars {
        writeln!(out, "{}", style("... (v to view all)").dim())?;
    }
    Ok(())
}

pub fn full(out: &mut dyn Write, body: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).dim())?;
    writeln!(out, "{}", body.trim_end())?;
    writeln!(out, "{}", style(RULE).dim())
}

pub fn menu(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out)?;
    write!(
        out,
        "[k]eep (Enter)  [d]elete  [v]iew  [e]nhance  [c]oncepts  [s]kip  [q]uit > "
    )?;
    out.flush()
}

pub fn notice(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{}", style(message).cyan())
}

pub fn warning(out: &mut dyn Write, message: &str) -> io::Result<()> {
    writeln!(out, "{} {}", style("warning:").yellow().bold(), message)
}

pub fn enhanced(out: &mut dyn Write, report: &GuardReport) -> io::Result<()> {
    writeln!(
        out,
        "{} ({}, {:.0}% of lines kept)",
        style("Enhanced and saved").green().bold(),
        report.decision,
        report.line_match_ratio * 100.0
    )
}

pub fn rejected(out: &mut dyn Write, report: &GuardReport) -> io::Result<()> {
    writeln!(
        out,
        "{} {}. The note was left unchanged.",
        style("Enhancement rejected:").red().bold(),
        report.decision
    )?;
    for marker in &report.missing_markers {
        writeln!(out, "  missing {}", marker)?;
    }
    Ok(())
}

pub fn concepts(out: &mut dyn Write, report: &Materialized) -> io::Result<()> {
    for key in &report.created {
        writeln!(out, "  {} {}", style("+").green(), key)?;
    }
    for (title, reason) in &report.skipped {
        writeln!(out, "  {} {} ({})", style("-").dim(), title, reason)?;
    }
    if !report.created.is_empty() {
        writeln!(out, "New notes will be reviewed next.")?;
    }
    Ok(())
}

pub fn summary(out: &mut dyn Write, summary: &Summary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style("Review summary").bold().underlined())?;
    writeln!(out, "  kept:     {}", style(summary.kept.len()).green())?;
    writeln!(out, "  deleted:  {}", style(summary.deleted.len()).red())?;
    writeln!(out, "  enhanced: {}", style(summary.enhanced.len()).yellow())?;
    writeln!(out, "  created:  {}", style(summary.created.len()).cyan())?;
    writeln!(out, "  skipped:  {}", summary.skipped.len())?;
    if summary.failed_assessments > 0 {
        writeln!(
            out,
            "  {} assessment(s) failed and defaulted to keep",
            summary.failed_assessments
        )?;
    }
    if !summary.deleted.is_empty() {
        writeln!(out)?;
        writeln!(out, "Deleted:")?;
        for key in &summary.deleted {
            writeln!(out, "  {}", key)?;
        }
    }
    writeln!(out)?;
    if summary.complete {
        writeln!(out, "{}", style("Vault review complete.").green())
    } else if !summary.durable {
        writeln!(
            out,
            "{} progress of this run could not be saved.",
            style("warning:").yellow().bold()
        )
    } else if summary.interrupted {
        writeln!(out, "Interrupted. Run `vaultsift review` again to continue.")
    } else {
        writeln!(out, "Progress saved. Run `vaultsift review` again to continue.")
    }
}
