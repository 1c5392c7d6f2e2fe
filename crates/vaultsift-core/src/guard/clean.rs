//! Best-effort removal of instructions the model echoes back around a rewrite

use std::sync::OnceLock;

use regex::Regex;

/// Lines starting with these (case-insensitive) are model chatter, not note content
const CHATTER_PREFIXES: &[&str] = &[
    "here is the enhanced",
    "here's the enhanced",
    "here is your enhanced",
    "here is the improved",
    "here's the improved",
    "enhanced version:",
    "enhanced note:",
    "i have enhanced",
    "i've enhanced",
    "note: i preserved",
    "note: all original content",
    "important: preserve",
    "important: do not remove",
    "original content:",
    "return the complete",
];

/// Delimiter lines such as `=== ENHANCED NOTE ===` or `--- BEGIN NOTE ---`
static DELIMITER: OnceLock<Option<Regex>> = OnceLock::new();

fn delimiter_re() -> Option<&'static Regex> {
    DELIMITER
        .get_or_init(|| {
            Regex::new(r"(?i)^\s*(?:={3,}|-{3,}|#{3,}|\*{3,})\s*(?:begin|end|start)?\s*(?:of\s+)?(?:enhanced|original|improved|rewritten)\s+(?:note|content|version)\s*(?:={3,}|-{3,}|#{3,}|\*{3,})?\s*$")
                .map_err(|e| tracing::warn!(error = %e, "Failed to compile delimiter regex"))
                .ok()
        })
        .as_ref()
}

/// Strip a surrounding ```markdown fence if the whole reply is wrapped in one
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string (`markdown`, `md`) on the opening line
    match body.split_once('\n') {
        Some((info, inner)) if !info.trim().contains(' ') => inner,
        _ => body,
    }
}

/// Remove echoed instructions, wrapper fences and delimiter lines.
///
/// The result is trimmed of surrounding blank lines and ends with a single
/// newline when non-empty.
pub fn clean_response(reply: &str) -> String {
    let unfenced = strip_fence(reply);
    let delimiter = delimiter_re();

    let kept: Vec<&str> = unfenced
        .lines()
        .filter(|line| {
            let lower = line.trim().to_lowercase();
            if CHATTER_PREFIXES.iter().any(|p| lower.starts_with(p)) {
                return false;
            }
            !delimiter.is_some_and(|re| re.is_match(line))
        })
        .collect();

    let joined = kept.join("\n");
    let trimmed = joined.trim_matches(|c| c == '\n' || c == '\r');
    if trimmed.trim().is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed.trim_end())
    }
}
