//! Content-preservation guard for AI rewrites
//!
//! A rewritten note is only accepted when the original content is provably
//! still present. Callers must keep the original byte-for-byte whenever
//! [`validate`] returns false.

mod clean;

use std::fmt;

use serde::Serialize;

use crate::config::GuardConfig;
use crate::note::Markers;

pub use clean::clean_response;

/// Which check decided the outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Candidate is shorter than the original
    Truncated,
    /// Normalized original appears contiguously in the candidate
    Contiguous,
    /// Enough lines matched and every marker survived
    LineMatch,
    /// Too few original lines found in the candidate
    LowLineMatch,
    /// At least one link, tag or embed disappeared
    MarkersLost,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Decision::Truncated => "candidate is shorter than the original",
            Decision::Contiguous => "original text is intact",
            Decision::LineMatch => "original lines and markers are present",
            Decision::LowLineMatch => "too many original lines are missing",
            Decision::MarkersLost => "links, tags or embeds were dropped",
        };
        f.write_str(text)
    }
}

/// Outcome of validating one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardReport {
    pub decision: Decision,
    /// Fraction of normalized original lines found in the candidate
    pub line_match_ratio: f64,
    /// Original markers absent from the candidate
    pub missing_markers: Vec<String>,
}

impl GuardReport {
    pub fn accepted(&self) -> bool {
        matches!(self.decision, Decision::Contiguous | Decision::LineMatch)
    }
}

/// True when `candidate` is an acceptable replacement for `original`
pub fn validate(original: &str, candidate: &str, config: &GuardConfig) -> bool {
    check(original, candidate, config).accepted()
}

/// Run the guard and report why it passed or failed
pub fn check(original: &str, candidate: &str, config: &GuardConfig) -> GuardReport {
    if candidate.len() < original.len() {
        return GuardReport {
            decision: Decision::Truncated,
            line_match_ratio: 0.0,
            missing_markers: Vec::new(),
        };
    }

    let original_lines = normalized_lines(original);
    let candidate_lines = normalized_lines(candidate);

    if candidate_lines.join("\n").contains(&original_lines.join("\n")) {
        return GuardReport {
            decision: Decision::Contiguous,
            line_match_ratio: 1.0,
            missing_markers: Vec::new(),
        };
    }

    let ratio = line_match_ratio(&original_lines, &candidate_lines, config.min_fuzzy_line_len);
    let missing_markers = Markers::extract(original).missing_from(&Markers::extract(candidate));

    let decision = if !missing_markers.is_empty() {
        Decision::MarkersLost
    } else if ratio < config.min_line_match_ratio {
        Decision::LowLineMatch
    } else {
        Decision::LineMatch
    };

    tracing::debug!(?decision, ratio, missing = missing_markers.len(), "guard verdict");

    GuardReport {
        decision,
        line_match_ratio: ratio,
        missing_markers,
    }
}

/// Trim every line and drop blank ones, keeping order
fn normalized_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Lowercase alphanumerics with single spaces; punctuation dropped
fn loose(line: &str) -> String {
    line.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn line_match_ratio(original: &[&str], candidate: &[&str], min_fuzzy_len: usize) -> f64 {
    if original.is_empty() {
        return 1.0;
    }

    let candidate_loose: Vec<String> = candidate.iter().map(|l| loose(l)).collect();

    let matched = original
        .iter()
        .filter(|line| {
            if candidate.contains(line) {
                return true;
            }
            if line.chars().count() > min_fuzzy_len
                && candidate.iter().any(|c| c.contains(*line))
            {
                return true;
            }
            let needle = loose(line);
            !needle.is_empty() && candidate_loose.iter().any(|c| c.contains(&needle))
        })
        .count();

    matched as f64 / original.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: &str = "# Rust ownership\n\nEvery value has a single owner.\nBorrowing lends access without moving.\n\nSee [[Lifetimes]] and [[Traits]].\n#rust #learning\n";

    fn cfg() -> GuardConfig {
        GuardConfig::default()
    }

    #[test]
    fn test_self_identity() {
        assert!(validate(NOTE, NOTE, &cfg()));
        assert_eq!(check(NOTE, NOTE, &cfg()).decision, Decision::Contiguous);
    }

    #[test]
    fn test_empty_candidate_rejected() {
        let report = check(NOTE, "", &cfg());
        assert!(!report.accepted());
        assert_eq!(report.decision, Decision::Truncated);
    }

    #[test]
    fn test_appended_paragraph_accepted() {
        let candidate = format!("{}\nextra paragraph", NOTE);
        assert!(validate(NOTE, &candidate, &cfg()));
    }

    #[test]
    fn test_empty_original_accepts_anything_nonempty() {
        assert!(validate("", "new text", &cfg()));
        assert!(validate("", "", &cfg()));
    }

    #[test]
    fn test_reflowed_blank_lines_still_contiguous() {
        let original = "line one\n\n\nline two\n";
        let candidate = "  line one\nline two  \n\nplus an added section at the end\n";
        assert_eq!(check(original, candidate, &cfg()).decision, Decision::Contiguous);
    }

    #[test]
    fn test_interleaved_additions_pass_line_match() {
        let original = "First idea here.\nSecond idea here.\nThird idea here.\n";
        let candidate = "First idea here.\nA new elaboration of the first idea.\nSecond idea here.\nMore detail.\nThird idea here.\n";
        let report = check(original, candidate, &cfg());
        assert_eq!(report.decision, Decision::LineMatch);
        assert_eq!(report.line_match_ratio, 1.0);
    }

    #[test]
    fn test_containment_match_for_long_lines() {
        let original = "This sentence is long enough to count.\nAnother reasonably long line of text.\n";
        let candidate = "Intro. This sentence is long enough to count. More.\nNew line.\nAnother reasonably long line of text, extended.\n";
        assert!(validate(original, candidate, &cfg()));
    }

    #[test]
    fn test_short_lines_need_loose_match() {
        // Too short for plain containment, so only the loose rule can match it
        assert_eq!(line_match_ratio(&["a-b"], &["xx a b xx"], 10), 0.0);
        assert_eq!(line_match_ratio(&["a-b"], &["xx ab xx"], 10), 1.0);
    }

    #[test]
    fn test_loose_normalization() {
        assert_eq!(loose("  Hello,   *World*!  "), "hello world");
        assert_eq!(loose("--- !!"), "");
    }

    #[test]
    fn test_punctuation_insensitive_match() {
        let original = "Hello, World!\nKeep: this; line.\n";
        let candidate = "**hello world** said the note\nkeep this line\nsomething extra to make it longer\n";
        let report = check(original, candidate, &cfg());
        assert_eq!(report.line_match_ratio, 1.0);
        assert!(report.accepted());
    }

    #[test]
    fn test_dropped_lines_below_threshold_rejected() {
        let original = "alpha one\nbeta two\ngamma three\ndelta four\nepsilon five\n";
        let candidate = "alpha one\nbeta two\ncompletely different text that is long enough to pass length\n";
        let report = check(original, candidate, &cfg());
        assert_eq!(report.decision, Decision::LowLineMatch);
        assert!(report.line_match_ratio < 0.8);
    }

    #[test]
    fn test_missing_link_rejected_regardless_of_ratio() {
        let original = "Intro line stays.\nRelated: [[Alpha]]\n";
        let candidate = "Intro line stays.\nRelated: Alpha (link removed) plus plenty of padding text\n";
        let report = check(original, candidate, &cfg());
        assert_eq!(report.decision, Decision::MarkersLost);
        assert_eq!(report.missing_markers, vec!["[[Alpha]]".to_string()]);
    }

    #[test]
    fn test_longer_candidate_dropping_tag_line_rejected() {
        let original = "Plan the launch.\nShip by Friday.\n#project\n";
        let candidate = "Plan the launch.\nShip by Friday.\nAdded a long explanation about the launch plan and its risks.\n";
        assert!(candidate.len() > original.len());
        let report = check(original, candidate, &cfg());
        assert!(!report.accepted());
        assert!(report.missing_markers.contains(&"#project".to_string()));
    }

    #[test]
    fn test_threshold_is_configurable() {
        let original = "one line\ntwo line\nthree line\nfour line\nfive line\n";
        let candidate = "one line\ntwo line\nthree line\nfour line\nsomething else entirely, quite long\n";
        let strict = GuardConfig {
            min_line_match_ratio: 0.9,
            ..GuardConfig::default()
        };
        assert!(validate(original, candidate, &cfg()));
        assert!(!validate(original, candidate, &strict));
    }
}
