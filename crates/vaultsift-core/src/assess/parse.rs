//! Defensive parsing of model replies
//!
//! Replies are free text that usually, but not always, contain JSON. Each
//! parser tries strict JSON first, then a loose extraction pass, then falls
//! back to a safe default.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::{Assessment, ConceptDraft, Verdict, NEUTRAL_SCORE};

static SCORE: OnceLock<Option<Regex>> = OnceLock::new();
static VERDICT: OnceLock<Option<Regex>> = OnceLock::new();
static REASONING: OnceLock<Option<Regex>> = OnceLock::new();

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .map_err(|e| tracing::warn!(error = %e, pattern, "Failed to compile reply regex"))
            .ok()
    })
    .as_ref()
}

/// Remove a ```json fence if present, otherwise return the trimmed text
pub(crate) fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    let after = after
        .strip_prefix("json")
        .or_else(|| after.strip_prefix("JSON"))
        .unwrap_or(after);
    match after.find("```") {
        Some(end) => after[..end].trim(),
        None => after.trim(),
    }
}

/// First balanced-looking `open ... close` span
fn outer_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

#[derive(Debug, Deserialize)]
struct RawAssessment {
    #[serde(default)]
    score: Option<Value>,
    #[serde(default, alias = "rationale", alias = "reason")]
    reasoning: Option<String>,
    #[serde(default, alias = "verdict", alias = "action")]
    recommendation: Option<String>,
}

fn score_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.split('/').next()?.trim().parse().ok(),
        _ => None,
    }
}

fn from_raw(raw: RawAssessment) -> Option<Assessment> {
    let score = raw.score.as_ref().and_then(score_from);
    let verdict = raw.recommendation.as_deref().and_then(|v| v.parse().ok());
    if score.is_none() && verdict.is_none() {
        return None;
    }
    Some(Assessment::new(
        score.unwrap_or(NEUTRAL_SCORE),
        raw.reasoning.unwrap_or_default(),
        verdict.unwrap_or(Verdict::Enhance),
    ))
}

fn parse_json(text: &str) -> Option<Assessment> {
    serde_json::from_str::<RawAssessment>(text)
        .ok()
        .and_then(from_raw)
}

/// Pull `score: 7`, `"recommendation": "keep"` style fragments out of prose
fn extract_loose(text: &str) -> Option<Assessment> {
    let score = cached(&SCORE, r#"(?i)"?score"?\s*[:=]\s*"?(\d+(?:\.\d+)?)"#)
        .and_then(|re| re.captures(text))
        .and_then(|cap| cap[1].parse::<f64>().ok());
    let verdict = cached(
        &VERDICT,
        r#"(?i)"?(?:recommendation|verdict)"?\s*[:=]\s*"?(remove|delete|enhance|keep)\b"#,
    )
    .and_then(|re| re.captures(text))
    .and_then(|cap| cap[1].parse::<Verdict>().ok());
    let reasoning = cached(&REASONING, r#"(?i)"?(?:reasoning|rationale)"?\s*[:=]\s*"([^"]*)""#)
        .and_then(|re| re.captures(text))
        .map(|cap| cap[1].to_string());

    if score.is_none() && verdict.is_none() {
        return None;
    }
    Some(Assessment::new(
        score.unwrap_or(NEUTRAL_SCORE),
        reasoning.unwrap_or_else(|| "Extracted from a partially malformed reply".to_string()),
        verdict.unwrap_or(Verdict::Enhance),
    ))
}

/// Parse an assessment reply. Unusable replies yield a mid-range score and
/// an `enhance` verdict.
pub fn parse_assessment(reply: &str) -> Assessment {
    let body = strip_code_fence(reply);

    if let Some(assessment) = parse_json(body)
        .or_else(|| outer_span(body, '{', '}').and_then(parse_json))
        .or_else(|| extract_loose(body))
    {
        return assessment;
    }

    tracing::debug!(reply_len = reply.len(), "unparseable assessment reply");
    Assessment::new(
        NEUTRAL_SCORE,
        "Could not parse the model's reply",
        Verdict::Enhance,
    )
}

/// Parse a concept-extraction reply: a JSON array of `{title, content}`.
/// Entries with a blank title or content are dropped; anything unparseable
/// yields an empty list.
pub fn parse_concepts(reply: &str) -> Vec<ConceptDraft> {
    let body = strip_code_fence(reply);

    let parsed = serde_json::from_str::<Vec<ConceptDraft>>(body).ok().or_else(|| {
        outer_span(body, '[', ']').and_then(|span| serde_json::from_str(span).ok())
    });

    match parsed {
        Some(drafts) => drafts
            .into_iter()
            .filter(|d| !d.title.trim().is_empty() && !d.content.trim().is_empty())
            .collect(),
        None => {
            tracing::debug!("unparseable concept reply");
            Vec::new()
        }
    }
}
