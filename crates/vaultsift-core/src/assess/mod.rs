//! Assessment provider
//!
//! The language model is an external collaborator behind [`LanguageModel`].
//! [`Assessor`] wraps it with retries, prompt construction and defensive
//! reply parsing so the review loop always gets a usable answer.

mod gemini;
mod parse;
mod prompts;
mod retry;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::note::Note;
pub use gemini::GeminiClient;
pub use parse::{parse_assessment, parse_concepts};
pub use retry::RetryPolicy;

/// Lowest and highest assessment score
pub const SCORE_RANGE: (f64, f64) = (0.0, 10.0);

/// Score used when nothing better is known
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Errors from the language model transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("rate limited by provider")]
    RateLimited,

    #[error("provider unavailable (HTTP {status})")]
    Unavailable { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request rejected (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected response envelope: {0}")]
    MalformedEnvelope(String),

    #[error("no API key (set {env_var} or pass --api-key)")]
    MissingApiKey { env_var: String },
}

impl ProviderError {
    /// Worth retrying after a pause
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited
                | ProviderError::Unavailable { .. }
                | ProviderError::Transport(_)
        )
    }
}

/// Text-in, text-out model call
pub trait LanguageModel {
    fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

impl<M: LanguageModel + ?Sized> LanguageModel for &M {
    fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        (**self).generate(prompt)
    }
}

impl<M: LanguageModel + ?Sized> LanguageModel for Box<M> {
    fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        (**self).generate(prompt)
    }
}

/// Closed verdict vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Remove,
    Enhance,
    Keep,
}

impl FromStr for Verdict {
    type Err = String;

    /// Accepts the older `delete` spelling for `remove`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remove" | "delete" => Ok(Verdict::Remove),
            "enhance" | "improve" => Ok(Verdict::Enhance),
            "keep" => Ok(Verdict::Keep),
            other => Err(format!("unknown verdict: {}", other)),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Remove => write!(f, "remove"),
            Verdict::Enhance => write!(f, "enhance"),
            Verdict::Keep => write!(f, "keep"),
        }
    }
}

/// Per-note answer from the provider. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub score: f64,
    pub rationale: String,
    pub verdict: Verdict,
    /// The provider call failed and this is the neutral fallback
    pub failed: bool,
}

impl Assessment {
    pub fn new(score: f64, rationale: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            score: score.clamp(SCORE_RANGE.0, SCORE_RANGE.1),
            rationale: rationale.into(),
            verdict,
            failed: false,
        }
    }

    /// Fallback after the provider could not be reached
    pub fn unavailable(error: &ProviderError) -> Self {
        Self {
            score: NEUTRAL_SCORE,
            rationale: format!("Analysis failed: {}", error),
            verdict: Verdict::Keep,
            failed: true,
        }
    }
}

/// Context blob sent alongside the note text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessContext {
    pub key: String,
    pub title: String,
    pub link_count: usize,
    pub tag_count: usize,
    pub embed_count: usize,
}

impl AssessContext {
    pub fn for_note(note: &Note) -> Self {
        let markers = note.markers();
        Self {
            key: note.key().to_string(),
            title: note.title(),
            link_count: markers.links.len(),
            tag_count: markers.tags.len(),
            embed_count: markers.embeds.len(),
        }
    }
}

/// A concept the model proposed as a standalone note
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConceptDraft {
    pub title: String,
    pub content: String,
}

/// Model access with retries and parsing
pub struct Assessor<M> {
    model: M,
    retry: RetryPolicy,
    interrupt: Option<Arc<AtomicBool>>,
}

impl<M: LanguageModel> Assessor<M> {
    pub fn new(model: M, retry: RetryPolicy) -> Self {
        Self {
            model,
            retry,
            interrupt: None,
        }
    }

    /// Stop retrying as soon as `flag` is raised
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let stop = || {
            self.interrupt
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::SeqCst))
        };
        self.retry.run_until(stop, || self.model.generate(prompt))
    }

    /// Score a note. Never fails: provider errors and unparseable replies
    /// turn into neutral defaults.
    #[tracing::instrument(skip(self, note), fields(key = %note.key()))]
    pub fn assess(&self, note: &Note) -> Assessment {
        if note.is_blank() {
            return Assessment::new(0.0, "Empty file with no content", Verdict::Remove);
        }

        let prompt = prompts::assessment(note, &AssessContext::for_note(note));
        match self.generate(&prompt) {
            Ok(reply) => parse_assessment(&reply),
            Err(e) => {
                tracing::warn!(error = %e, "assessment failed");
                Assessment::unavailable(&e)
            }
        }
    }

    /// Ask for an enriched version of the note. The raw reply is returned;
    /// callers clean and validate it.
    #[tracing::instrument(skip(self, note), fields(key = %note.key()))]
    pub fn enhance(&self, note: &Note) -> Result<String, ProviderError> {
        self.generate(&prompts::enhancement(note))
    }

    /// Ask for atomic concepts contained in the note
    #[tracing::instrument(skip(self, note), fields(key = %note.key()))]
    pub fn extract_concepts(&self, note: &Note) -> Result<Vec<ConceptDraft>, ProviderError> {
        let reply = self.generate(&prompts::concepts(note))?;
        Ok(parse_concepts(&reply))
    }
}


#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::testing::ScriptedModel;
    use super::*;

    fn note(body: &str) -> Note {
        Note::new("ideas/rust.md", PathBuf::from("/v/ideas/rust.md"), body.to_string())
    }

    fn assessor(replies: Vec<Result<String, ProviderError>>) -> Assessor<ScriptedModel> {
        let retry = RetryPolicy {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
        };
        Assessor::new(ScriptedModel::new(replies), retry)
    }

    #[test]
    fn test_verdict_parsing_and_aliases() {
        assert_eq!("Remove".parse::<Verdict>().unwrap(), Verdict::Remove);
        assert_eq!("delete".parse::<Verdict>().unwrap(), Verdict::Remove);
        assert_eq!(" keep ".parse::<Verdict>().unwrap(), Verdict::Keep);
        assert!("archive".parse::<Verdict>().is_err());
        assert_eq!(Verdict::Enhance.to_string(), "enhance");
    }

    #[test]
    fn test_blank_note_skips_provider() {
        let a = assessor(vec![]);
        let result = a.assess(&note("   \n"));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.verdict, Verdict::Remove);
        assert!(a.model.prompts.borrow().is_empty());
    }

    #[test]
    fn test_assess_parses_reply() {
        let a = assessor(vec![Ok(
            r#"{"score": 8, "reasoning": "Useful hub", "recommendation": "keep"}"#.into(),
        )]);
        let result = a.assess(&note("See [[Ownership]] #rust"));
        assert_eq!(result.score, 8.0);
        assert_eq!(result.verdict, Verdict::Keep);
        assert!(!result.failed);

        let prompt = &a.model.prompts.borrow()[0];
        assert!(prompt.contains("ideas/rust.md"));
        assert!(prompt.contains("[[Ownership]]"));
    }

    #[test]
    fn test_transient_errors_retried_then_neutral() {
        let a = assessor(vec![
            Err(ProviderError::RateLimited),
            Err(ProviderError::RateLimited),
            Err(ProviderError::RateLimited),
        ]);
        let result = a.assess(&note("some content"));
        assert!(result.failed);
        assert_eq!(result.verdict, Verdict::Keep);
        assert_eq!(result.score, NEUTRAL_SCORE);
        assert_eq!(a.model.prompts.borrow().len(), 3);
    }

    #[test]
    fn test_retry_recovers() {
        let a = assessor(vec![
            Err(ProviderError::Unavailable { status: 503 }),
            Ok(r#"{"score": 2, "reasoning": "stale", "recommendation": "remove"}"#.into()),
        ]);
        let result = a.assess(&note("old todo list"));
        assert_eq!(result.verdict, Verdict::Remove);
        assert!(!result.failed);
    }

    #[test]
    fn test_interrupt_stops_retries() {
        let flag = Arc::new(AtomicBool::new(true));
        let a = assessor(vec![
            Err(ProviderError::RateLimited),
            Ok(r#"{"score": 9, "reasoning": "fine", "recommendation": "keep"}"#.into()),
        ])
        .with_interrupt(flag);
        let result = a.assess(&note("some content"));
        assert!(result.failed);
        assert_eq!(a.model.prompts.borrow().len(), 1);
    }

    #[test]
    fn test_malformed_reply_defaults_to_enhance() {
        let a = assessor(vec![Ok("I cannot help with that.".into())]);
        let result = a.assess(&note("content"));
        assert_eq!(result.verdict, Verdict::Enhance);
        assert_eq!(result.score, NEUTRAL_SCORE);
        assert!(!result.failed);
    }

    #[test]
    fn test_extract_concepts() {
        let a = assessor(vec![Ok(
            r#"[{"title": "Ownership", "content": "Each value has one owner."}]"#.into(),
        )]);
        let concepts = a.extract_concepts(&note("long note")).unwrap();
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].title, "Ownership");
    }

    #[test]
    fn test_enhance_propagates_permanent_error() {
        let a = assessor(vec![Err(ProviderError::Rejected {
            status: 401,
            body: "bad key".into(),
        })]);
        assert!(a.enhance(&note("content")).is_err());
        assert_eq!(a.model.prompts.borrow().len(), 1);
    }

    #[test]
    fn test_score_clamped() {
        assert_eq!(Assessment::new(42.0, "", Verdict::Keep).score, 10.0);
        assert_eq!(Assessment::new(-3.0, "", Verdict::Keep).score, 0.0);
    }
}
