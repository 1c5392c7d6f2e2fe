//! Configuration type definitions

use serde::{Deserialize, Serialize};

/// Default Gemini REST base URL
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model used for assessment, enhancement and concept extraction
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";

/// Environment variable holding the API key unless configured otherwise
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Language model provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the generateContent API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable to read the API key from
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds (clamped to 5..=300)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retries after the first attempt for transient errors (clamped to 0..=10)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff delay
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Backoff ceiling
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_seconds: default_timeout_seconds(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl ProviderConfig {
    /// Clamp numeric settings into their supported ranges
    pub fn normalized(mut self) -> Self {
        self.timeout_seconds = self.timeout_seconds.clamp(5, 300);
        self.max_retries = self.max_retries.min(10);
        self.initial_backoff_ms = self.initial_backoff_ms.max(1);
        self.max_backoff_ms = self.max_backoff_ms.max(self.initial_backoff_ms);
        self
    }
}

/// Operator-configurable review policy.
///
/// A snapshot of this is stored in every checkpoint so a resumed session
/// continues under the same thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPolicy {
    /// Notes larger than this many bytes are not offered
    #[serde(default = "default_max_note_bytes")]
    pub max_note_bytes: u64,

    /// Only consider notes directly inside the vault root
    #[serde(default)]
    pub shallow: bool,

    /// Delete low-scoring notes without prompting (explicit opt-in)
    #[serde(default)]
    pub auto_delete: bool,

    /// Highest score that still counts as "low" for `auto_delete`
    #[serde(default = "default_auto_delete_max_score")]
    pub auto_delete_max_score: f64,

    /// Ask y/N before deleting a note on `d`
    #[serde(default = "default_true")]
    pub confirm_delete: bool,

    /// Pause between provider calls
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Characters of the note shown in the preview
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Preservation guard thresholds
    #[serde(default)]
    pub guard: GuardConfig,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            max_note_bytes: default_max_note_bytes(),
            shallow: false,
            auto_delete: false,
            auto_delete_max_score: default_auto_delete_max_score(),
            confirm_delete: true,
            request_delay_ms: default_request_delay_ms(),
            preview_chars: default_preview_chars(),
            guard: GuardConfig::default(),
        }
    }
}

/// Heuristic constants used by the preservation guard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Fraction of original lines that must be found in the candidate
    #[serde(default = "default_min_line_match_ratio")]
    pub min_line_match_ratio: f64,

    /// Original lines shorter than this only match exactly or fuzzily,
    /// never by plain containment
    #[serde(default = "default_min_fuzzy_line_len")]
    pub min_fuzzy_line_len: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            min_line_match_ratio: default_min_line_match_ratio(),
            min_fuzzy_line_len: default_min_fuzzy_line_len(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_max_note_bytes() -> u64 {
    50_000
}

fn default_auto_delete_max_score() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_request_delay_ms() -> u64 {
    1_000
}

fn default_preview_chars() -> usize {
    800
}

fn default_min_line_match_ratio() -> f64 {
    0.8
}

fn default_min_fuzzy_line_len() -> usize {
    10
}
