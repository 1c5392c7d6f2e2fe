//! Configuration for vaultsift
//!
//! Settings come from `config.toml` in the user config directory and can be
//! overridden per run from the command line.

pub mod global;
pub mod types;

pub use global::GlobalConfig;
pub use types::{GuardConfig, ProviderConfig, ReviewPolicy};

/// Per-run policy overrides supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct PolicyOverrides {
    pub max_note_bytes: Option<u64>,
    pub shallow: Option<bool>,
    pub auto_delete_max_score: Option<f64>,
    pub confirm_delete: Option<bool>,
    pub request_delay_ms: Option<u64>,
}

impl PolicyOverrides {
    /// Apply overrides on top of a base policy.
    ///
    /// Setting an auto-delete score is the opt-in for auto-delete.
    pub fn apply(&self, mut policy: ReviewPolicy) -> ReviewPolicy {
        if let Some(bytes) = self.max_note_bytes {
            policy.max_note_bytes = bytes;
        }
        if let Some(shallow) = self.shallow {
            policy.shallow = shallow;
        }
        if let Some(score) = self.auto_delete_max_score {
            policy.auto_delete = true;
            policy.auto_delete_max_score = score;
        }
        if let Some(confirm) = self.confirm_delete {
            policy.confirm_delete = confirm;
        }
        if let Some(delay) = self.request_delay_ms {
            policy.request_delay_ms = delay;
        }
        policy
    }

    pub fn is_empty(&self) -> bool {
        self.max_note_bytes.is_none()
            && self.shallow.is_none()
            && self.auto_delete_max_score.is_none()
            && self.confirm_delete.is_none()
            && self.request_delay_ms.is_none()
    }
}
