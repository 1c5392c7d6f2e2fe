//! Session checkpoint: the persisted progress of one review over one vault
//!
//! Stored as `.vaultsift-progress.json` inside the vault root. The file is
//! rewritten whole after every resolution and removed once the review of the
//! vault is complete.

mod store;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ReviewPolicy;
pub use store::{CheckpointStore, LoadOutcome};

/// Fixed hidden file name inside the vault root
pub const CHECKPOINT_FILE: &str = ".vaultsift-progress.json";

/// Bumped whenever the on-disk layout changes; other versions are discarded
pub const CHECKPOINT_SCHEMA_VERSION: u32 = 1;

/// How a note left the review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Kept,
    Deleted,
    /// Body replaced by a validated rewrite. Not terminal: the note still
    /// has to be kept or deleted.
    Enhanced,
}

impl Resolution {
    pub fn is_terminal(self) -> bool {
        matches!(self, Resolution::Kept | Resolution::Deleted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCheckpoint {
    pub schema_version: u32,
    /// Canonical vault root this checkpoint belongs to
    pub vault_root: PathBuf,
    pub session_started: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// Keys that will never be offered again in this review
    #[serde(default)]
    pub finalized: BTreeSet<String>,
    #[serde(default)]
    pub kept: Vec<String>,
    #[serde(default)]
    pub deleted: Vec<String>,
    #[serde(default)]
    pub enhanced: Vec<String>,
    /// Notes created by concept extraction
    #[serde(default)]
    pub created: Vec<String>,
    /// Created notes that were themselves reviewed to completion
    #[serde(default)]
    pub created_finalized: Vec<String>,
    /// Policy the session runs under
    pub policy: ReviewPolicy,
}

impl SessionCheckpoint {
    pub fn new(vault_root: &Path, policy: ReviewPolicy) -> Self {
        let now = Utc::now();
        Self {
            schema_version: CHECKPOINT_SCHEMA_VERSION,
            vault_root: vault_root.to_path_buf(),
            session_started: now,
            last_updated: now,
            finalized: BTreeSet::new(),
            kept: Vec::new(),
            deleted: Vec::new(),
            enhanced: Vec::new(),
            created: Vec::new(),
            created_finalized: Vec::new(),
            policy,
        }
    }

    pub fn is_finalized(&self, key: &str) -> bool {
        self.finalized.contains(key)
    }

    /// Apply a resolution in memory. Returns false when it was a no-op.
    ///
    /// A finalized key is never resolved again, which keeps the finalized
    /// set monotonic and `kept`/`deleted` disjoint.
    pub fn apply(&mut self, key: &str, resolution: Resolution) -> bool {
        if self.is_finalized(key) {
            return false;
        }

        match resolution {
            Resolution::Kept => self.kept.push(key.to_string()),
            Resolution::Deleted => self.deleted.push(key.to_string()),
            Resolution::Enhanced => {
                if self.enhanced.iter().any(|k| k == key) {
                    return false;
                }
                self.enhanced.push(key.to_string());
            }
        }

        if resolution.is_terminal() {
            self.finalized.insert(key.to_string());
            if self.created.iter().any(|k| k == key) {
                self.created_finalized.push(key.to_string());
            }
        }

        self.touch();
        true
    }

    /// Remember notes created during the session
    pub fn record_created(&mut self, keys: &[String]) {
        for key in keys {
            if !self.created.contains(key) {
                self.created.push(key.clone());
            }
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkpoint() -> SessionCheckpoint {
        SessionCheckpoint::new(Path::new("/vault"), ReviewPolicy::default())
    }

    #[test]
    fn test_kept_finalizes() {
        let mut cp = checkpoint();
        assert!(cp.apply("a.md", Resolution::Kept));
        assert!(cp.is_finalized("a.md"));
        assert_eq!(cp.kept, vec!["a.md"]);
    }

    #[test]
    fn test_kept_and_deleted_exclusive() {
        let mut cp = checkpoint();
        cp.apply("a.md", Resolution::Kept);
        assert!(!cp.apply("a.md", Resolution::Deleted));
        assert!(cp.deleted.is_empty());
        assert_eq!(cp.kept.len(), 1);
    }

    #[test]
    fn test_enhanced_is_not_terminal() {
        let mut cp = checkpoint();
        assert!(cp.apply("a.md", Resolution::Enhanced));
        assert!(!cp.is_finalized("a.md"));
        assert!(!cp.apply("a.md", Resolution::Enhanced));

        assert!(cp.apply("a.md", Resolution::Deleted));
        assert_eq!(cp.enhanced, vec!["a.md"]);
        assert_eq!(cp.deleted, vec!["a.md"]);
        assert!(cp.is_finalized("a.md"));
    }

    #[test]
    fn test_finalized_is_monotonic() {
        let mut cp = checkpoint();
        let keys = ["c.md", "a.md", "b.md"];
        let mut previous = 0;
        for (i, key) in keys.iter().enumerate() {
            let resolution = if i % 2 == 0 {
                Resolution::Kept
            } else {
                Resolution::Deleted
            };
            cp.apply(key, resolution);
            cp.apply(key, Resolution::Kept);
            assert!(cp.finalized.len() > previous);
            previous = cp.finalized.len();
        }
        assert_eq!(previous, 3);
    }

    #[test]
    fn test_created_then_finalized() {
        let mut cp = checkpoint();
        cp.record_created(&["new.md".to_string(), "new.md".to_string()]);
        assert_eq!(cp.created, vec!["new.md"]);

        cp.apply("new.md", Resolution::Kept);
        assert_eq!(cp.created_finalized, vec!["new.md"]);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut cp = checkpoint();
        cp.apply("a.md", Resolution::Kept);
        let json = serde_json::to_value(&cp).unwrap();

        assert_eq!(json["schema_version"], CHECKPOINT_SCHEMA_VERSION);
        assert!(json["session_started"].is_string());
        assert!(json["last_updated"].is_string());
        assert_eq!(json["finalized"][0], "a.md");
        assert_eq!(json["kept"][0], "a.md");
        assert!(json["policy"].is_object());
    }
}
