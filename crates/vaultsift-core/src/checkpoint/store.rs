use std::fs;
use std::path::{Path, PathBuf};

use super::{SessionCheckpoint, CHECKPOINT_FILE, CHECKPOINT_SCHEMA_VERSION};
use crate::error::{Result, VaultError};
use crate::vault::write_atomic;

/// What was found on disk for a vault
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// No checkpoint file
    Missing,
    Loaded(SessionCheckpoint),
    /// A file exists but cannot be trusted; it is ignored wholesale
    Discarded(String),
}

/// Owns the checkpoint file of one vault. All writes go through here.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    vault_root: PathBuf,
    path: PathBuf,
}

impl CheckpointStore {
    /// Checkpoint location is derived from the (canonical) vault root
    pub fn for_root(vault_root: &Path) -> Self {
        Self {
            vault_root: vault_root.to_path_buf(),
            path: vault_root.join(CHECKPOINT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the checkpoint, failing closed on anything suspicious
    pub fn load(&self) -> LoadOutcome {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return LoadOutcome::Missing,
            Err(e) => return LoadOutcome::Discarded(format!("unreadable: {}", e)),
        };

        let checkpoint: SessionCheckpoint = match serde_json::from_str(&content) {
            Ok(cp) => cp,
            Err(e) => return LoadOutcome::Discarded(format!("corrupt: {}", e)),
        };

        if checkpoint.schema_version != CHECKPOINT_SCHEMA_VERSION {
            return LoadOutcome::Discarded(format!(
                "schema version {} (expected {})",
                checkpoint.schema_version, CHECKPOINT_SCHEMA_VERSION
            ));
        }

        if checkpoint.vault_root != self.vault_root {
            return LoadOutcome::Discarded(format!(
                "belongs to a different vault ({})",
                checkpoint.vault_root.display()
            ));
        }

        LoadOutcome::Loaded(checkpoint)
    }

    /// Atomically replace the checkpoint file
    pub fn save(&self, checkpoint: &SessionCheckpoint) -> Result<()> {
        let json = serde_json::to_string_pretty(checkpoint)?;
        write_atomic(&self.path, &json)
            .map_err(|e| VaultError::io_operation("write checkpoint", self.path.display(), e))?;
        tracing::debug!(
            path = %self.path.display(),
            finalized = checkpoint.finalized.len(),
            "checkpoint saved"
        );
        Ok(())
    }

    /// Delete the checkpoint file. Returns whether one existed.
    pub fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(VaultError::io_operation(
                "remove checkpoint",
                self.path.display(),
                e,
            )),
        }
    }
}
