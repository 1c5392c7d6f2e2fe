//! Resumable traversal controller
//!
//! Produces the ordered work list for a vault and records every resolution
//! write-through, so an interrupted review resumes exactly where it stopped.
//! When the checkpoint cannot be written the session keeps going in memory.

mod queue;

use std::path::Path;

use crate::checkpoint::{CheckpointStore, LoadOutcome, Resolution, SessionCheckpoint};
use crate::config::{PolicyOverrides, ReviewPolicy};
use crate::error::Result;
use crate::vault::{NoteStore, ScanFilter, ScanReport};
pub use queue::WorkQueue;

/// Whether the latest change reached disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Durability {
    Saved,
    /// This write failed; from now on the session is memory-only
    Degraded(String),
    /// Running without a checkpoint file since an earlier failure
    MemoryOnly,
}

/// How a session began
#[derive(Debug)]
pub struct SessionStart {
    pub checkpoint: SessionCheckpoint,
    /// Continuing a previous checkpoint
    pub resumed: bool,
    /// Reason an existing checkpoint was ignored
    pub discarded: Option<String>,
    pub durability: Durability,
}

#[derive(Debug)]
pub struct Controller {
    store: CheckpointStore,
    durable: bool,
}

impl Controller {
    pub fn new(vault_root: &Path) -> Self {
        Self {
            store: CheckpointStore::for_root(vault_root),
            durable: true,
        }
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    pub fn is_durable(&self) -> bool {
        self.durable
    }

    /// Resume or start a session and persist its initial state.
    ///
    /// Policy precedence: overrides, then the resumed snapshot, then `base`.
    pub fn begin(
        &mut self,
        vault_root: &Path,
        base: ReviewPolicy,
        overrides: &PolicyOverrides,
        fresh: bool,
    ) -> SessionStart {
        let (existing, discarded) = if fresh {
            (None, None)
        } else {
            match self.store.load() {
                LoadOutcome::Loaded(cp) => (Some(cp), None),
                LoadOutcome::Missing => (None, None),
                LoadOutcome::Discarded(reason) => {
                    tracing::warn!(reason, "ignoring checkpoint");
                    (None, Some(reason))
                }
            }
        };

        let resumed = existing.is_some();
        let mut checkpoint = match existing {
            Some(mut cp) => {
                cp.policy = overrides.apply(cp.policy);
                cp.touch();
                cp
            }
            None => SessionCheckpoint::new(vault_root, overrides.apply(base)),
        };
        checkpoint.vault_root = vault_root.to_path_buf();

        tracing::info!(
            resumed,
            finalized = checkpoint.finalized.len(),
            "review session started"
        );

        let durability = self.persist(&checkpoint);
        SessionStart {
            checkpoint,
            resumed,
            discarded,
            durability,
        }
    }

    /// Ordered keys still to review: eligible notes minus finalized ones
    pub fn enumerate(
        &self,
        notes: &dyn NoteStore,
        checkpoint: &SessionCheckpoint,
    ) -> Result<(WorkQueue, ScanReport)> {
        let report = notes.scan(&ScanFilter::from_policy(&checkpoint.policy))?;
        let keys = report
            .keys
            .iter()
            .filter(|k| !checkpoint.is_finalized(k))
            .cloned()
            .collect();
        Ok((WorkQueue::new(keys), report))
    }

    /// Record a resolution and persist it before returning
    pub fn record_resolution(
        &mut self,
        key: &str,
        resolution: Resolution,
        checkpoint: &mut SessionCheckpoint,
    ) -> Durability {
        if !checkpoint.apply(key, resolution) {
            tracing::debug!(key, ?resolution, "resolution already recorded");
        }
        self.persist(checkpoint)
    }

    /// Record notes created by concept extraction
    pub fn record_created(
        &mut self,
        keys: &[String],
        checkpoint: &mut SessionCheckpoint,
    ) -> Durability {
        checkpoint.record_created(keys);
        self.persist(checkpoint)
    }

    /// Queue freshly created notes right after `after_key`, skipping any
    /// that are finalized or already queued.
    pub fn insert_discovered(
        queue: &mut WorkQueue,
        new_keys: &[String],
        after_key: &str,
        checkpoint: &SessionCheckpoint,
    ) -> Vec<String> {
        queue.insert_after(after_key, new_keys, |k| checkpoint.is_finalized(k))
    }

    /// Delete the checkpoint once nothing is left to review.
    ///
    /// Returns true when the review is complete. Never deletes while keys
    /// are pending or were skipped.
    pub fn finalize(&mut self, queue: &WorkQueue) -> Result<bool> {
        if !queue.is_complete() {
            tracing::debug!(
                remaining = queue.remaining(),
                deferred = queue.deferred().len(),
                "review incomplete, keeping checkpoint"
            );
            return Ok(false);
        }
        self.store.remove()?;
        tracing::info!("review complete, checkpoint removed");
        Ok(true)
    }

    /// Write the checkpoint now (best effort)
    pub fn persist(&mut self, checkpoint: &SessionCheckpoint) -> Durability {
        if !self.durable {
            return Durability::MemoryOnly;
        }
        match self.store.save(checkpoint) {
            Ok(()) => Durability::Saved,
            Err(e) => {
                tracing::warn!(error = %e, "checkpoint write failed, continuing in memory");
                self.durable = false;
                Durability::Degraded(e.to_string())
            }
        }
    }

    /// Last write when a session stops early, attempted even after degrading.
    ///
    /// If it fails, the checkpoint left by an earlier write is stale and is
    /// removed so it cannot be resumed.
    pub fn persist_final(&mut self, checkpoint: &SessionCheckpoint) -> Durability {
        match self.store.save(checkpoint) {
            Ok(()) => {
                if !self.durable {
                    tracing::info!("checkpoint written after earlier failures");
                }
                self.durable = true;
                Durability::Saved
            }
            Err(e) => {
                tracing::warn!(error = %e, "final checkpoint write failed");
                self.durable = false;
                if let Err(remove_err) = self.store.remove() {
                    tracing::warn!(error = %remove_err, "could not remove stale checkpoint");
                }
                Durability::Degraded(e.to_string())
            }
        }
    }
}
