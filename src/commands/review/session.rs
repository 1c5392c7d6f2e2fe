//! The interactive review loop

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use vaultsift_core::assess::{Assessor, LanguageModel};
use vaultsift_core::checkpoint::{Resolution, SessionCheckpoint};
use vaultsift_core::concepts;
use vaultsift_core::error::{Result, VaultError};
use vaultsift_core::guard::{self, clean_response};
use vaultsift_core::note::Note;
use vaultsift_core::traversal::{Controller, Durability, WorkQueue};
use vaultsift_core::vault::NoteStore;

use super::display;
use super::keys::{Action, KeySource};

/// What happened during this run
#[derive(Debug, Default, Clone, Serialize)]
pub struct Summary {
    pub kept: Vec<String>,
    pub deleted: Vec<String>,
    pub enhanced: Vec<String>,
    pub created: Vec<String>,
    pub skipped: Vec<String>,
    pub failed_assessments: usize,
    /// Every note was resolved and the checkpoint removed
    pub complete: bool,
    pub interrupted: bool,
    /// Progress reached disk for the whole run
    pub durable: bool,
}

enum Step {
    Next,
    Quit,
}

pub struct ReviewSession<'a, M, K> {
    notes: &'a dyn NoteStore,
    assessor: &'a Assessor<M>,
    keys: K,
    out: &'a mut dyn Write,
    controller: Controller,
    checkpoint: SessionCheckpoint,
    queue: WorkQueue,
    interrupt: Arc<AtomicBool>,
    summary: Summary,
    last_call: Option<Instant>,
}

impl<'a, M: LanguageModel, K: KeySource> ReviewSession<'a, M, K> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        notes: &'a dyn NoteStore,
        assessor: &'a Assessor<M>,
        keys: K,
        out: &'a mut dyn Write,
        controller: Controller,
        checkpoint: SessionCheckpoint,
        queue: WorkQueue,
        interrupt: Arc<AtomicBool>,
    ) -> Self {
        Self {
            notes,
            assessor,
            keys,
            out,
            controller,
            checkpoint,
            queue,
            interrupt,
            summary: Summary::default(),
            last_call: None,
        }
    }

    /// Review notes until the queue is exhausted, the operator quits or an
    /// interrupt arrives.
    pub fn run(mut self) -> Result<Summary> {
        let mut stopped = false;
        loop {
            if self.interrupted() {
                self.summary.interrupted = true;
                stopped = true;
                break;
            }
            let Some(key) = self.queue.next_key() else {
                break;
            };
            if self.checkpoint.is_finalized(&key) {
                continue;
            }

            let note = match self.notes.read(&key) {
                Ok(note) => note,
                Err(VaultError::NoteNotFound { .. }) => {
                    tracing::info!(key, "note disappeared, skipping");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(key, error = %e, "cannot read note");
                    display::warning(self.out, &format!("cannot read {}: {}", key, e))?;
                    self.queue.defer(&key);
                    self.summary.skipped.push(key);
                    continue;
                }
            };

            if let Step::Quit = self.review(note)? {
                stopped = true;
                break;
            }
        }

        if !stopped {
            self.summary.complete = self.controller.finalize(&self.queue)?;
        }
        if !self.summary.complete {
            self.checkpoint.touch();
            if let Durability::Degraded(reason) = self.controller.persist_final(&self.checkpoint) {
                display::warning(self.out, &format!("could not save progress ({})", reason))?;
            }
        }
        self.summary.durable = self.controller.is_durable();
        Ok(self.summary)
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    /// Space provider calls by the configured delay
    fn pace(&mut self) {
        let delay = Duration::from_millis(self.checkpoint.policy.request_delay_ms);
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < delay {
                thread::sleep(delay - elapsed);
            }
        }
        self.last_call = Some(Instant::now());
    }

    fn review(&mut self, note: Note) -> Result<Step> {
        display::header(self.out, self.queue.position(), self.queue.total(), &note)?;

        if !note.is_blank() {
            self.pace();
        }
        let assessment = self.assessor.assess(&note);
        if assessment.failed {
            self.summary.failed_assessments += 1;
        }
        display::assessment(self.out, &assessment)?;
        display::preview(self.out, &note.body, self.checkpoint.policy.preview_chars)?;

        let policy = &self.checkpoint.policy;
        if policy.auto_delete && !assessment.failed && assessment.score <= policy.auto_delete_max_score
        {
            let message = format!(
                "Auto-deleting (score {:.1} <= {:.1})",
                assessment.score, policy.auto_delete_max_score
            );
            display::notice(self.out, &message)?;
            if self.delete(&note)? {
                return Ok(Step::Next);
            }
        }

        self.decide(note)
    }

    /// Prompt until the note is resolved, skipped, or the operator quits
    fn decide(&mut self, mut note: Note) -> Result<Step> {
        let key = note.key().to_string();
        loop {
            if self.interrupted() {
                self.summary.interrupted = true;
                return Ok(Step::Quit);
            }
            display::menu(self.out)?;
            let action = self.keys.next_action()?;
            writeln!(self.out)?;
            if self.interrupted() {
                continue;
            }

            match action {
                Action::Keep => {
                    self.resolve(&key, Resolution::Kept)?;
                    self.summary.kept.push(key);
                    return Ok(Step::Next);
                }
                Action::Delete => {
                    if self.checkpoint.policy.confirm_delete
                        && !self.keys.confirm(&format!("Delete {}? [y/N] ", key))?
                    {
                        display::notice(self.out, "Not deleted.")?;
                        continue;
                    }
                    if self.delete(&note)? {
                        return Ok(Step::Next);
                    }
                }
                Action::View => display::full(self.out, &note.body)?,
                Action::Enhance => self.enhance(&mut note)?,
                Action::Concepts => self.extract(&note)?,
                Action::Skip => {
                    self.queue.defer(&key);
                    self.summary.skipped.push(key);
                    return Ok(Step::Next);
                }
                Action::Quit => return Ok(Step::Quit),
                Action::Unknown(c) => {
                    display::notice(self.out, &format!("Unknown key '{}'", c.escape_default()))?
                }
            }
        }
    }

    /// Record a resolution, warning once if the checkpoint stops persisting
    fn resolve(&mut self, key: &str, resolution: Resolution) -> Result<()> {
        let durability = self
            .controller
            .record_resolution(key, resolution, &mut self.checkpoint);
        self.report(durability)
    }

    fn report(&mut self, durability: Durability) -> Result<()> {
        if let Durability::Degraded(reason) = durability {
            display::warning(
                self.out,
                &format!("progress can no longer be saved ({}); continuing", reason),
            )?;
        }
        Ok(())
    }

    /// Returns false when the file could not be removed
    fn delete(&mut self, note: &Note) -> Result<bool> {
        let key = note.key().to_string();
        if let Err(e) = self.notes.delete(&key) {
            tracing::warn!(key, error = %e, "delete failed");
            display::warning(self.out, &format!("could not delete {}: {}", key, e))?;
            return Ok(false);
        }
        self.resolve(&key, Resolution::Deleted)?;
        display::notice(self.out, &format!("Deleted {}", key))?;
        self.summary.deleted.push(key);
        Ok(true)
    }

    /// Replace the body only when the guard accepts the rewrite
    fn enhance(&mut self, note: &mut Note) -> Result<()> {
        display::notice(self.out, "Enhancing...")?;
        self.pace();
        let reply = match self.assessor.enhance(note) {
            Ok(reply) => reply,
            Err(e) => {
                display::warning(self.out, &format!("enhancement failed: {}", e))?;
                return Ok(());
            }
        };

        let candidate = clean_response(&reply);
        let report = guard::check(&note.body, &candidate, &self.checkpoint.policy.guard);
        if !report.accepted() {
            tracing::info!(key = note.key(), decision = ?report.decision, "enhancement rejected");
            display::rejected(self.out, &report)?;
            return Ok(());
        }

        let key = note.key().to_string();
        if let Err(e) = self.notes.write(&key, &candidate) {
            display::warning(self.out, &format!("could not save {}: {}", key, e))?;
            return Ok(());
        }
        note.body = candidate;
        self.resolve(&key, Resolution::Enhanced)?;
        if !self.summary.enhanced.contains(&key) {
            self.summary.enhanced.push(key);
        }

        display::enhanced(self.out, &report)?;
        display::preview(self.out, &note.body, self.checkpoint.policy.preview_chars)?;
        Ok(())
    }

    /// Materialize concepts and queue them right after this note
    fn extract(&mut self, note: &Note) -> Result<()> {
        display::notice(self.out, "Extracting concepts...")?;
        self.pace();
        let drafts = match self.assessor.extract_concepts(note) {
            Ok(drafts) => drafts,
            Err(e) => {
                display::warning(self.out, &format!("concept extraction failed: {}", e))?;
                return Ok(());
            }
        };
        if drafts.is_empty() {
            display::notice(self.out, "No concepts found.")?;
            return Ok(());
        }

        let report = match concepts::materialize(self.notes, note, &drafts) {
            Ok(report) => report,
            Err(e) => {
                display::warning(self.out, &format!("could not create notes: {}", e))?;
                return Ok(());
            }
        };

        if !report.created.is_empty() {
            let durability = self
                .controller
                .record_created(&report.created, &mut self.checkpoint);
            self.report(durability)?;
            let inserted = Controller::insert_discovered(
                &mut self.queue,
                &report.created,
                note.key(),
                &self.checkpoint,
            );
            tracing::debug!(inserted = inserted.len(), "queued new notes");
            self.summary.created.extend(report.created.iter().cloned());
        }
        display::concepts(self.out, &report)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fs;
    use std::io::Cursor;

    use tempfile::{tempdir, TempDir};
    use vaultsift_core::assess::{ProviderError, RetryPolicy};
    use vaultsift_core::checkpoint::{CheckpointStore, LoadOutcome};
    use vaultsift_core::config::{PolicyOverrides, ReviewPolicy};
    use vaultsift_core::vault::FsVault;

    use super::*;
    use crate::commands::review::keys::LineKeys;

    struct ScriptedModel {
        replies: RefCell<VecDeque<std::result::Result<String, ProviderError>>>,
    }

    impl LanguageModel for ScriptedModel {
        fn generate(&self, _prompt: &str) -> std::result::Result<String, ProviderError> {
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::Transport("script exhausted".into())))
        }
    }

    fn scored(score: u32, recommendation: &str) -> std::result::Result<String, ProviderError> {
        Ok(format!(
            r#"{{"score": {}, "reasoning": "test", "recommendation": "{}"}}"#,
            score, recommendation
        ))
    }

    fn vault_with(files: &[(&str, &str)]) -> (TempDir, FsVault) {
        let dir = tempdir().unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let vault = FsVault::open(dir.path()).unwrap();
        (dir, vault)
    }

    fn quiet_policy() -> ReviewPolicy {
        ReviewPolicy {
            request_delay_ms: 0,
            ..ReviewPolicy::default()
        }
    }

    fn run_with(
        vault: &FsVault,
        policy: ReviewPolicy,
        replies: Vec<std::result::Result<String, ProviderError>>,
        input: &str,
        interrupted: bool,
    ) -> (Summary, String) {
        let mut controller = Controller::new(vault.root());
        let start = controller.begin(vault.root(), policy, &PolicyOverrides::default(), false);
        let (queue, _) = controller.enumerate(vault, &start.checkpoint).unwrap();
        let model = ScriptedModel {
            replies: RefCell::new(replies.into()),
        };
        let retry = RetryPolicy {
            max_retries: 0,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
        };
        let assessor = Assessor::new(model, retry);
        let mut out = Vec::new();
        let summary = ReviewSession::new(
            vault,
            &assessor,
            LineKeys::new(Cursor::new(input.to_string())),
            &mut out,
            controller,
            start.checkpoint,
            queue,
            Arc::new(AtomicBool::new(interrupted)),
        )
        .run()
        .unwrap();
        (summary, String::from_utf8_lossy(&out).into_owned())
    }

    fn run(
        vault: &FsVault,
        replies: Vec<std::result::Result<String, ProviderError>>,
        input: &str,
    ) -> (Summary, String) {
        run_with(vault, quiet_policy(), replies, input, false)
    }

    fn saved(vault: &FsVault) -> SessionCheckpoint {
        match CheckpointStore::for_root(vault.root()).load() {
            LoadOutcome::Loaded(cp) => cp,
            other => panic!("expected a checkpoint, got {:?}", other),
        }
    }

    #[test]
    fn test_keep_delete_skip_then_resume() {
        let (dir, vault) = vault_with(&[
            ("a.md", "alpha note"),
            ("b.md", "beta note"),
            ("c.md", "gamma note"),
        ]);

        let (summary, _) = run(
            &vault,
            vec![scored(8, "keep"), scored(1, "remove"), scored(5, "enhance")],
            "k\nd\ny\ns\n",
        );
        assert_eq!(summary.kept, vec!["a.md"]);
        assert_eq!(summary.deleted, vec!["b.md"]);
        assert_eq!(summary.skipped, vec!["c.md"]);
        assert!(!summary.complete);
        assert!(!dir.path().join("b.md").exists());

        let cp = saved(&vault);
        assert!(cp.is_finalized("a.md"));
        assert!(cp.is_finalized("b.md"));
        assert!(!cp.is_finalized("c.md"));

        // Only the skipped note comes back
        let (summary, _) = run(&vault, vec![scored(6, "keep")], "\n");
        assert_eq!(summary.kept, vec!["c.md"]);
        assert!(summary.complete);
        assert!(!CheckpointStore::for_root(vault.root()).exists());
    }

    #[test]
    fn test_quit_leaves_current_note_pending() {
        let (_dir, vault) = vault_with(&[("a.md", "alpha"), ("b.md", "beta")]);

        let (summary, _) = run(&vault, vec![scored(7, "keep")], "q\n");
        assert!(summary.kept.is_empty());
        assert!(!summary.complete);
        assert!(saved(&vault).finalized.is_empty());

        let (summary, _) = run(&vault, vec![scored(7, "keep"), scored(7, "keep")], "k\nk\n");
        assert_eq!(summary.kept, vec!["a.md", "b.md"]);
        assert!(summary.complete);
    }

    #[test]
    fn test_end_of_input_quits() {
        let (_dir, vault) = vault_with(&[("a.md", "alpha")]);
        let (summary, _) = run(&vault, vec![scored(7, "keep")], "");
        assert!(!summary.complete);
        assert!(CheckpointStore::for_root(vault.root()).exists());
    }

    #[test]
    fn test_declined_delete_keeps_file() {
        let (dir, vault) = vault_with(&[("a.md", "alpha")]);
        let (summary, out) = run(&vault, vec![scored(1, "remove")], "d\nn\nk\n");
        assert!(dir.path().join("a.md").exists());
        assert_eq!(summary.kept, vec!["a.md"]);
        assert!(summary.deleted.is_empty());
        assert!(out.contains("Not deleted."));
    }

    #[test]
    fn test_accepted_enhancement_is_saved() {
        let original = "# Borrowing\n\nReferences must never outlive their owner.\n";
        let (dir, vault) = vault_with(&[("a.md", original)]);
        let rewrite = format!("{}\nMutable and shared borrows cannot overlap.\n", original);

        let (summary, out) = run(&vault, vec![scored(5, "enhance"), Ok(rewrite)], "e\nk\n");

        let body = fs::read_to_string(dir.path().join("a.md")).unwrap();
        assert!(body.starts_with("# Borrowing"));
        assert!(body.contains("cannot overlap"));
        assert_eq!(summary.enhanced, vec!["a.md"]);
        assert_eq!(summary.kept, vec!["a.md"]);
        assert!(out.contains("Enhanced and saved"));
    }

    #[test]
    fn test_rejected_enhancement_leaves_note_untouched() {
        let original = "# Borrowing\n\nReferences must never outlive their owner. See [[Lifetimes]].\n";
        let (dir, vault) = vault_with(&[("a.md", original)]);

        let (summary, out) = run(
            &vault,
            vec![scored(5, "enhance"), Ok("Borrowing is neat.".into())],
            "e\nk\n",
        );

        assert_eq!(fs::read_to_string(dir.path().join("a.md")).unwrap(), original);
        assert!(summary.enhanced.is_empty());
        assert!(out.contains("Enhancement rejected"));
    }

    #[test]
    fn test_failed_enhancement_call_leaves_note_untouched() {
        let (dir, vault) = vault_with(&[("a.md", "alpha")]);
        let (summary, out) = run(
            &vault,
            vec![
                scored(5, "enhance"),
                Err(ProviderError::Rejected {
                    status: 400,
                    body: "bad".into(),
                }),
            ],
            "e\nk\n",
        );
        assert_eq!(fs::read_to_string(dir.path().join("a.md")).unwrap(), "alpha");
        assert!(summary.enhanced.is_empty());
        assert!(out.contains("enhancement failed"));
    }

    #[test]
    fn test_concepts_are_created_and_reviewed_next() {
        let (dir, vault) = vault_with(&[
            ("a.md", "Rust notes about ownership and borrowing"),
            ("z.md", "zeta"),
        ]);

        let (summary, _) = run(
            &vault,
            vec![
                scored(6, "keep"),
                Ok(r#"[{"title": "Ownership", "content": "Each value has one owner."}]"#.into()),
                scored(8, "keep"),
                scored(4, "keep"),
            ],
            "c\nk\nk\nk\n",
        );

        assert_eq!(summary.created, vec!["Ownership.md"]);
        assert_eq!(summary.kept, vec!["a.md", "Ownership.md", "z.md"]);
        assert!(summary.complete);
        let body = fs::read_to_string(dir.path().join("Ownership.md")).unwrap();
        assert!(body.contains("Source: [[a]]"));
    }

    #[test]
    fn test_created_notes_tracked_in_checkpoint() {
        let (_dir, vault) = vault_with(&[("a.md", "Rust notes about ownership")]);

        run(
            &vault,
            vec![
                scored(6, "keep"),
                Ok(r#"[{"title": "Ownership", "content": "One owner."}]"#.into()),
                scored(8, "keep"),
            ],
            "c\nk\nq\n",
        );

        let cp = saved(&vault);
        assert_eq!(cp.created, vec!["Ownership.md"]);
        assert!(cp.created_finalized.is_empty());
        assert!(cp.is_finalized("a.md"));
    }

    #[test]
    fn test_auto_delete_only_when_opted_in_and_assessed() {
        let (dir, vault) = vault_with(&[("a.md", "junk"), ("b.md", "maybe junk")]);
        let policy = ReviewPolicy {
            auto_delete: true,
            auto_delete_max_score: 2.0,
            ..quiet_policy()
        };

        let (summary, _) = run_with(
            &vault,
            policy,
            vec![
                scored(1, "remove"),
                Err(ProviderError::Rejected {
                    status: 403,
                    body: "denied".into(),
                }),
            ],
            "k\n",
            false,
        );

        assert!(!dir.path().join("a.md").exists());
        assert!(dir.path().join("b.md").exists());
        assert_eq!(summary.deleted, vec!["a.md"]);
        assert_eq!(summary.kept, vec!["b.md"]);
        assert_eq!(summary.failed_assessments, 1);
    }

    #[test]
    fn test_interrupt_stops_before_next_note() {
        let (_dir, vault) = vault_with(&[("a.md", "alpha")]);
        let (summary, _) = run_with(&vault, quiet_policy(), vec![], "k\n", true);
        assert!(summary.interrupted);
        assert!(summary.kept.is_empty());
        assert!(CheckpointStore::for_root(vault.root()).exists());
    }

    /// Scripted keys that clear a blocked checkpoint path before quitting
    struct ClearBeforeQuit {
        actions: VecDeque<Action>,
        blocked: std::path::PathBuf,
    }

    impl KeySource for ClearBeforeQuit {
        fn next_action(&mut self) -> std::io::Result<Action> {
            let action = self.actions.pop_front().unwrap_or(Action::Quit);
            if action == Action::Quit && self.blocked.is_dir() {
                fs::remove_dir_all(&self.blocked)?;
            }
            Ok(action)
        }

        fn confirm(&mut self, _prompt: &str) -> std::io::Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn test_quit_writes_checkpoint_after_earlier_failure() {
        let (_dir, vault) = vault_with(&[("a.md", "alpha"), ("b.md", "beta"), ("c.md", "gamma")]);
        let mut controller = Controller::new(vault.root());
        let start = controller.begin(vault.root(), quiet_policy(), &PolicyOverrides::default(), false);
        let (queue, _) = controller.enumerate(&vault, &start.checkpoint).unwrap();

        let blocked = controller.store().path().to_path_buf();
        fs::remove_file(&blocked).unwrap();
        fs::create_dir(&blocked).unwrap();
        fs::write(blocked.join("occupied"), "x").unwrap();

        let model = ScriptedModel {
            replies: RefCell::new(vec![scored(7, "keep"), scored(7, "keep")].into()),
        };
        let retry = RetryPolicy {
            max_retries: 0,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(1),
        };
        let assessor = Assessor::new(model, retry);
        let keys = ClearBeforeQuit {
            actions: VecDeque::from([Action::Keep, Action::Quit]),
            blocked,
        };
        let mut out = Vec::new();
        let summary = ReviewSession::new(
            &vault,
            &assessor,
            keys,
            &mut out,
            controller,
            start.checkpoint,
            queue,
            Arc::new(AtomicBool::new(false)),
        )
        .run()
        .unwrap();

        assert_eq!(summary.kept, vec!["a.md"]);
        assert!(summary.durable);
        let cp = saved(&vault);
        assert!(cp.is_finalized("a.md"));
        assert!(!cp.is_finalized("b.md"));
    }

    #[test]
    fn test_unknown_key_reprompts() {
        let (_dir, vault) = vault_with(&[("a.md", "alpha")]);
        let (summary, out) = run(&vault, vec![scored(7, "keep")], "x\nv\nk\n");
        assert!(out.contains("Unknown key 'x'"));
        assert_eq!(summary.kept, vec!["a.md"]);
    }
}
