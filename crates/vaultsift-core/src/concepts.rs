//! Turn extracted concepts into linked notes next to their source

use crate::assess::ConceptDraft;
use crate::error::{Result, VaultError};
use crate::note::Note;
use crate::vault::NoteStore;

const MAX_TITLE_CHARS: usize = 100;

/// Characters that are unsafe in file names on at least one platform
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '#', '^', '[', ']'];

/// Outcome of materializing one batch of concepts
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// Keys of notes written, in draft order
    pub created: Vec<String>,
    /// Titles not written, with the reason
    pub skipped: Vec<(String, String)>,
}

/// Reduce a concept title to something usable as a file stem.
///
/// Returns `None` when nothing printable is left.
pub fn sanitize_title(title: &str) -> Option<String> {
    let cleaned: String = title
        .chars()
        .map(|c| if RESERVED.contains(&c) || c.is_control() { ' ' } else { c })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed
        .trim_start_matches(|c: char| c == '.' || c.is_whitespace())
        .trim_end();
    if trimmed.is_empty() {
        return None;
    }
    let limited: String = trimmed.chars().take(MAX_TITLE_CHARS).collect();
    Some(limited.trim_end().to_string())
}

/// Key for a concept note living beside `source_key`
pub fn concept_key(source_key: &str, stem: &str) -> String {
    match source_key.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}.md", dir, stem),
        None => format!("{}.md", stem),
    }
}

fn render(draft: &ConceptDraft, source_title: &str) -> String {
    format!(
        "{}\n\nSource: [[{}]]\n",
        draft.content.trim_end(),
        source_title
    )
}

/// Write each draft as a new note. Existing notes are never overwritten.
#[tracing::instrument(skip(notes, source, drafts), fields(source = %source.key(), count = drafts.len()))]
pub fn materialize(
    notes: &dyn NoteStore,
    source: &Note,
    drafts: &[ConceptDraft],
) -> Result<Materialized> {
    let source_title = source.title();
    let mut report = Materialized::default();

    for draft in drafts {
        let Some(stem) = sanitize_title(&draft.title) else {
            report
                .skipped
                .push((draft.title.clone(), "title has no usable characters".into()));
            continue;
        };
        if draft.content.trim().is_empty() {
            report.skipped.push((stem, "empty content".into()));
            continue;
        }

        let key = concept_key(source.key(), &stem);
        match notes.create(&key, &render(draft, &source_title)) {
            Ok(()) => report.created.push(key),
            Err(VaultError::AlreadyExists { .. }) => {
                tracing::debug!(key, "concept note exists, skipping");
                report.skipped.push((stem, format!("{} already exists", key)));
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        created = report.created.len(),
        skipped = report.skipped.len(),
        "materialized concepts"
    );
    Ok(report)
}
