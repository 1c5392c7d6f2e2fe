//! Note model
//!
//! A note is one markdown file identified by its path relative to the vault
//! root. The key is stable for the whole session; the body may be rewritten.

mod frontmatter;
pub mod markers;

use std::path::{Path, PathBuf};

pub use markers::Markers;

/// A markdown note loaded from the vault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Relative path with `/` separators, e.g. `projects/alpha.md`
    key: String,
    /// Absolute path on disk
    pub path: PathBuf,
    /// Full file content
    pub body: String,
}

impl Note {
    pub fn new(key: impl Into<String>, path: PathBuf, body: String) -> Self {
        Self {
            key: key.into(),
            path,
            body,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Size of the body in bytes
    pub fn size(&self) -> usize {
        self.body.len()
    }

    /// Frontmatter `title:` when present, otherwise the file stem
    pub fn title(&self) -> String {
        frontmatter::title(&self.body).unwrap_or_else(|| title_from_key(&self.key))
    }

    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Structural markers (links, tags, embeds) found in the body
    pub fn markers(&self) -> Markers {
        Markers::extract(&self.body)
    }
}

/// Derive a display title from a note key (`dir/My Note.md` -> `My Note`)
pub fn title_from_key(key: &str) -> String {
    Path::new(key)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| key.to_string())
}
