//! Structural markers: wiki links, tags and embedded media.
//!
//! These are the parts of a note that other notes (or the vault tooling)
//! depend on, so an AI rewrite must keep every one of them verbatim.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

static WIKI_LINK: OnceLock<Option<Regex>> = OnceLock::new();
static TAG: OnceLock<Option<Regex>> = OnceLock::new();
static EMBED: OnceLock<Option<Regex>> = OnceLock::new();

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, pattern, "Failed to compile marker regex");
            None
        }
    }
}

fn wiki_link_re() -> Option<&'static Regex> {
    WIKI_LINK
        .get_or_init(|| compile(r"\[\[[^\[\]\n]+\]\]"))
        .as_ref()
}

fn tag_re() -> Option<&'static Regex> {
    // A tag needs at least one non-digit so `#42` (issue refs) is not a tag
    TAG.get_or_init(|| compile(r"(?:^|\s)(#[\p{L}\p{N}_/-]*[\p{L}_/-][\p{L}\p{N}_/-]*)"))
        .as_ref()
}

fn embed_re() -> Option<&'static Regex> {
    EMBED
        .get_or_init(|| compile(r"!\[\[[^\[\]\n]+\]\]|!\[[^\]\n]*\]\([^)\n]+\)"))
        .as_ref()
}

/// Markers found in a piece of text, stored as their literal tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers {
    /// `[[Target]]` / `[[Target|alias]]`
    pub links: BTreeSet<String>,
    /// `#tag`, `#nested/tag`
    pub tags: BTreeSet<String>,
    /// `![[image.png]]`, `![alt](path)`
    pub embeds: BTreeSet<String>,
}

impl Markers {
    pub fn extract(text: &str) -> Self {
        let mut markers = Markers::default();

        if let Some(re) = wiki_link_re() {
            markers.links = re
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect();
        }

        if let Some(re) = tag_re() {
            markers.tags = re
                .captures_iter(text)
                .filter_map(|cap| cap.get(1))
                .map(|m| m.as_str().to_string())
                .collect();
        }

        if let Some(re) = embed_re() {
            markers.embeds = re
                .find_iter(text)
                .map(|m| m.as_str().to_string())
                .collect();
        }

        markers
    }

    /// Markers present here but absent from `other`
    pub fn missing_from(&self, other: &Markers) -> Vec<String> {
        self.links
            .difference(&other.links)
            .chain(self.tags.difference(&other.tags))
            .chain(self.embeds.difference(&other.embeds))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.links.len() + self.tags.len() + self.embeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
