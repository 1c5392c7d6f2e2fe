//! Vault enumeration with size and depth filters

use std::time::Instant;

use walkdir::{DirEntry, WalkDir};

use super::FsVault;
use crate::config::ReviewPolicy;
use crate::error::Result;
use crate::trace_time;

/// What to enumerate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFilter {
    /// File extension without the dot
    pub suffix: String,
    /// Skip files larger than this
    pub max_bytes: Option<u64>,
    /// Only the root's immediate directory
    pub shallow: bool,
}

impl Default for ScanFilter {
    fn default() -> Self {
        Self {
            suffix: "md".to_string(),
            max_bytes: None,
            shallow: false,
        }
    }
}

impl ScanFilter {
    pub fn from_policy(policy: &ReviewPolicy) -> Self {
        Self {
            max_bytes: Some(policy.max_note_bytes),
            shallow: policy.shallow,
            ..Self::default()
        }
    }
}

/// Result of a scan: eligible keys in order plus what was filtered out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub keys: Vec<String>,
    pub oversized: Vec<String>,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

pub(super) fn scan(vault: &FsVault, filter: &ScanFilter) -> Result<ScanReport> {
    let start = Instant::now();
    let mut report = ScanReport::default();

    let mut walker = WalkDir::new(&vault.root).follow_links(false);
    if filter.shallow {
        walker = walker.max_depth(1);
    }

    for entry in walker.into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable vault entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(filter.suffix.as_str()))
        {
            continue;
        }
        let Some(key) = vault.key_for(path) else {
            continue;
        };

        let size = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                tracing::warn!(key, error = %e, "skipping note without metadata");
                continue;
            }
        };
        if filter.max_bytes.is_some_and(|max| size > max) {
            tracing::debug!(key, size, "note above size ceiling");
            report.oversized.push(key);
            continue;
        }
        report.keys.push(key);
    }

    report.keys.sort();
    report.oversized.sort();
    trace_time!(start, "scan_vault", notes = report.keys.len());
    Ok(report)
}
