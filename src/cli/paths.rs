//! Path resolution shared by commands

use std::env;
use std::path::PathBuf;

/// Vault directory from an optional argument, falling back to the current
/// directory, or "." if that cannot be determined.
pub fn resolve_vault_path(vault: Option<PathBuf>) -> PathBuf {
    vault.unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}
