//! Note store backed by a vault directory
//!
//! The vault is a plain directory tree of markdown files. Notes are keyed by
//! their path relative to the root, always with `/` separators.

mod scan;

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Result, VaultError};
use crate::note::Note;
pub use scan::{ScanFilter, ScanReport};

/// Hierarchical note namespace consumed by the review core
pub trait NoteStore {
    /// Root directory of the vault
    fn root(&self) -> &Path;

    /// Enumerate note keys matching the filter, sorted lexicographically
    fn scan(&self, filter: &ScanFilter) -> Result<ScanReport>;

    fn read(&self, key: &str) -> Result<Note>;

    /// Overwrite an existing note's content
    fn write(&self, key: &str, body: &str) -> Result<()>;

    /// Create a new note; fails if the key is taken
    fn create(&self, key: &str, body: &str) -> Result<()>;

    fn delete(&self, key: &str) -> Result<()>;

    fn exists(&self, key: &str) -> bool;
}

/// Filesystem vault
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    /// Open an existing vault directory. The root is canonicalized so the
    /// checkpoint records a stable identity for it.
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(VaultError::VaultNotFound {
                path: path.to_path_buf(),
            });
        }
        let root = path
            .canonicalize()
            .map_err(|e| VaultError::io_operation("resolve vault root", path.display(), e))?;
        Ok(Self { root })
    }

    /// Map a key to an absolute path, refusing anything that escapes the root
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(VaultError::invalid_value("note key", key));
        }
        Ok(self.root.join(rel))
    }

    /// Key for a path inside the vault
    pub fn key_for(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }
}

impl NoteStore for FsVault {
    fn root(&self) -> &Path {
        &self.root
    }

    fn scan(&self, filter: &ScanFilter) -> Result<ScanReport> {
        scan::scan(self, filter)
    }

    fn read(&self, key: &str) -> Result<Note> {
        let path = self.path_for(key)?;
        if !path.is_file() {
            return Err(VaultError::NoteNotFound {
                key: key.to_string(),
            });
        }
        let body = fs::read_to_string(&path).map_err(|e| VaultError::note_operation(key, "read", e))?;
        Ok(Note::new(key, path, body))
    }

    fn write(&self, key: &str, body: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if !path.is_file() {
            return Err(VaultError::NoteNotFound {
                key: key.to_string(),
            });
        }
        write_atomic(&path, body).map_err(|e| VaultError::note_operation(key, "write", e))
    }

    fn create(&self, key: &str, body: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            return Err(VaultError::already_exists("note", key));
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| VaultError::note_operation(key, "create", e))?;
        }
        fs::write(&path, body).map_err(|e| VaultError::note_operation(key, "create", e))?;
        tracing::debug!(key, "created note");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::remove_file(&path).map_err(|e| VaultError::note_operation(key, "delete", e))?;
        tracing::info!(key, "deleted note");
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.path_for(key).map(|p| p.is_file()).unwrap_or(false)
    }
}

/// Write to a sibling temp file, then rename over the target
pub(crate) fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)
}
