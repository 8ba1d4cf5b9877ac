//! JSON snapshot persistence for the quote store.
//!
//! The snapshot holds quotes only; the per-user vote index is rebuilt from
//! the voter sets on load. Writes go to a sibling temp file that is then
//! renamed over the snapshot, so a crash never leaves a half-written file.
//!
//! Every write bumps a generation counter stored in the document. Writers
//! hold an exclusive advisory lock on a sibling `.lock` file (see
//! [`SnapshotFile::lock`]), so a process can compare the generation it last
//! saw with the one on disk and catch up before writing.

use fs2::FileExt;
use ledger_application::StoreError;
use ledger_domain::Quote;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SnapshotDocument {
    version: u32,
    #[serde(default)]
    generation: u64,
    quotes: Vec<Quote>,
}

/// Contents of a snapshot as read from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotData {
    /// Number of writes the file has seen; 0 for a missing file.
    pub generation: u64,
    pub quotes: Vec<Quote>,
}

/// Exclusive lock on a snapshot, released on drop.
pub struct SnapshotLock {
    file: File,
}

impl Drop for SnapshotLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("Could not release snapshot lock: {}", e);
        }
    }
}

/// A snapshot file on disk.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all quotes. A missing file is an empty store at generation 0.
    pub fn load(&self) -> Result<SnapshotData, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No snapshot at {}, starting empty", self.path.display());
                return Ok(SnapshotData::default());
            }
            Err(e) => return Err(self.unavailable("read", e)),
        };

        let doc: SnapshotDocument =
            serde_json::from_str(&raw).map_err(|e| self.unavailable("parse", e))?;
        if doc.version != FORMAT_VERSION {
            return Err(StoreError::Unavailable(format!(
                "snapshot {} has unsupported version {}",
                self.path.display(),
                doc.version
            )));
        }
        debug!(
            "Loaded {} quotes (generation {}) from {}",
            doc.quotes.len(),
            doc.generation,
            self.path.display()
        );
        Ok(SnapshotData {
            generation: doc.generation,
            quotes: doc.quotes,
        })
    }

    /// Block until this process holds the snapshot's writer lock.
    pub fn lock(&self) -> Result<SnapshotLock, StoreError> {
        self.ensure_parent()?;
        let lock_path = self.sibling("lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| self.unavailable("open lock for", e))?;
        file.lock_exclusive()
            .map_err(|e| self.unavailable("lock", e))?;
        Ok(SnapshotLock { file })
    }

    /// Replace the snapshot with `quotes`, stamped with `generation`.
    ///
    /// Callers hold [`SnapshotFile::lock`]; the temp file name is shared by
    /// all writers of this snapshot.
    pub fn write<'a>(
        &self,
        generation: u64,
        quotes: impl IntoIterator<Item = &'a Quote>,
    ) -> Result<(), StoreError> {
        let doc = SnapshotDocument {
            version: FORMAT_VERSION,
            generation,
            quotes: quotes.into_iter().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&doc).map_err(|e| self.unavailable("encode", e))?;

        self.ensure_parent()?;
        let tmp = self.sibling("tmp");
        fs::write(&tmp, json).map_err(|e| self.unavailable("write", e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.unavailable("replace", e))?;
        Ok(())
    }

    /// `quotes.json` -> `quotes.json.<suffix>`
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.unavailable("create directory for", e))?;
        }
        Ok(())
    }

    fn unavailable(&self, action: &str, err: impl std::fmt::Display) -> StoreError {
        StoreError::Unavailable(format!(
            "could not {} snapshot {}: {}",
            action,
            self.path.display(),
            err
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ledger_domain::{QuoteDraft, UserId};

    fn quote(text: &str) -> Quote {
        let draft = QuoteDraft::new(text, "Someone", vec!["tag".into()]).unwrap();
        Quote::create(draft, UserId::new("creator").unwrap(), Utc::now())
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("quotes.json"));
        assert_eq!(file.load().unwrap(), SnapshotData::default());
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("nested").join("quotes.json"));
        let mut q = quote("Premature optimization");
        q.add_voter(UserId::new("u1").unwrap(), Utc::now());

        file.write(7, [&q]).unwrap();
        let loaded = file.load().unwrap();

        assert_eq!(loaded.generation, 7);
        assert_eq!(loaded.quotes, vec![q]);
        assert!(!dir.path().join("nested").join("quotes.json.tmp").exists());
    }

    #[test]
    fn test_document_without_generation_loads_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.json");
        fs::write(&path, r#"{"version": 1, "quotes": []}"#).unwrap();

        assert_eq!(SnapshotFile::new(&path).load().unwrap().generation, 0);
    }

    #[test]
    fn test_lock_excludes_other_handles_until_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("quotes.json"));
        let lock_path = dir.path().join("quotes.json.lock");

        let held = file.lock().unwrap();
        let other = OpenOptions::new().write(true).open(&lock_path).unwrap();
        assert!(other.try_lock_exclusive().is_err());

        drop(held);
        other.try_lock_exclusive().unwrap();
        FileExt::unlock(&other).unwrap();
    }

    #[test]
    fn test_garbage_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.json");
        fs::write(&path, "not json").unwrap();

        let err = SnapshotFile::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(msg) if msg.contains("parse")));
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotes.json");
        fs::write(&path, r#"{"version": 99, "quotes": []}"#).unwrap();

        assert!(SnapshotFile::new(&path).load().is_err());
    }
}
