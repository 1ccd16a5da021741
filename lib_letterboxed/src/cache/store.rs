//! # Snapshot Store
//!
//! Holds at most one [`PuzzleSnapshot`]. The snapshot lives in a
//! `tokio::sync::watch` channel: readers clone an `Arc` out of it and never
//! see a half-written value, and subscribers (the scheduler) are woken when
//! it is replaced.
//!
//! When a path is configured, every installed snapshot is also written to a
//! single JSON record through a temp file and an atomic rename. A missing or
//! unreadable record at startup simply means "no snapshot".

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::puzzle::model::PuzzleSnapshot;

/// Persistence failures of the snapshot record.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing or renaming the record failed.
    #[error("I/O error occurred: {0}")]
    Io(#[from] std::io::Error),

    /// The record is not a valid snapshot.
    #[error("JSON error occurred: {0}")]
    Json(#[from] serde_json::Error),
}

/// The single current snapshot.
pub struct SnapshotStore {
    current: watch::Sender<Option<Arc<PuzzleSnapshot>>>,
    record: Option<PathBuf>,
    /// Serializes install + write so the record on disk matches the last install.
    writer: Mutex<()>,
}

impl SnapshotStore {
    /// An empty, memory-only store.
    pub fn in_memory() -> Self {
        Self::with_initial(None, None)
    }

    /// Opens a store mirrored to `path`, seeded from the record if it can be read.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let initial = match Self::load(&path) {
            Ok(Some(snapshot)) => {
                info!(
                    path = %path.display(),
                    print_date = %snapshot.print_date(),
                    expiration = ?snapshot.expiration(),
                    "Loaded persisted puzzle snapshot"
                );
                Some(snapshot)
            }
            Ok(None) => {
                info!(path = %path.display(), "No persisted puzzle snapshot");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), "Ignoring unreadable puzzle snapshot: {}", e);
                None
            }
        };
        Self::with_initial(initial, Some(path))
    }

    /// A store seeded with `initial`, optionally mirrored to `record`.
    pub fn with_initial(initial: Option<PuzzleSnapshot>, record: Option<PathBuf>) -> Self {
        let (current, _) = watch::channel(initial.map(Arc::new));
        Self {
            current,
            record,
            writer: Mutex::new(()),
        }
    }

    /// Reads the record at `path`. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<PuzzleSnapshot>, StoreError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// The current snapshot, if any.
    pub fn get(&self) -> Option<Arc<PuzzleSnapshot>> {
        self.current.borrow().clone()
    }

    /// `true` when a snapshot is present and `now` is before its expiration.
    pub fn is_valid(snapshot: Option<&PuzzleSnapshot>, now: i64) -> bool {
        snapshot.is_some_and(|s| s.is_fresh(now))
    }

    /// Installs `snapshot`, replacing the previous one, and writes the record.
    ///
    /// A failed write is logged; the in-memory snapshot is installed regardless.
    pub fn replace(&self, snapshot: PuzzleSnapshot) -> Arc<PuzzleSnapshot> {
        let snapshot = Arc::new(snapshot);
        let _guard = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        self.current.send_replace(Some(Arc::clone(&snapshot)));

        if let Some(path) = &self.record {
            if let Err(e) = Self::persist(path, &snapshot) {
                error!(path = %path.display(), "Failed to persist puzzle snapshot: {}", e);
            }
        }
        snapshot
    }

    /// Receiver that is marked changed on every [`replace`](Self::replace).
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<PuzzleSnapshot>>> {
        self.current.subscribe()
    }

    fn persist(path: &Path, snapshot: &PuzzleSnapshot) -> Result<(), StoreError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut out = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut out, snapshot)?;
            out.flush()?;
        }
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
