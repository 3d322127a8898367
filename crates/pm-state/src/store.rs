// store.rs — StateStore: the last-seen snapshot, persisted across runs.
//
// One file, `<state_dir>/previous_parts_state.json`, holding a small JSON
// envelope:
//
//   { "schema_version": 1, "saved_at": "...", "sha256": "...", "rows": [[...]] }
//
// `sha256` is the lowercase hex SHA-256 of the compact JSON encoding of
// `rows`. A file that fails to decode, carries an unknown version, fails the
// hash check or has fewer than MIN_ROWS rows is treated as absent state.
//
// Writes go to a sibling temp file which is fsynced and renamed over the
// stable path, so an interrupted save leaves the previous file untouched.
// No locking: runs are serialized by the external scheduler.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use pm_snapshot::{Snapshot, MIN_ROWS};

use crate::error::{PersistError, StateError};

/// File name of the persisted state inside the state directory.
pub const STATE_FILE_NAME: &str = "previous_parts_state.json";

const SCHEMA_VERSION: u32 = 1;

/// On-disk envelope around a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedState {
    pub schema_version: u32,
    pub saved_at: DateTime<Utc>,
    pub sha256: String,
    pub rows: Snapshot,
}

impl PersistedState {
    fn seal(snapshot: &Snapshot) -> Result<Self, StateError> {
        Ok(Self {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            sha256: rows_digest(snapshot)?,
            rows: snapshot.clone(),
        })
    }
}

/// What [`StateStore::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The snapshot was written.
    Saved,
    /// The snapshot had too few rows and was not written.
    Skipped { rows: usize },
}

/// Persists and retrieves the last-seen snapshot.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    /// Create a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the state file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(STATE_FILE_NAME)
    }

    /// Load the last persisted snapshot.
    ///
    /// Returns `None` when no state exists or the stored state is unusable;
    /// the latter is logged and otherwise ignored.
    pub fn load(&self) -> Option<Snapshot> {
        match self.read() {
            Ok(state) => state.map(|s| s.rows),
            Err(e) => {
                tracing::warn!(
                    path = %self.path().display(),
                    error = %e,
                    "previous state unusable, treating as no previous state"
                );
                None
            }
        }
    }

    /// Read and validate the full envelope. `Ok(None)` means no state file.
    pub fn read(&self) -> Result<Option<PersistedState>, StateError> {
        let path = self.path();
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no previous state file");
                return Ok(None);
            }
            Err(source) => return Err(StateError::Io { path, source }),
        };

        let state: PersistedState = serde_json::from_str(&json)?;
        if state.schema_version != SCHEMA_VERSION {
            return Err(StateError::Corrupt {
                path,
                reason: format!("unsupported schema version {}", state.schema_version),
            });
        }
        if state.rows.row_count() < MIN_ROWS {
            return Err(StateError::Corrupt {
                path,
                reason: format!(
                    "{} rows, need at least {}",
                    state.rows.row_count(),
                    MIN_ROWS
                ),
            });
        }
        let digest = rows_digest(&state.rows)?;
        if digest != state.sha256 {
            return Err(StateError::Corrupt {
                path,
                reason: "content hash mismatch".to_string(),
            });
        }

        tracing::info!(
            path = %path.display(),
            saved_at = %state.saved_at,
            rows = state.rows.row_count(),
            "previous state loaded"
        );
        Ok(Some(state))
    }

    /// Persist `snapshot`, replacing any previous state.
    ///
    /// Snapshots with fewer than [`MIN_ROWS`] rows are not written.
    pub fn save(&self, snapshot: &Snapshot) -> Result<SaveOutcome, PersistError> {
        if !snapshot.is_valid() {
            tracing::warn!(
                rows = snapshot.row_count(),
                "snapshot too short to persist, skipping save"
            );
            return Ok(SaveOutcome::Skipped {
                rows: snapshot.row_count(),
            });
        }

        fs::create_dir_all(&self.dir).map_err(|source| StateError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let state = PersistedState::seal(snapshot)?;
        let json = serde_json::to_string_pretty(&state)?;
        let path = self.path();
        write_atomic(&path, json.as_bytes())?;

        tracing::info!(path = %path.display(), rows = snapshot.row_count(), "state saved");
        Ok(SaveOutcome::Saved)
    }

    /// Delete the state file. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool, StateError> {
        let path = self.path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StateError::Io { path, source }),
        }
    }
}

fn rows_digest(snapshot: &Snapshot) -> Result<String, StateError> {
    let bytes = serde_json::to_vec(snapshot)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StateError> {
    let tmp_path = path.with_file_name(format!(".{}.tmp", STATE_FILE_NAME));
    let io_err = |source| StateError::Io {
        path: tmp_path.clone(),
        source,
    };

    let mut file = File::create(&tmp_path).map_err(io_err)?;
    file.write_all(bytes).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    drop(file);

    if let Err(source) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StateError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}
