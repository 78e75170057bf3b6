//! Persistence for the longest-runs list.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use super::history::RunRecord;

/// Failure to read or write run history.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access run history at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("run history is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Backend that keeps the longest runs across process restarts.
pub trait RunHistoryStore: Send + Sync {
    fn load(&self) -> Result<Vec<RunRecord>, StoreError>;
    fn save(&self, records: &[RunRecord]) -> Result<(), StoreError>;
}

/// Stores the list as a pretty-printed JSON array in one file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl RunHistoryStore for JsonFileStore {
    /// A missing file is an empty history.
    fn load(&self) -> Result<Vec<RunRecord>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn save(&self, records: &[RunRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json).map_err(|err| self.io_error(err))
    }
}

/// In-memory store. Clones share the same records.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<RunRecord>>>,
}

impl MemoryStore {
    pub fn with_records(records: Vec<RunRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Vec<RunRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RunHistoryStore for MemoryStore {
    fn load(&self) -> Result<Vec<RunRecord>, StoreError> {
        Ok(self.records())
    }

    fn save(&self, records: &[RunRecord]) -> Result<(), StoreError> {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records.to_vec();
        Ok(())
    }
}
