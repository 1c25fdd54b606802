//! Snapshot cache.
//!
//! The dashboard keeps exactly one snapshot on disk: the result of the last
//! successful update.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error};

use crate::models::StatsSnapshot;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON file holding the cached snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached snapshot. A missing or unreadable file yields `None`.
    pub fn load(&self) -> Option<StatsSnapshot> {
        debug!("Loading cached data from {:?}", self.path);
        if !self.path.exists() {
            return None;
        }
        match self.read() {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                error!("Error loading cache file: {}", e);
                None
            }
        }
    }

    fn read(&self) -> Result<StatsSnapshot, StorageError> {
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Replace the cached snapshot.
    pub fn save(&self, snapshot: &StatsSnapshot) -> Result<(), StorageError> {
        debug!("Saving cached data to {:?}", self.path);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Remove the cached snapshot if there is one.
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
