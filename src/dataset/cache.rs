use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    time::SystemTime,
};

use tracing::{debug, info};

use super::{load_dataset, ColumnNames, Dataset};
use crate::error::{DashboardError, Result};

/// Identity of a dataset source on disk. A change in any field forces a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceKey {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceKey {
    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|e| DashboardError::SourceUnreadable {
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Memo of the last normalized dataset, keyed by `SourceKey`.
pub struct DatasetCache {
    columns: ColumnNames,
    entry: RwLock<Option<(SourceKey, Arc<Dataset>)>>,
}

impl DatasetCache {
    pub fn new(columns: ColumnNames) -> Self {
        Self {
            columns,
            entry: RwLock::new(None),
        }
    }

    /// Return the cached dataset for `path`, loading it if the source changed.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Dataset>> {
        let key = SourceKey::from_path(path)?;

        // 1) Fast-path: same source, same version
        {
            let entry = self.entry.read().unwrap_or_else(|e| e.into_inner());
            if let Some((cached, dataset)) = entry.as_ref() {
                if *cached == key {
                    debug!(path = %path.display(), "dataset cache hit");
                    return Ok(Arc::clone(dataset));
                }
            }
        }

        // 2) Miss or stale: load outside the lock, then publish
        info!(path = %path.display(), "loading dataset");
        let dataset = Arc::new(load_dataset(path, &self.columns)?);
        let mut entry = self.entry.write().unwrap_or_else(|e| e.into_inner());
        *entry = Some((key, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Drop the cached dataset so the next access reloads from disk.
    pub fn invalidate(&self) {
        let mut entry = self.entry.write().unwrap_or_else(|e| e.into_inner());
        if entry.take().is_some() {
            debug!("dataset cache invalidated");
        }
    }

    pub fn cached_key(&self) -> Option<SourceKey> {
        let entry = self.entry.read().unwrap_or_else(|e| e.into_inner());
        entry.as_ref().map(|(key, _)| key.clone())
    }
}
