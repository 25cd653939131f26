//! JSON-file export records

use std::path::{Path, PathBuf};

use super::lock::{FileLock, read_json, write_json_atomic};
use crate::core::models::ExportLog;
use crate::core::ports::ExportLogStore;

/// Export records persisted as a JSON array
#[derive(Debug, Clone)]
pub struct JsonExportLogStore {
    path: PathBuf,
}

impl JsonExportLogStore {
    /// Store backed by `path`
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl ExportLogStore for JsonExportLogStore {
    fn get(&self, id: &str) -> anyhow::Result<Option<ExportLog>> {
        Ok(self.list()?.into_iter().find(|log| log.id == id))
    }

    fn save(&self, log: &ExportLog) -> anyhow::Result<()> {
        let _lock = FileLock::acquire(&self.path)?;
        let mut logs: Vec<ExportLog> = read_json(&self.path)?;
        match logs.iter_mut().find(|existing| existing.id == log.id) {
            Some(existing) => *existing = log.clone(),
            None => logs.push(log.clone()),
        }
        write_json_atomic(&self.path, &logs)
    }

    fn list(&self) -> anyhow::Result<Vec<ExportLog>> {
        let _lock = FileLock::acquire(&self.path)?;
        read_json(&self.path)
    }
}
