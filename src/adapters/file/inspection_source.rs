//! JSON-file inspection data
//!
//! Each inspection is stored as `<dir>/<inspection_id>.json` holding the raw
//! field and media rows written by the form UI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::lock::{read_json, write_json_atomic};
use crate::core::models::{FieldRow, InspectionSnapshot, MediaRow};
use crate::core::ports::InspectionDataSource;

/// Rows of one stored inspection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionFile {
    /// Field rows
    #[serde(default)]
    pub fields: Vec<FieldRow>,
    /// Media rows
    #[serde(default)]
    pub media: Vec<MediaRow>,
}

/// Inspections stored as one JSON file each
#[derive(Debug, Clone)]
pub struct JsonInspectionSource {
    dir: PathBuf,
}

impl JsonInspectionSource {
    /// Source reading from `dir`
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Store an inspection, replacing any previous rows
    pub fn write(&self, inspection_id: &str, file: &InspectionFile) -> anyhow::Result<()> {
        write_json_atomic(&self.file_path(inspection_id)?, file)
    }

    fn file_path(&self, inspection_id: &str) -> anyhow::Result<PathBuf> {
        let id = inspection_id.trim();
        if id.is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
            anyhow::bail!("Invalid inspection ID: {inspection_id:?}");
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    fn load(&self, inspection_id: &str) -> anyhow::Result<InspectionFile> {
        read_json(&self.file_path(inspection_id)?)
    }
}

impl InspectionDataSource for JsonInspectionSource {
    fn field_rows(&self, inspection_id: &str) -> anyhow::Result<Vec<FieldRow>> {
        Ok(self.load(inspection_id)?.fields)
    }

    fn media_rows(&self, inspection_id: &str) -> anyhow::Result<Vec<MediaRow>> {
        Ok(self.load(inspection_id)?.media)
    }

    fn exists(&self, inspection_id: &str) -> anyhow::Result<bool> {
        Ok(self.file_path(inspection_id)?.exists())
    }

    // One read instead of two
    fn snapshot(&self, inspection_id: &str) -> anyhow::Result<InspectionSnapshot> {
        let file = self.load(inspection_id)?;
        Ok(InspectionSnapshot::from_rows(&file.fields, &file.media))
    }
}
