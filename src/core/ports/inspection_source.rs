//! Inspection data source port
//!
//! Defines the interface for reading stored module data.

use super::super::models::{FieldRow, InspectionSnapshot, MediaRow};

/// Read access to the stored rows of an inspection
pub trait InspectionDataSource: Send + Sync {
    /// All `(module_type, field_name, field_value)` rows of an inspection
    fn field_rows(&self, inspection_id: &str) -> anyhow::Result<Vec<FieldRow>>;

    /// All `(module_type, file_name, photo_type)` rows of an inspection
    fn media_rows(&self, inspection_id: &str) -> anyhow::Result<Vec<MediaRow>>;

    /// Whether the inspection is known at all
    ///
    /// Sources that cannot tell report `true`; an unknown inspection then
    /// validates as entirely unfilled.
    fn exists(&self, _inspection_id: &str) -> anyhow::Result<bool> {
        Ok(true)
    }

    /// Load and group both row sets
    fn snapshot(&self, inspection_id: &str) -> anyhow::Result<InspectionSnapshot> {
        let fields = self.field_rows(inspection_id)?;
        let media = self.media_rows(inspection_id)?;
        Ok(InspectionSnapshot::from_rows(&fields, &media))
    }
}
