//! Inspection data as entered in the field
//!
//! Module data is written by the form UI and is read-only to the validators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One stored field value: `(module_type, field_name, field_value)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRow {
    /// Module the value belongs to
    pub module_type: String,
    /// Field name
    pub field_name: String,
    /// Raw value as stored
    #[serde(default)]
    pub field_value: String,
}

impl FieldRow {
    /// Create a field row
    #[must_use]
    pub fn new(module_type: &str, field_name: &str, field_value: &str) -> Self {
        Self {
            module_type: module_type.to_string(),
            field_name: field_name.to_string(),
            field_value: field_value.to_string(),
        }
    }
}

/// One stored media file: `(module_type, file_name, photo_type)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRow {
    /// Module the photo belongs to
    pub module_type: String,
    /// Stored file name or URI
    pub file_name: String,
    /// Photo slot the file was captured for
    pub photo_type: String,
}

impl MediaRow {
    /// Create a media row
    #[must_use]
    pub fn new(module_type: &str, file_name: &str, photo_type: &str) -> Self {
        Self {
            module_type: module_type.to_string(),
            file_name: file_name.to_string(),
            photo_type: photo_type.to_string(),
        }
    }
}

/// Field values and captured photos of one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleData {
    /// Field name → value (includes `<field>_outro` companions)
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Photo slot → captured media URIs, in capture order
    #[serde(default)]
    pub photos: BTreeMap<String, Vec<String>>,
}

impl ModuleData {
    /// Empty module data
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter
    #[must_use]
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.set_field(name, value);
        self
    }

    /// Builder-style photo setter
    #[must_use]
    pub fn with_photo(mut self, slot: &str, uri: &str) -> Self {
        self.add_photo(slot, uri);
        self
    }

    /// Set a field value
    pub fn set_field(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }

    /// Remove a field value
    pub fn remove_field(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    /// Append a photo to a slot
    pub fn add_photo(&mut self, slot: &str, uri: &str) {
        self.photos.entry(slot.to_string()).or_default().push(uri.to_string());
    }

    /// Remove one photo from a slot, returning whether it was present
    pub fn remove_photo(&mut self, slot: &str, uri: &str) -> bool {
        let Some(list) = self.photos.get_mut(slot) else {
            return false;
        };
        let before = list.len();
        list.retain(|u| u != uri);
        list.len() < before
    }

    /// Raw field value
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Field value if it is non-blank
    #[must_use]
    pub fn filled(&self, name: &str) -> Option<&str> {
        self.field(name).filter(|v| !v.trim().is_empty())
    }

    /// Photos captured for a slot
    #[must_use]
    pub fn photos(&self, slot: &str) -> &[String] {
        self.photos.get(slot).map(Vec::as_slice).unwrap_or_default()
    }
}

/// All module data of one inspection, keyed by module type
///
/// A module is present as soon as any field or media row exists for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InspectionSnapshot {
    modules: BTreeMap<String, ModuleData>,
}

impl InspectionSnapshot {
    /// Empty snapshot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Group flat storage rows into per-module data
    #[must_use]
    pub fn from_rows(fields: &[FieldRow], media: &[MediaRow]) -> Self {
        let mut snapshot = Self::new();
        for row in fields {
            snapshot
                .modules
                .entry(row.module_type.clone())
                .or_default()
                .set_field(&row.field_name, &row.field_value);
        }
        for row in media {
            snapshot
                .modules
                .entry(row.module_type.clone())
                .or_default()
                .add_photo(&row.photo_type, &row.file_name);
        }
        snapshot
    }

    /// Builder-style module insert
    #[must_use]
    pub fn with_module(mut self, module_type: &str, data: ModuleData) -> Self {
        self.insert(module_type, data);
        self
    }

    /// Insert or replace a module
    pub fn insert(&mut self, module_type: &str, data: ModuleData) {
        self.modules.insert(module_type.to_string(), data);
    }

    /// Remove a module entirely
    pub fn remove(&mut self, module_type: &str) -> Option<ModuleData> {
        self.modules.remove(module_type)
    }

    /// Data of a module, if present
    #[must_use]
    pub fn module(&self, module_type: &str) -> Option<&ModuleData> {
        self.modules.get(module_type)
    }

    /// Mutable data of a module, if present
    pub fn module_mut(&mut self, module_type: &str) -> Option<&mut ModuleData> {
        self.modules.get_mut(module_type)
    }

    /// Whether the module has any stored data
    #[must_use]
    pub fn has_module(&self, module_type: &str) -> bool {
        self.modules.contains_key(module_type)
    }

    /// Value of a field in a given module
    #[must_use]
    pub fn field(&self, module_type: &str, field: &str) -> Option<&str> {
        self.module(module_type).and_then(|m| m.field(field))
    }

    /// Present module types in key order
    pub fn module_types(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}
