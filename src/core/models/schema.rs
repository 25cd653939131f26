//! Module schema
//!
//! Static, declarative description of every inspection module: which fields,
//! photo slots and measurements it has, and which of them are mandatory.
//! A schema is validated once when it is built and is immutable afterwards,
//! so the validators never see a malformed descriptor.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cabin_rule::CabinRuleTable;

/// Schema shipped with the crate
const BUILTIN_SCHEMA: &str = include_str!("builtin_schema.toml");

/// Structural defects in a schema definition
///
/// These indicate a deployment defect, not a runtime condition, and are
/// never swallowed.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A module, field, photo or measurement has an empty name
    #[error("{kind} in module '{module}' has an empty name")]
    EmptyName {
        /// Module type
        module: String,
        /// Descriptor kind (field, photo, measurement, module)
        kind: &'static str,
    },

    /// A descriptor has an empty label
    #[error("'{name}' in module '{module}' has an empty label")]
    EmptyLabel {
        /// Module type
        module: String,
        /// Descriptor name
        name: String,
    },

    /// Two descriptors in one module share a name
    #[error("duplicate name '{name}' in module '{module}'")]
    DuplicateName {
        /// Module type
        module: String,
        /// Duplicated name
        name: String,
    },

    /// A photo slot allows zero photos
    #[error("photo slot '{name}' in module '{module}' has max_photos = 0")]
    ZeroMaxPhotos {
        /// Module type
        module: String,
        /// Photo slot name
        name: String,
    },

    /// Two modules share a module type
    #[error("duplicate module type '{0}'")]
    DuplicateModule(String),

    /// A reference points at a module the schema does not declare
    #[error("{context} references unknown module '{module}'")]
    UnknownModule {
        /// Where the reference was found
        context: String,
        /// Referenced module type
        module: String,
    },

    /// The cabin-type field does not exist in its module
    #[error("cabin-type field '{field}' is not declared in module '{module}'")]
    UnknownCabinField {
        /// Module type
        module: String,
        /// Field name
        field: String,
    },

    /// A cabin rule requires a field or photo no module declares
    #[error("cabin rule '{cabin_type}' requires unknown {kind} '{name}'")]
    UnknownConditionalItem {
        /// Cabin type of the rule
        cabin_type: String,
        /// `field` or `photo`
        kind: &'static str,
        /// Name that matched nothing
        name: String,
    },

    /// TOML syntax or shape error
    #[error("invalid schema: {0}")]
    Parse(#[from] toml::de::Error),

    /// Schema file could not be read
    #[error("failed to read schema {path}: {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying error
        source: std::io::Error,
    },
}

/// Input widget type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    #[default]
    Text,
    /// Numeric input
    Number,
    /// Single choice from a list
    Select,
    /// Yes/no toggle
    Boolean,
    /// Date picker
    Date,
}

/// A data-entry field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Key in module data
    pub name: String,
    /// Human-readable label, surfaced verbatim in errors
    pub label: String,
    /// Mandatory in every inspection
    #[serde(default)]
    pub required: bool,
    /// Widget type
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
    /// Select field with an "Outro" choice that needs a free-text companion
    #[serde(default)]
    pub other_option: bool,
}

impl FieldSpec {
    /// Create an optional text field
    #[must_use]
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            required: false,
            field_type: FieldType::Text,
            other_option: false,
        }
    }

    /// Mark the field as mandatory
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Make this a select field with an "Outro" option
    #[must_use]
    pub const fn with_other_option(mut self) -> Self {
        self.field_type = FieldType::Select;
        self.other_option = true;
        self
    }

    /// Key of the free-text companion value for the "Outro" option
    #[must_use]
    pub fn other_key(&self) -> String {
        format!("{}_outro", self.name)
    }
}

/// A photo slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSpec {
    /// Slot key in module photo data
    pub name: String,
    /// Human-readable label, e.g. `FOTO 1 - Fachada`
    pub label: String,
    /// Mandatory in every inspection
    #[serde(default)]
    pub required: bool,
    /// Maximum number of photos the slot accepts
    #[serde(default = "default_max_photos")]
    pub max_photos: u32,
}

const fn default_max_photos() -> u32 {
    1
}

impl PhotoSpec {
    /// Create an optional single-photo slot
    #[must_use]
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            required: false,
            max_photos: default_max_photos(),
        }
    }

    /// Mark the slot as mandatory
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A numeric measurement taken on site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementSpec {
    /// Key in module data
    pub name: String,
    /// Human-readable label
    pub label: String,
    /// Mandatory in every inspection
    #[serde(default)]
    pub required: bool,
    /// Display unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl MeasurementSpec {
    /// Create an optional measurement
    #[must_use]
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            required: false,
            unit: None,
        }
    }

    /// Mark the measurement as mandatory
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Unchecked module descriptor, as read from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawModuleConfig {
    module_type: String,
    display_name: String,
    #[serde(default)]
    fields: Vec<FieldSpec>,
    #[serde(default)]
    photos: Vec<PhotoSpec>,
    #[serde(default)]
    measurements: Vec<MeasurementSpec>,
}

/// Validated, immutable descriptor of one module type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawModuleConfig", into = "RawModuleConfig")]
pub struct ModuleConfig {
    module_type: String,
    display_name: String,
    fields: Vec<FieldSpec>,
    photos: Vec<PhotoSpec>,
    measurements: Vec<MeasurementSpec>,
}

impl ModuleConfig {
    /// Build a module descriptor, rejecting malformed specs
    pub fn new(
        module_type: &str,
        display_name: &str,
        fields: Vec<FieldSpec>,
        photos: Vec<PhotoSpec>,
        measurements: Vec<MeasurementSpec>,
    ) -> Result<Self, SchemaError> {
        Self::try_from(RawModuleConfig {
            module_type: module_type.to_string(),
            display_name: display_name.to_string(),
            fields,
            photos,
            measurements,
        })
    }

    /// Module type key (e.g. `client`)
    #[must_use]
    pub fn module_type(&self) -> &str {
        &self.module_type
    }

    /// Name shown to users (e.g. `Cliente`)
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Fields in declaration order
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Photo slots in declaration order
    #[must_use]
    pub fn photos(&self) -> &[PhotoSpec] {
        &self.photos
    }

    /// Measurements in declaration order
    #[must_use]
    pub fn measurements(&self) -> &[MeasurementSpec] {
        &self.measurements
    }

    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a photo slot by name
    #[must_use]
    pub fn photo(&self, name: &str) -> Option<&PhotoSpec> {
        self.photos.iter().find(|p| p.name == name)
    }
}

impl TryFrom<RawModuleConfig> for ModuleConfig {
    type Error = SchemaError;

    fn try_from(raw: RawModuleConfig) -> Result<Self, Self::Error> {
        let module = raw.module_type.trim().to_string();
        if module.is_empty() {
            return Err(SchemaError::EmptyName {
                module: raw.display_name,
                kind: "module",
            });
        }
        if raw.display_name.trim().is_empty() {
            return Err(SchemaError::EmptyLabel {
                name: module.clone(),
                module,
            });
        }

        // Fields and measurements share the module data namespace.
        let mut data_keys = HashSet::new();
        let field_descs = raw.fields.iter().map(|f| ("field", &f.name, &f.label));
        let measurement_descs = raw.measurements.iter().map(|m| ("measurement", &m.name, &m.label));
        for (kind, name, label) in field_descs.chain(measurement_descs) {
            check_descriptor(&module, kind, name, label)?;
            if !data_keys.insert(name.as_str()) {
                return Err(SchemaError::DuplicateName {
                    module,
                    name: name.clone(),
                });
            }
        }

        let mut slots = HashSet::new();
        for photo in &raw.photos {
            check_descriptor(&module, "photo", &photo.name, &photo.label)?;
            if photo.max_photos == 0 {
                return Err(SchemaError::ZeroMaxPhotos {
                    module,
                    name: photo.name.clone(),
                });
            }
            if !slots.insert(photo.name.as_str()) {
                return Err(SchemaError::DuplicateName {
                    module,
                    name: photo.name.clone(),
                });
            }
        }

        Ok(Self {
            module_type: module,
            display_name: raw.display_name,
            fields: raw.fields,
            photos: raw.photos,
            measurements: raw.measurements,
        })
    }
}

impl From<ModuleConfig> for RawModuleConfig {
    fn from(config: ModuleConfig) -> Self {
        Self {
            module_type: config.module_type,
            display_name: config.display_name,
            fields: config.fields,
            photos: config.photos,
            measurements: config.measurements,
        }
    }
}

fn check_descriptor(
    module: &str,
    kind: &'static str,
    name: &str,
    label: &str,
) -> Result<(), SchemaError> {
    if name.trim().is_empty() {
        return Err(SchemaError::EmptyName {
            module: module.to_string(),
            kind,
        });
    }
    if label.trim().is_empty() {
        return Err(SchemaError::EmptyLabel {
            module: module.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Location of the cabin-type selection in inspection data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinFieldRef {
    /// Module holding the field
    pub module: String,
    /// Field name
    pub field: String,
}

#[derive(Debug, Deserialize)]
struct RawSchema {
    cabin_field: CabinFieldRef,
    #[serde(default)]
    cabin_rules: CabinRuleTable,
    #[serde(default)]
    modules: Vec<RawModuleConfig>,
}

/// Complete inspection schema: module descriptors plus cabin-type rules
#[derive(Debug, Clone)]
pub struct Schema {
    modules: Vec<ModuleConfig>,
    cabin_rules: CabinRuleTable,
    cabin_field: CabinFieldRef,
}

impl Schema {
    /// Build a schema, checking cross references
    pub fn new(
        modules: Vec<ModuleConfig>,
        cabin_rules: CabinRuleTable,
        cabin_field: CabinFieldRef,
    ) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for module in &modules {
            if !seen.insert(module.module_type()) {
                return Err(SchemaError::DuplicateModule(module.module_type().to_string()));
            }
        }

        let cabin_module = modules
            .iter()
            .find(|m| m.module_type() == cabin_field.module)
            .ok_or_else(|| SchemaError::UnknownModule {
                context: "cabin_field".to_string(),
                module: cabin_field.module.clone(),
            })?;
        if cabin_module.field(&cabin_field.field).is_none() {
            return Err(SchemaError::UnknownCabinField {
                module: cabin_field.module.clone(),
                field: cabin_field.field.clone(),
            });
        }

        for (cabin_type, items) in cabin_rules.iter() {
            for module in &items.modules {
                if !seen.contains(module.as_str()) {
                    return Err(SchemaError::UnknownModule {
                        context: format!("cabin rule '{cabin_type}'"),
                        module: module.clone(),
                    });
                }
            }

            // Conditional fields may name a field or a measurement.
            let declares_field = |name: &str| {
                modules.iter().any(|m| {
                    m.field(name).is_some() || m.measurements().iter().any(|ms| ms.name == name)
                })
            };
            if let Some(name) = items.fields.iter().find(|n| !declares_field(n.as_str())) {
                return Err(SchemaError::UnknownConditionalItem {
                    cabin_type: cabin_type.clone(),
                    kind: "field",
                    name: name.clone(),
                });
            }
            if let Some(name) =
                items.photos.iter().find(|n| !modules.iter().any(|m| m.photo(n.as_str()).is_some()))
            {
                return Err(SchemaError::UnknownConditionalItem {
                    cabin_type: cabin_type.clone(),
                    kind: "photo",
                    name: name.clone(),
                });
            }
        }

        Ok(Self {
            modules,
            cabin_rules,
            cabin_field,
        })
    }

    /// The schema shipped with the crate
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::from_toml_str(BUILTIN_SCHEMA)
    }

    /// Parse a schema from TOML
    pub fn from_toml_str(content: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema = toml::from_str(content)?;
        let modules = raw
            .modules
            .into_iter()
            .map(ModuleConfig::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(modules, raw.cabin_rules, raw.cabin_field)
    }

    /// Load a schema file
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Module descriptors in declaration order
    #[must_use]
    pub fn modules(&self) -> &[ModuleConfig] {
        &self.modules
    }

    /// Look up a module descriptor
    #[must_use]
    pub fn module(&self, module_type: &str) -> Option<&ModuleConfig> {
        self.modules.iter().find(|m| m.module_type() == module_type)
    }

    /// Display name of a module, falling back to its type key
    #[must_use]
    pub fn display_name<'a>(&'a self, module_type: &'a str) -> &'a str {
        self.module(module_type).map_or(module_type, ModuleConfig::display_name)
    }

    /// Cabin-type rule table
    #[must_use]
    pub const fn cabin_rules(&self) -> &CabinRuleTable {
        &self.cabin_rules
    }

    /// Where the cabin-type selection lives
    #[must_use]
    pub const fn cabin_field(&self) -> &CabinFieldRef {
        &self.cabin_field
    }
}
